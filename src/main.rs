//! powledger CLI Application
//!
//! A command-line interface for driving a proof-of-work ledger.

use clap::{Parser, Subcommand};
use powledger::cli;
use powledger::core::{Amount, LedgerConfig};
use powledger::mining::MinerConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "powledger")]
#[command(version = "0.1.0")]
#[command(about = "A proof-of-work account ledger with signed transfers", long_about = None)]
struct Cli {
    /// Ledger configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Mining difficulty (number of leading zero hex digits)
    #[arg(short, long, global = true)]
    difficulty: Option<u32>,

    /// Adjust difficulty every N blocks (0 disables adjustment)
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// Target milliseconds per block
    #[arg(long, global = true)]
    target_ms: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the seeded three-wallet scenario
    Demo,

    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Derive the address of a public key
    Address {
        /// Public key as 128 hex chars (X‖Y)
        #[arg(short, long)]
        public_key: String,
    },

    /// Sign a transfer
    Sign {
        /// Sender's private key (hex)
        #[arg(short, long)]
        private_key: String,

        /// Recipient's address
        #[arg(short, long)]
        to: String,

        /// Value to send, in coins
        #[arg(short, long)]
        value: Amount,
    },

    /// Seed a ledger and keep mining
    Run {
        /// Stop after this many seconds
        #[arg(short, long, default_value = "10")]
        seconds: u64,

        /// Pause between blocks in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        /// Write the chain to this file on exit
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a new wallet
    New,
}

impl Cli {
    fn ledger_config(&self) -> Result<LedgerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_json_file(path)?,
            None => LedgerConfig::default(),
        };
        if let Some(difficulty) = self.difficulty {
            config = config.with_difficulty(difficulty);
        }
        if let Some(interval) = self.interval {
            config.adjustment_interval = interval;
        }
        if let Some(target_ms) = self.target_ms {
            config.target_block_time_ms = target_ms;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Demo => cli::cmd_demo(cli.ledger_config()?),
        Commands::Wallet { action } => match action {
            WalletCommands::New => cli::cmd_wallet_new(),
        },
        Commands::Address { public_key } => cli::cmd_address(public_key),
        Commands::Sign {
            private_key,
            to,
            value,
        } => cli::cmd_sign(private_key, to, *value),
        Commands::Run {
            seconds,
            delay_ms,
            export,
        } => cli::cmd_run(
            cli.ledger_config()?,
            MinerConfig {
                round_delay: Duration::from_millis(*delay_ms),
            },
            *seconds,
            export.as_deref(),
        ),
    }
}
