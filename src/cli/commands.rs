//! CLI commands for the ledger
//!
//! Implements all command handlers for the CLI interface.

use crate::context::{AppContext, MINER_WALLET, USER_A_WALLET, USER_B_WALLET};
use crate::core::{Amount, LedgerConfig, SharedLedger};
use crate::crypto::address_from_public_key_hex;
use crate::mining::{Miner, MinerConfig, MiningLoop};
use crate::wallet::Wallet;
use std::path::Path;
use std::time::Duration;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Run the bootstrap scenario and report the outcome
pub fn cmd_demo(config: LedgerConfig) -> CliResult<()> {
    println!("🆕 Seeding ledger (difficulty {})...", config.initial_difficulty);
    let ctx = AppContext::seeded(config)?;

    print_balances(&ctx)?;
    print_chain_info(&ctx.ledger);
    print_validation(&ctx.ledger);

    Ok(())
}

/// Create a new wallet and print its keys
pub fn cmd_wallet_new() -> CliResult<()> {
    let wallet = Wallet::new();

    println!("🔐 New wallet created!");
    println!("{}", serde_json::to_string_pretty(&wallet.info())?);
    println!("\n   ⚠️  IMPORTANT: The private key is shown only once.");
    println!("   Store it somewhere safe to keep access to your funds!");

    Ok(())
}

/// Derive the address of an X‖Y public key
pub fn cmd_address(public_key_hex: &str) -> CliResult<()> {
    let address = address_from_public_key_hex(public_key_hex)?;
    println!("📍 Address: {}", address);
    Ok(())
}

/// Sign a transfer with an imported private key
pub fn cmd_sign(private_key_hex: &str, to: &str, value: Amount) -> CliResult<()> {
    let wallet = Wallet::from_private_key(private_key_hex)?;
    let signature = wallet.sign(to, value)?;

    println!("✍️  Transfer signed:");
    println!("   ├─ From: {}", wallet.address());
    println!("   ├─ To: {}", to);
    println!("   ├─ Value: {} coins", value);
    println!("   ├─ Public key: {}", wallet.public_key_hex());
    println!("   └─ Signature: {}", signature);

    Ok(())
}

/// Seed a ledger and keep mining until `seconds` elapse or Ctrl+C
pub fn cmd_run(
    config: LedgerConfig,
    miner_config: MinerConfig,
    seconds: u64,
    export: Option<&Path>,
) -> CliResult<()> {
    let ctx = AppContext::seeded(config)?;
    println!("⛏️  Mining for up to {}s (Ctrl+C to stop early)...", seconds);

    let rt = tokio::runtime::Runtime::new()?;
    let mined = rt.block_on(async {
        let mining = MiningLoop::spawn(Miner::new(miner_config), ctx.ledger.clone());

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\n📴 Stopping miner...");
            }
        }

        mining.shutdown().await
    });

    println!("\n   {} block(s) mined in this session", mined);
    print_balances(&ctx)?;
    print_chain_info(&ctx.ledger);
    print_validation(&ctx.ledger);

    if let Some(path) = export {
        ctx.ledger.export().write_to(path)?;
        println!("📦 Ledger exported to {:?}", path);
    }

    Ok(())
}

fn print_balances(ctx: &AppContext) -> CliResult<()> {
    println!("💰 Balances:");
    for (label, name) in [("A", USER_A_WALLET), ("B", USER_B_WALLET), ("M", MINER_WALLET)] {
        let wallet = ctx.wallets.get(name)?;
        println!(
            "   {} {} ({})",
            label,
            ctx.ledger.balance_of(wallet.address()),
            wallet.address()
        );
    }
    Ok(())
}

fn print_chain_info(ledger: &SharedLedger) {
    let stats = ledger.stats();

    println!("⛓️  Ledger Info");
    println!("   ├─ Height: {}", stats.height);
    println!("   ├─ Total blocks: {}", stats.total_blocks);
    println!("   ├─ Total transactions: {}", stats.total_transactions);
    println!("   ├─ Pending: {}", stats.pending);
    println!("   ├─ Difficulty: {}", stats.difficulty);
    println!("   └─ Latest hash: {}", stats.latest_hash);
}

fn print_validation(ledger: &SharedLedger) {
    println!("🔍 Validating ledger...");

    if ledger.validate() {
        println!("✅ Ledger is valid!");
    } else {
        println!("❌ Ledger validation FAILED!");
        println!("   The chain may have been tampered with.");
    }
}
