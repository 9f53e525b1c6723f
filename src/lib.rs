//! powledger: a proof-of-work account ledger in Rust
//!
//! This crate provides a single-node ledger featuring:
//! - Proof of Work with periodic difficulty adjustment
//! - ECDSA digital signatures (secp256k1)
//! - Account model with balances replayed from sealed history
//! - Base58Check wallet addresses
//! - A background mining loop with graceful shutdown
//! - JSON export of the chain and pending pool
//!
//! # Example
//!
//! ```rust
//! use powledger::core::{Amount, Ledger, LedgerConfig, Transaction, GENESIS_SOURCE};
//! use powledger::wallet::Wallet;
//!
//! let alice = Wallet::new();
//! let genesis = vec![Transaction::new(GENESIS_SOURCE, alice.address(), Amount::from_coins(10))];
//! let mut ledger = Ledger::new(genesis, LedgerConfig::default().with_difficulty(1));
//!
//! // Sign and submit a transfer
//! let value = Amount::from_coins(4);
//! let signature = alice.sign("bob", value).unwrap();
//! ledger
//!     .submit_transaction(alice.address(), "bob", value, Some(alice.public_key()), Some(&signature))
//!     .unwrap();
//!
//! // Seal it
//! let block = ledger.mine_block();
//! println!("Mined block {} with nonce {}", block.index(), block.nonce());
//!
//! assert_eq!(ledger.balance_of("bob"), Amount::from_coins(4));
//! assert!(ledger.validate());
//! ```

pub mod cli;
pub mod context;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod wallet;

// Re-export commonly used types
pub use context::AppContext;
pub use core::{
    Amount, Block, ChainExport, Ledger, LedgerConfig, SharedLedger, Transaction,
    TransactionRequest, DEFAULT_DIFFICULTY,
};
pub use crypto::{KeyPair, Signature};
pub use mining::{Miner, MiningLoop};
pub use wallet::{Wallet, WalletBook};
