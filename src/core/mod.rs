//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Amounts (signed fixed-precision values)
//! - Transactions (account-to-account transfers with canonical signing form)
//! - Blocks (with proof of work)
//! - Ledger (mining, admission, balance replay, validation)
//! - Shared ledger (the one lock serializing mining and admission)
//! - Transport requests and export views

pub mod amount;
pub mod block;
pub mod blockchain;
pub mod config;
pub mod export;
pub mod request;
pub mod shared;
pub mod transaction;

pub use amount::{Amount, ParseAmountError, MAX_EXACT_UNITS, UNITS_PER_COIN};
pub use block::{Block, GENESIS_PREVIOUS_HASH};
pub use blockchain::{ChainError, ChainStats, Ledger};
pub use config::{
    ConfigError, LedgerConfig, DEFAULT_DIFFICULTY, DIFFICULTY_ADJUSTMENT_INTERVAL, MAX_DIFFICULTY,
    MIN_DIFFICULTY, TARGET_BLOCK_TIME_MS,
};
pub use export::{ChainExport, ExportError, PoolEntry, PoolView};
pub use request::{RequestError, Submission, TransactionRequest};
pub use shared::SharedLedger;
pub use transaction::{
    Transaction, TransactionError, GENESIS_SOURCE, MINER_ADDRESS, MINT_SOURCE,
};
