//! Wallet module for key management and signing

pub mod wallet;

pub use wallet::{Wallet, WalletBook, WalletError, WalletInfo};
