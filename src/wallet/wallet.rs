//! Wallet implementation for the ledger
//!
//! A wallet owns a key pair, derives its address once and signs transfers.

use crate::core::{Amount, Ledger, Transaction, TransactionError};
use crate::crypto::{KeyError, KeyPair, Signature};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet already exists: {0}")]
    DuplicateName(String),
    #[error("Wallet not found: {0}")]
    NotFound(String),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
    #[error("Transfer rejected: {0}")]
    Rejected(#[from] TransactionError),
}

/// A ledger wallet
#[derive(Clone)]
pub struct Wallet {
    /// The key pair for signing transactions
    key_pair: KeyPair,
    /// Derived once at creation
    address: String,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self::from_key_pair(KeyPair::generate())
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        Ok(Self::from_key_pair(KeyPair::from_private_key_hex(
            private_key_hex,
        )?))
    }

    fn from_key_pair(key_pair: KeyPair) -> Self {
        let address = key_pair.address();
        Self { key_pair, address }
    }

    /// Get the wallet's address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        &self.key_pair.public_key
    }

    /// Get the wallet's public key as X‖Y hex
    pub fn public_key_hex(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Get the wallet's private key (hex)
    /// WARNING: Keep this secret!
    pub fn private_key_hex(&self) -> String {
        self.key_pair.private_key_hex()
    }

    /// Sign a transfer of `value` from this wallet to `recipient`
    pub fn sign(&self, recipient: &str, value: Amount) -> Result<Signature, WalletError> {
        let tx = Transaction::new(&self.address, recipient, value);
        self.sign_transaction(&tx)
    }

    /// Sign an arbitrary transaction's canonical form
    pub fn sign_transaction(&self, tx: &Transaction) -> Result<Signature, WalletError> {
        Ok(self.key_pair.sign(&tx.signing_hash())?)
    }

    /// Get the settled balance from the ledger
    pub fn balance(&self, ledger: &Ledger) -> Amount {
        ledger.balance_of(&self.address)
    }

    /// Export wallet keys and address
    pub fn info(&self) -> WalletInfo {
        WalletInfo {
            private_key: self.private_key_hex(),
            public_key: self.public_key_hex(),
            blockchain_address: self.address.clone(),
        }
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Wallet keys and address as handed to the wallet UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub private_key: String,
    pub public_key: String,
    pub blockchain_address: String,
}

/// A named collection of wallets
#[derive(Clone, Default)]
pub struct WalletBook {
    wallets: BTreeMap<String, Wallet>,
}

impl WalletBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wallet under a name that is not yet taken
    pub fn insert(&mut self, name: &str, wallet: Wallet) -> Result<&Wallet, WalletError> {
        if self.wallets.contains_key(name) {
            return Err(WalletError::DuplicateName(name.to_string()));
        }
        Ok(self.wallets.entry(name.to_string()).or_insert(wallet))
    }

    /// Create a fresh wallet under `name`
    pub fn create(&mut self, name: &str) -> Result<&Wallet, WalletError> {
        self.insert(name, Wallet::new())
    }

    pub fn get(&self, name: &str) -> Result<&Wallet, WalletError> {
        self.wallets
            .get(name)
            .ok_or_else(|| WalletError::NotFound(name.to_string()))
    }

    /// Wallet names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.wallets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
