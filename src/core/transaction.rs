//! Transaction handling for the ledger
//!
//! A transaction is an immutable account-to-account transfer. Its canonical
//! JSON form is what gets signed, hashed into blocks and exported.

use crate::core::amount::Amount;
use crate::crypto::{sha256, verify_signature, KeyError, Signature};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Reserved identities
// =============================================================================

/// Sender of system-originated rewards. Bypasses signature and balance checks.
pub const MINT_SOURCE: &str = "BLOCKCHAIN_CORE";

/// Default payout target for mining rewards
pub const MINER_ADDRESS: &str = "MINER_ADDRESS";

/// Sender used for credits seeded into the genesis block
pub const GENESIS_SOURCE: &str = "genesis";

// =============================================================================
// Error Types
// =============================================================================

/// Reasons a transaction is refused admission
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Public key does not own sender address {0}")]
    SenderKeyMismatch(String),
    #[error("Missing public key or signature")]
    MissingCredentials,
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },
    #[error("Negative transfer value: {0}")]
    NegativeValue(Amount),
    #[error("Transfer value {0} exceeds the exactly representable range")]
    ValueOutOfRange(Amount),
    #[error("Transfer from {0} was already admitted with this signature")]
    Replayed(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Crypto error: {0}")]
    Crypto(#[from] KeyError),
}

// =============================================================================
// Transaction
// =============================================================================

/// A value transfer between two addresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "senderBlockchainAddress")]
    sender: String,
    #[serde(rename = "recipientBlockchainAddress")]
    recipient: String,
    value: Amount,
}

impl Transaction {
    pub fn new(sender: &str, recipient: &str, value: Amount) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            value,
        }
    }

    /// Reward transaction minted for a sealed block
    pub fn reward(recipient: &str, value: Amount) -> Self {
        Self::new(MINT_SOURCE, recipient, value)
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    /// Whether this transaction was issued by the mint
    pub fn is_reward(&self) -> bool {
        self.sender == MINT_SOURCE
    }

    /// Canonical serialization: compact JSON with fixed field order
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Three plain fields; serialization cannot fail
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// SHA-256 of the canonical serialization; this is what gets signed
    pub fn signing_hash(&self) -> [u8; 32] {
        sha256(&self.canonical_bytes())
    }

    /// Verify a signature over this transaction
    pub fn verify(&self, public_key: &PublicKey, signature: &Signature) -> bool {
        verify_signature(public_key, &self.signing_hash(), signature).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_canonical_json() {
        let tx = Transaction::new("alice", "bob", Amount::from_coins(1000));
        assert_eq!(
            String::from_utf8(tx.canonical_bytes()).unwrap(),
            r#"{"senderBlockchainAddress":"alice","recipientBlockchainAddress":"bob","value":1000.0}"#
        );
    }

    #[test]
    fn test_signing_hash_depends_on_every_field() {
        let base = Transaction::new("alice", "bob", Amount::from_coins(1));
        let hashes = [
            Transaction::new("carol", "bob", Amount::from_coins(1)).signing_hash(),
            Transaction::new("alice", "carol", Amount::from_coins(1)).signing_hash(),
            Transaction::new("alice", "bob", Amount::from_coins(2)).signing_hash(),
        ];
        for h in hashes {
            assert_ne!(h, base.signing_hash());
        }
    }

    #[test]
    fn test_verify() {
        let kp = KeyPair::generate();
        let tx = Transaction::new(&kp.address(), "bob", Amount::from_coins(5));
        let sig = kp.sign(&tx.signing_hash()).unwrap();

        assert!(tx.verify(&kp.public_key, &sig));

        let forged = Transaction::new(&kp.address(), "bob", Amount::from_coins(50));
        assert!(!forged.verify(&kp.public_key, &sig));

        let stranger = KeyPair::generate();
        assert!(!tx.verify(&stranger.public_key, &sig));
    }

    #[test]
    fn test_reward() {
        let tx = Transaction::reward(MINER_ADDRESS, Amount::from_units(10_000_000));
        assert!(tx.is_reward());
        assert_eq!(tx.sender(), MINT_SOURCE);
        assert!(!Transaction::new(GENESIS_SOURCE, "a", Amount::ZERO).is_reward());
    }
}
