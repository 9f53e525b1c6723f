//! Block implementation for the ledger
//!
//! A block is created exactly once, either as the genesis block or by the
//! proof-of-work search in [`Block::mine`], and is never modified afterwards.

use crate::core::transaction::Transaction;
use crate::crypto::{meets_difficulty, sha256_hex};
use serde::{Deserialize, Serialize};

/// Previous-hash sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A sealed block in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub(crate) index: u64,
    /// Unix timestamp in milliseconds
    pub(crate) timestamp: i64,
    pub(crate) previous_hash: String,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) nonce: u64,
    /// Required number of leading zero hex characters
    pub(crate) difficulty: u32,
    pub(crate) hash: String,
}

impl Block {
    /// Create the genesis block. It is not mined; its hash is simply the
    /// digest of its contents at nonce 0.
    pub fn genesis(transactions: Vec<Transaction>, difficulty: u32, timestamp: i64) -> Self {
        let txs_json = transactions_json(&transactions);
        let hash = hash_fields(0, timestamp, GENESIS_PREVIOUS_HASH, &txs_json, 0, difficulty);
        Self {
            index: 0,
            timestamp,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            transactions,
            nonce: 0,
            difficulty,
            hash,
        }
    }

    /// Run the proof-of-work search and return the sealed block.
    ///
    /// Starts at nonce 0 and increments until the digest meets `difficulty`.
    /// There is no iteration bound: an unreachable difficulty never returns.
    pub fn mine(
        index: u64,
        timestamp: i64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        difficulty: u32,
    ) -> Self {
        let txs_json = transactions_json(&transactions);
        let mut nonce = 0u64;

        let hash = loop {
            let candidate =
                hash_fields(index, timestamp, &previous_hash, &txs_json, nonce, difficulty);
            if meets_difficulty(&candidate, difficulty) {
                break candidate;
            }
            nonce = nonce.wrapping_add(1);
        };

        Self {
            index,
            timestamp,
            previous_hash,
            transactions,
            nonce,
            difficulty,
            hash,
        }
    }

    /// Recompute the digest from the block's fields (excluding `hash`)
    pub fn calculate_hash(&self) -> String {
        hash_fields(
            self.index,
            self.timestamp,
            &self.previous_hash,
            &transactions_json(&self.transactions),
            self.nonce,
            self.difficulty,
        )
    }

    /// Verify the stored hash against the block contents
    pub fn verify_hash(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    /// Check the stored hash meets the block's own difficulty
    pub fn is_valid_pow(&self) -> bool {
        meets_difficulty(&self.hash, self.difficulty)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Get number of transactions in this block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}

fn transactions_json(transactions: &[Transaction]) -> String {
    serde_json::to_string(transactions).unwrap_or_default()
}

fn hash_fields(
    index: u64,
    timestamp: i64,
    previous_hash: &str,
    txs_json: &str,
    nonce: u64,
    difficulty: u32,
) -> String {
    let preimage = format!(
        "{}-{}-{}-{}-{}-{}",
        index, timestamp, previous_hash, txs_json, nonce, difficulty
    );
    sha256_hex(preimage.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::Amount;

    fn sample_txs() -> Vec<Transaction> {
        vec![Transaction::new("a", "b", Amount::from_coins(3))]
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis(sample_txs(), 2, 1_700_000_000_000);
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.nonce(), 0);
        assert_eq!(genesis.previous_hash(), GENESIS_PREVIOUS_HASH);
        assert!(genesis.verify_hash());
    }

    #[test]
    fn test_block_mining() {
        let block = Block::mine(1, 1_700_000_000_000, "prev".into(), sample_txs(), 2);
        assert!(block.hash().starts_with("00"));
        assert!(block.is_valid_pow());
        assert!(block.verify_hash());
    }

    #[test]
    fn test_first_satisfying_nonce_is_chosen() {
        let block = Block::mine(3, 42, "prev".into(), sample_txs(), 1);
        let txs_json = transactions_json(block.transactions());
        for nonce in 0..block.nonce() {
            let earlier = hash_fields(3, 42, "prev", &txs_json, nonce, 1);
            assert!(!meets_difficulty(&earlier, 1));
        }
    }

    #[test]
    fn test_block_hash_verification() {
        let mut block = Block::mine(1, 7, "prev".into(), sample_txs(), 1);
        assert!(block.verify_hash());

        block.nonce += 1;
        assert!(!block.verify_hash());
    }

    #[test]
    fn test_tampered_transactions_detected() {
        let mut block = Block::mine(1, 7, "prev".into(), sample_txs(), 1);
        block
            .transactions
            .push(Transaction::new("x", "y", Amount::from_coins(1)));
        assert!(!block.verify_hash());
    }

    #[test]
    fn test_difficulty_is_part_of_the_hash() {
        let block = Block::mine(1, 7, "prev".into(), sample_txs(), 1);
        let mut relabelled = block.clone();
        relabelled.difficulty = 0;
        assert_ne!(relabelled.calculate_hash(), block.hash());
    }

    #[test]
    fn test_export_field_names() {
        let block = Block::genesis(sample_txs(), 1, 5);
        let value = serde_json::to_value(&block).unwrap();
        for field in [
            "index",
            "timestamp",
            "previousHash",
            "transactions",
            "nonce",
            "difficulty",
            "hash",
        ] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(
            value["transactions"][0]["senderBlockchainAddress"],
            serde_json::json!("a")
        );
    }
}
