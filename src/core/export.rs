//! Structured views of the ledger for external consumers
//!
//! Field names here are a contract with the companion wallet UI and must
//! not change.

use crate::core::amount::Amount;
use crate::core::block::Block;
use crate::core::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufWriter};
use std::path::Path;
use thiserror::Error;

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Snapshot of every block in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainExport {
    pub chains: Vec<Block>,
}

impl ChainExport {
    pub fn new(blocks: &[Block]) -> Self {
        Self {
            chains: blocks.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the export to a file as pretty JSON
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let file = fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// One pending transaction as shown to pool consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    pub sender_address: String,
    pub recipient_address: String,
    pub value: Amount,
}

impl From<&Transaction> for PoolEntry {
    fn from(tx: &Transaction) -> Self {
        Self {
            sender_address: tx.sender().to_string(),
            recipient_address: tx.recipient().to_string(),
            value: tx.value(),
        }
    }
}

/// Snapshot of the pending pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolView {
    pub transaction_pool: Vec<PoolEntry>,
    pub length: usize,
}

impl PoolView {
    pub fn new(pending: &[Transaction]) -> Self {
        Self {
            transaction_pool: pending.iter().map(PoolEntry::from).collect(),
            length: pending.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_export_shape() {
        let genesis = Block::genesis(
            vec![Transaction::new("genesis", "alice", Amount::from_coins(3000))],
            1,
            1_000,
        );
        let export = ChainExport::new(&[genesis]);
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();

        let block = &value["chains"][0];
        assert_eq!(block["timestamp"], serde_json::json!(1_000));
        assert_eq!(block["nonce"], serde_json::json!(0));
        assert_eq!(block["difficulty"], serde_json::json!(1));
        assert_eq!(
            block["transactions"][0]["recipientBlockchainAddress"],
            serde_json::json!("alice")
        );
        assert_eq!(block["transactions"][0]["value"], serde_json::json!(3000.0));
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        let export = ChainExport::new(&[Block::genesis(vec![], 1, 9)]);

        export.write_to(&path).unwrap();
        let read: ChainExport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, export);
        assert!(read.chains[0].verify_hash());
    }

    #[test]
    fn test_pool_view() {
        let pending = vec![
            Transaction::new("a", "b", Amount::from_coins(1)),
            Transaction::new("c", "d", Amount::from_coins(2)),
        ];
        let view = PoolView::new(&pending);
        assert_eq!(view.length, 2);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["transactionPool"][1]["senderAddress"], serde_json::json!("c"));
        assert_eq!(json["length"], serde_json::json!(2));
    }
}
