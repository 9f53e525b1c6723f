//! The ledger's single critical section
//!
//! One mutex per ledger serializes mining and admission. A mining round
//! holds the lock for its entire proof-of-work search, so submissions and
//! balance queries issued meanwhile block and run once the block is sealed.
//! They queue; nothing is dropped. Every read that must observe a
//! consistent snapshot (export, balances, validation) takes the same lock.

use crate::core::amount::Amount;
use crate::core::block::Block;
use crate::core::blockchain::{ChainStats, Ledger};
use crate::core::config::LedgerConfig;
use crate::core::export::{ChainExport, PoolView};
use crate::core::request::TransactionRequest;
use crate::core::transaction::{Transaction, TransactionError};
use crate::crypto::Signature;
use secp256k1::PublicKey;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to one ledger instance
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(genesis_transactions: Vec<Transaction>, config: LedgerConfig) -> Self {
        Self::from_ledger(Ledger::new(genesis_transactions, config))
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Enter the critical section.
    ///
    /// A panic while holding the lock cannot leave a half-sealed block behind
    /// (blocks are appended only once complete), so a poisoned lock is
    /// recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only closure against a consistent snapshot
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.lock())
    }

    /// Mine one block, holding the lock for the whole search
    pub fn mine_once(&self) -> Block {
        self.lock().mine_block()
    }

    pub fn submit_transaction(
        &self,
        sender: &str,
        recipient: &str,
        value: Amount,
        public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> Result<(), TransactionError> {
        self.lock()
            .submit_transaction(sender, recipient, value, public_key, signature)
    }

    /// Boolean form of [`SharedLedger::submit_transaction`]
    pub fn try_submit(
        &self,
        sender: &str,
        recipient: &str,
        value: Amount,
        public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> bool {
        self.submit_transaction(sender, recipient, value, public_key, signature)
            .is_ok()
    }

    /// Admit a transport-level request. Malformed requests are rejected
    /// before the lock is taken.
    pub fn submit_request(&self, request: &TransactionRequest) -> Result<(), TransactionError> {
        let submission = request
            .parse()
            .map_err(|e| TransactionError::MalformedInput(e.to_string()))?;
        self.submit_transaction(
            &submission.sender,
            &submission.recipient,
            submission.value,
            Some(&submission.public_key),
            Some(&submission.signature),
        )
    }

    pub fn validate(&self) -> bool {
        self.lock().validate()
    }

    pub fn balance_of(&self, address: &str) -> Amount {
        self.lock().balance_of(address)
    }

    pub fn balances(&self) -> BTreeMap<String, Amount> {
        self.lock().balances()
    }

    pub fn export(&self) -> ChainExport {
        self.lock().export()
    }

    pub fn pool_view(&self) -> PoolView {
        self.lock().pool_view()
    }

    pub fn stats(&self) -> ChainStats {
        self.lock().stats()
    }

    pub fn height(&self) -> u64 {
        self.lock().height()
    }

    pub fn set_difficulty(&self, difficulty: u32) {
        self.lock().set_difficulty(difficulty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{GENESIS_SOURCE, MINT_SOURCE};
    use crate::crypto::KeyPair;
    use std::thread;

    #[test]
    fn test_clones_share_one_ledger() {
        let ledger = SharedLedger::new(vec![], LedgerConfig::default().with_difficulty(1));
        let other = ledger.clone();

        other.mine_once();
        assert_eq!(ledger.height(), 1);
        assert!(ledger.validate());
    }

    #[test]
    fn test_concurrent_submissions_all_land() {
        let ledger = SharedLedger::new(vec![], LedgerConfig::default().with_difficulty(1));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    ledger.try_submit(MINT_SOURCE, &format!("user{}", i), Amount::from_coins(1), None, None)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        assert_eq!(ledger.pool_view().length, 8);
        let block = ledger.mine_once();
        assert_eq!(block.tx_count(), 9);
        assert_eq!(ledger.pool_view().length, 0);
    }

    #[test]
    fn test_submissions_during_mining_queue() {
        let ledger = SharedLedger::new(vec![], LedgerConfig::default().with_difficulty(3));

        let miner = {
            let ledger = ledger.clone();
            thread::spawn(move || ledger.mine_once())
        };
        let submitter = {
            let ledger = ledger.clone();
            thread::spawn(move || {
                ledger.try_submit(MINT_SOURCE, "late", Amount::from_coins(1), None, None)
            })
        };

        let block = miner.join().unwrap();
        assert!(submitter.join().unwrap());

        // Either the submission made it into the block, or it waits in the pool
        let sealed = block.transactions().iter().any(|tx| tx.recipient() == "late");
        let pooled = ledger.pool_view().length == 1;
        assert!(sealed ^ pooled);
    }

    #[test]
    fn test_submit_request() {
        let alice = KeyPair::generate();
        let ledger = SharedLedger::new(
            vec![Transaction::new(GENESIS_SOURCE, &alice.address(), Amount::from_coins(10))],
            LedgerConfig::default().with_difficulty(1),
        );

        let tx = Transaction::new(&alice.address(), "bob", Amount::from_coins(4));
        let signature = alice.sign(&tx.signing_hash()).unwrap();
        let request = TransactionRequest {
            sender_blockchain_address: Some(alice.address()),
            recipient_blockchain_address: Some("bob".into()),
            sender_public_key: Some(alice.public_key_hex()),
            value: Some(Amount::from_coins(4)),
            signature: Some(signature.to_string()),
        };
        ledger.submit_request(&request).unwrap();
        assert_eq!(ledger.pool_view().length, 1);
        assert!(matches!(
            ledger.submit_request(&request),
            Err(TransactionError::Replayed(_))
        ));

        let garbled = TransactionRequest {
            signature: Some("zz".into()),
            ..request
        };
        assert!(matches!(
            ledger.submit_request(&garbled),
            Err(TransactionError::MalformedInput(_))
        ));
        assert_eq!(ledger.pool_view().length, 1);
    }
}
