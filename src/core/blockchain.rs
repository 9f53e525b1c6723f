//! Ledger implementation
//!
//! The ledger owns every block and the pending pool. It runs the mining
//! engine, admits transactions and validates the hash chain. Callers only
//! ever reach its state through the operations below.

use crate::core::amount::Amount;
use crate::core::block::{Block, GENESIS_PREVIOUS_HASH};
use crate::core::config::{LedgerConfig, MAX_DIFFICULTY};
use crate::core::export::{ChainExport, PoolView};
use crate::core::transaction::{Transaction, TransactionError, MINT_SOURCE};
use crate::crypto::{derive_address, difficulty_prefix, Signature};
use chrono::Utc;
use log::{debug, info, warn};
use secp256k1::PublicKey;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Chain integrity violations found by the validator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("Invalid genesis block")]
    InvalidGenesis,
    #[error("Block {index} does not follow its predecessor's index")]
    IndexGap { index: u64 },
    #[error("Block {index} does not link to the previous block hash")]
    BrokenLink { index: u64 },
    #[error("Block {index} hash does not match its contents")]
    HashMismatch { index: u64 },
    #[error("Block {index} hash does not meet its difficulty")]
    InsufficientWork { index: u64 },
}

/// The ledger: sealed blocks, the pending pool and the current difficulty
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: u32,
    config: LedgerConfig,
    /// Every signed transfer ever admitted, keyed by signing hash and low-S
    /// signature. Pool entries are only ever drained into blocks, so this
    /// covers both pending and sealed transfers.
    admitted: HashSet<([u8; 32], Signature)>,
}

impl Ledger {
    /// Create a ledger whose genesis block holds `genesis_transactions`
    pub fn new(genesis_transactions: Vec<Transaction>, config: LedgerConfig) -> Self {
        let difficulty = config.clamp_difficulty(config.initial_difficulty);
        let genesis = Block::genesis(
            genesis_transactions,
            difficulty,
            Utc::now().timestamp_millis(),
        );
        info!(
            "Ledger created: genesis {} with {} transaction(s), difficulty {}",
            genesis.hash(),
            genesis.tx_count(),
            difficulty
        );

        Self {
            blocks: vec![genesis],
            pending: Vec::new(),
            difficulty,
            config,
            admitted: HashSet::new(),
        }
    }

    /// Create a ledger with default configuration at the given difficulty
    pub fn with_difficulty(genesis_transactions: Vec<Transaction>, difficulty: u32) -> Self {
        Self::new(
            genesis_transactions,
            LedgerConfig::default().with_difficulty(difficulty),
        )
    }

    /// Get the latest block
    pub fn latest_block(&self) -> &Block {
        // The genesis block is created in `new` and blocks are never removed
        &self.blocks[self.blocks.len() - 1]
    }

    /// Get a block by index
    pub fn get_block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Get ledger height (index of the latest block)
    pub fn height(&self) -> u64 {
        self.latest_block().index()
    }

    /// Difficulty in force for the next block unless an adjustment applies
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Override the current difficulty; affects future blocks only
    pub fn set_difficulty(&mut self, difficulty: u32) {
        let clamped = self.config.clamp_difficulty(difficulty);
        info!("Difficulty set from {} to {}", self.difficulty, clamped);
        self.difficulty = clamped;
    }

    // =========================================================================
    // Mining
    // =========================================================================

    /// Difficulty the next block will be mined at.
    ///
    /// Every `adjustment_interval` blocks the time taken by the last window
    /// is compared against the expected time: under half moves the target
    /// one step stricter, over double one step looser. Otherwise the current
    /// difficulty carries over.
    pub fn next_difficulty(&self) -> u32 {
        let latest = self.latest_block();
        let interval = self.config.adjustment_interval;

        let at_boundary = latest.index() != 0 && latest.index().checked_rem(interval) == Some(0);
        if !at_boundary {
            debug!("Difficulty adjustment not due at block {}", latest.index());
            return self.difficulty;
        }

        let Some(anchor) = self.get_block(latest.index() - interval) else {
            return self.difficulty;
        };
        let taken = latest.timestamp().saturating_sub(anchor.timestamp());
        let expected = self.config.expected_window_ms();

        let adjusted = if taken < expected / 2 {
            self.config
                .clamp_difficulty(self.difficulty.saturating_add(1).min(MAX_DIFFICULTY))
        } else if taken > expected.saturating_mul(2) {
            self.config.clamp_difficulty(self.difficulty.saturating_sub(1))
        } else {
            self.difficulty
        };

        info!(
            "Difficulty adjusted from {} to {} (blocks {}..{} took {}ms, expected {}ms)",
            self.difficulty,
            adjusted,
            anchor.index(),
            latest.index(),
            taken,
            expected
        );
        adjusted
    }

    /// Mine the pending pool into a new block and append it.
    ///
    /// The reward transaction is pushed into the pool before the search
    /// starts, so it is part of the sealed contents. The pool is empty
    /// afterwards. This never fails; at an unreachable difficulty it never
    /// returns.
    pub fn mine_block(&mut self) -> Block {
        self.difficulty = self.next_difficulty();

        let reward = Transaction::reward(&self.config.payout_address, self.config.mining_reward);
        self.pending.push(reward);

        let (index, previous_hash) = {
            let latest = self.latest_block();
            (latest.index() + 1, latest.hash().to_string())
        };
        let timestamp = Utc::now().timestamp_millis();
        let transactions = std::mem::take(&mut self.pending);

        info!(
            "Mining block {} with difficulty {} ({}), {} transaction(s)...",
            index,
            self.difficulty,
            difficulty_prefix(self.difficulty),
            transactions.len()
        );

        let block = Block::mine(index, timestamp, previous_hash, transactions, self.difficulty);

        info!(
            "Block {} mined: nonce {}, hash {}",
            block.index(),
            block.nonce(),
            block.hash()
        );

        self.blocks.push(block.clone());
        block
    }

    // =========================================================================
    // Admission
    // =========================================================================

    /// Admit a transfer into the pending pool.
    ///
    /// Mint-sourced transfers are accepted unconditionally. Everything else
    /// must carry a valid signature over the canonical transaction and be
    /// covered by the sender's settled balance. A rejection leaves the ledger
    /// untouched.
    pub fn submit_transaction(
        &mut self,
        sender: &str,
        recipient: &str,
        value: Amount,
        public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> Result<(), TransactionError> {
        let tx = Transaction::new(sender, recipient, value);

        if sender == MINT_SOURCE {
            debug!("Accepted mint transfer of {} to {}", value, recipient);
            self.pending.push(tx);
            return Ok(());
        }

        let replay_key = match self.check_admission(&tx, public_key, signature) {
            Ok(key) => key,
            Err(e) => {
                warn!("Rejected transfer {} -> {} of {}: {}", sender, recipient, value, e);
                return Err(e);
            }
        };

        info!("Accepted transfer {} -> {} of {}", sender, recipient, value);
        self.admitted.insert(replay_key);
        self.pending.push(tx);
        Ok(())
    }

    fn check_admission(
        &self,
        tx: &Transaction,
        public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> Result<([u8; 32], Signature), TransactionError> {
        if tx.value().is_negative() {
            return Err(TransactionError::NegativeValue(tx.value()));
        }
        if !tx.value().is_exact() {
            return Err(TransactionError::ValueOutOfRange(tx.value()));
        }

        let (Some(public_key), Some(signature)) = (public_key, signature) else {
            return Err(TransactionError::MissingCredentials);
        };
        if !tx.verify(public_key, signature) {
            return Err(TransactionError::InvalidSignature);
        }
        if self.config.bind_sender_to_key && derive_address(public_key) != tx.sender() {
            return Err(TransactionError::SenderKeyMismatch(tx.sender().to_string()));
        }

        // Signatures are deterministic and carry no nonce, so an identical
        // signed transfer can only ever be admitted once
        let replay_key = (tx.signing_hash(), signature.normalized()?);
        if self.admitted.contains(&replay_key) {
            return Err(TransactionError::Replayed(tx.sender().to_string()));
        }

        let balance = self.balance_of(tx.sender());
        if balance < tx.value() {
            return Err(TransactionError::InsufficientBalance {
                have: balance,
                need: tx.value(),
            });
        }

        Ok(replay_key)
    }

    // =========================================================================
    // Balances
    // =========================================================================

    /// Settled balance of an address, replayed from sealed blocks only
    pub fn balance_of(&self, address: &str) -> Amount {
        let mut total = Amount::ZERO;
        for tx in self.blocks.iter().flat_map(|b| b.transactions()) {
            if tx.recipient() == address {
                total += tx.value();
            }
            if tx.sender() == address {
                total -= tx.value();
            }
        }
        total
    }

    /// Settled balance of every address that appears in a sealed block
    pub fn balances(&self) -> BTreeMap<String, Amount> {
        let mut balances = BTreeMap::new();
        for tx in self.blocks.iter().flat_map(|b| b.transactions()) {
            *balances.entry(tx.recipient().to_string()).or_insert(Amount::ZERO) += tx.value();
            *balances.entry(tx.sender().to_string()).or_insert(Amount::ZERO) -= tx.value();
        }
        balances
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the structural integrity of the hash chain
    pub fn verify_chain(&self) -> Result<(), ChainError> {
        let genesis = self.blocks.first().ok_or(ChainError::InvalidGenesis)?;
        if genesis.index() != 0
            || genesis.previous_hash() != GENESIS_PREVIOUS_HASH
            || !genesis.verify_hash()
        {
            return Err(ChainError::InvalidGenesis);
        }

        for pair in self.blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = current.index();

            if index != previous.index() + 1 {
                return Err(ChainError::IndexGap { index });
            }
            if current.previous_hash() != previous.hash() {
                return Err(ChainError::BrokenLink { index });
            }
            if !current.verify_hash() {
                return Err(ChainError::HashMismatch { index });
            }
            if !current.is_valid_pow() {
                return Err(ChainError::InsufficientWork { index });
            }
        }

        Ok(())
    }

    /// Validate the entire chain
    pub fn validate(&self) -> bool {
        match self.verify_chain() {
            Ok(()) => {
                debug!("Chain of {} block(s) is valid", self.blocks.len());
                true
            }
            Err(e) => {
                warn!("Chain is not valid: {}", e);
                false
            }
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Structured snapshot of every block
    pub fn export(&self) -> ChainExport {
        ChainExport::new(&self.blocks)
    }

    /// Snapshot of the pending pool
    pub fn pool_view(&self) -> PoolView {
        PoolView::new(&self.pending)
    }

    /// Get chain statistics
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            height: self.height(),
            total_blocks: self.blocks.len() as u64,
            total_transactions: self.blocks.iter().map(|b| b.tx_count() as u64).sum(),
            pending: self.pending.len(),
            difficulty: self.difficulty,
            latest_hash: self.latest_block().hash().to_string(),
        }
    }

    /// Rebuild a ledger around an existing block list
    #[cfg(test)]
    pub(crate) fn from_blocks(blocks: Vec<Block>, config: LedgerConfig) -> Self {
        let difficulty = blocks
            .last()
            .map(Block::difficulty)
            .unwrap_or(config.initial_difficulty);
        Self {
            blocks,
            pending: Vec::new(),
            difficulty,
            config,
            admitted: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}

/// Chain statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    pub height: u64,
    pub total_blocks: u64,
    pub total_transactions: u64,
    pub pending: usize,
    pub difficulty: u32,
    pub latest_hash: String,
}
