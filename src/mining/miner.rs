//! Mining engine for the ledger
//!
//! [`Miner::mine_once`] seals a single block. [`Miner::run`] repeats that in
//! an explicit loop until its cancellation token fires; the token is checked
//! once per sealed block and while waiting between rounds. A round already
//! searching is never interrupted, since proof-of-work has no safe midpoint.

use crate::core::{Block, SharedLedger};
use log::{error, info};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

impl MiningStats {
    fn measure(block: &Block, elapsed: Duration) -> Self {
        // The search starts at nonce 0, so the winning nonce counts every miss
        let hash_attempts = block.nonce().saturating_add(1);
        let time_ms = elapsed.as_millis();
        let hash_rate = if time_ms > 0 {
            hash_attempts as f64 / (time_ms as f64 / 1000.0)
        } else {
            hash_attempts as f64
        };
        Self {
            hash_attempts,
            time_ms,
            hash_rate,
        }
    }
}

/// Miner configuration
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Pause between sealed blocks
    pub round_delay: Duration,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            round_delay: Duration::from_millis(0),
        }
    }
}

/// Miner driving a shared ledger
#[derive(Debug, Clone, Default)]
pub struct Miner {
    config: MinerConfig,
}

impl Miner {
    /// Create a new miner
    pub fn new(config: MinerConfig) -> Self {
        Self { config }
    }

    /// Mine one block into the ledger
    pub fn mine_once(&self, ledger: &SharedLedger) -> (Block, MiningStats) {
        let start = Instant::now();
        let block = ledger.mine_once();
        let stats = MiningStats::measure(&block, start.elapsed());

        info!(
            "Block {} mined in {}ms ({} attempts, {:.2} H/s)",
            block.index(),
            stats.time_ms,
            stats.hash_attempts,
            stats.hash_rate
        );

        (block, stats)
    }

    /// Mine blocks until `stop` is cancelled; returns how many were sealed.
    ///
    /// Each round runs on the blocking pool because the search is CPU-bound
    /// and holds the ledger lock for its whole duration.
    pub async fn run(&self, ledger: SharedLedger, stop: CancellationToken) -> u64 {
        let mut mined = 0u64;
        info!("Mining loop started");

        loop {
            if stop.is_cancelled() {
                break;
            }

            let miner = self.clone();
            let round_ledger = ledger.clone();
            match tokio::task::spawn_blocking(move || miner.mine_once(&round_ledger)).await {
                Ok(_) => mined += 1,
                Err(e) => {
                    error!("Mining round failed: {}", e);
                    break;
                }
            }

            tokio::select! {
                _ = stop.cancelled() => break,
                _ = tokio::time::sleep(self.config.round_delay) => {}
            }
        }

        info!("Mining loop stopped after {} block(s)", mined);
        mined
    }
}

/// A mining loop running in the background
pub struct MiningLoop {
    stop: CancellationToken,
    task: JoinHandle<u64>,
}

impl MiningLoop {
    /// Spawn `miner` against `ledger` on the current runtime
    pub fn spawn(miner: Miner, ledger: SharedLedger) -> Self {
        let stop = CancellationToken::new();
        let token = stop.clone();
        let task = tokio::spawn(async move { miner.run(ledger, token).await });
        Self { stop, task }
    }

    /// Token that stops the loop when cancelled
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop, wait for the round in progress to seal, and return the
    /// number of blocks mined
    pub async fn shutdown(self) -> u64 {
        self.stop.cancel();
        match self.task.await {
            Ok(mined) => mined,
            Err(e) => {
                error!("Mining loop task failed: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LedgerConfig;

    fn ledger(difficulty: u32) -> SharedLedger {
        SharedLedger::new(vec![], LedgerConfig::default().with_difficulty(difficulty))
    }

    #[test]
    fn test_miner() {
        let ledger = ledger(2);
        let miner = Miner::default();

        let (block, stats) = miner.mine_once(&ledger);

        assert_eq!(block.index(), 1);
        assert!(block.is_valid_pow());
        assert_eq!(stats.hash_attempts, block.nonce() + 1);
        assert_eq!(ledger.height(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_mines_nothing() {
        let ledger = ledger(1);
        let stop = CancellationToken::new();
        stop.cancel();

        let mined = Miner::default().run(ledger.clone(), stop).await;
        assert_eq!(mined, 0);
        assert_eq!(ledger.height(), 0);
    }

    #[tokio::test]
    async fn test_loop_mines_until_stopped() {
        let ledger = ledger(1);
        let mining = MiningLoop::spawn(
            Miner::new(MinerConfig {
                round_delay: Duration::from_millis(5),
            }),
            ledger.clone(),
        );

        while ledger.height() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let mined = mining.shutdown().await;

        assert!(mined >= 3);
        assert_eq!(ledger.height(), mined);
        assert!(ledger.validate());
    }

    #[tokio::test]
    async fn test_stop_token_ends_loop() {
        let ledger = ledger(1);
        let mining = MiningLoop::spawn(
            Miner::new(MinerConfig {
                round_delay: Duration::from_secs(60),
            }),
            ledger.clone(),
        );

        while ledger.height() < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        // Cancelling interrupts the long inter-round delay
        mining.stop_token().cancel();
        let mined = tokio::time::timeout(Duration::from_secs(5), mining.shutdown())
            .await
            .unwrap();
        assert_eq!(mined, 1);
    }
}
