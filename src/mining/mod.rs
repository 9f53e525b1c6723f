//! Mining module for sealing blocks and running the background mining loop

pub mod miner;

pub use miner::{Miner, MinerConfig, MiningLoop, MiningStats};
