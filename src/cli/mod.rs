//! Command-line interface handlers

pub mod commands;

pub use commands::{cmd_address, cmd_demo, cmd_run, cmd_sign, cmd_wallet_new, CliResult};
