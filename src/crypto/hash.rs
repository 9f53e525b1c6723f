//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 based digests used for block hashes, transaction
//! signing hashes and address checksums, plus the proof-of-work predicate.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Computes SHA-256 hash and returns it as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a hex digest meets the difficulty target.
///
/// Difficulty is the number of leading `'0'` hex characters the digest must
/// carry. This is the only encoding used anywhere in the crate: mining,
/// validation and serialization all go through this function.
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    let required = difficulty as usize;
    if required > hash_hex.len() {
        return false;
    }
    hash_hex.bytes().take(required).all(|b| b == b'0')
}

/// Renders a difficulty as the literal prefix a digest must start with
pub fn difficulty_prefix(difficulty: u32) -> String {
    "0".repeat(difficulty as usize)
}
