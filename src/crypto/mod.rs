//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-256 hashing and the proof-of-work predicate
//! - ECDSA key management (secp256k1)
//! - Base58Check address derivation
//! - Fixed-width signature encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod signature;

pub use address::{
    address_from_coordinates, address_from_public_key_hex, derive_address, is_valid_address,
    MAINNET_VERSION,
};
pub use hash::{difficulty_prefix, double_sha256, meets_difficulty, sha256, sha256_hex};
pub use keys::{
    public_key_from_hex, public_key_to_hex, sign_message, verify_signature, KeyError, KeyPair,
};
pub use signature::Signature;
