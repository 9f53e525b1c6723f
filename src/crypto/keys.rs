//! ECDSA key management for the ledger
//!
//! Provides key pair generation, signing, and verification using
//! the secp256k1 elliptic curve, plus the fixed-width hex encodings
//! wallets hand to the outside world.

use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::address::derive_address;
use super::signature::Signature;

/// Width of one curve coordinate in bytes
pub const COORDINATE_LEN: usize = 32;

/// Length of the X‖Y public key encoding in hex characters
pub const PUBLIC_KEY_HEX_LEN: usize = COORDINATE_LEN * 2 * 2;

/// Tag byte of an uncompressed SEC1 public key
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Malformed hex: expected {expected} hex characters, got {got}")]
    MalformedHex { expected: usize, got: usize },
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a 64 character hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as X‖Y hex, each coordinate zero-padded to 64 chars
    pub fn public_key_hex(&self) -> String {
        public_key_to_hex(&self.public_key)
    }

    /// Derive the ledger address for this key pair
    pub fn address(&self) -> String {
        derive_address(&self.public_key)
    }

    /// Sign a 32-byte message hash with the private key
    pub fn sign(&self, message_hash: &[u8; 32]) -> Result<Signature, KeyError> {
        sign_message(&self.secret_key, message_hash)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, message_hash: &[u8; 32], signature: &Signature) -> Result<bool, KeyError> {
        verify_signature(&self.public_key, message_hash, signature)
    }
}

/// Encode a public key as the concatenated big-endian X and Y coordinates
pub fn public_key_to_hex(public_key: &PublicKey) -> String {
    hex::encode(&public_key.serialize_uncompressed()[1..])
}

/// Parse a public key from its X‖Y hex form.
///
/// Anything that is not exactly 128 hex characters describing a point on
/// the curve is rejected.
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    if hex_key.len() != PUBLIC_KEY_HEX_LEN {
        return Err(KeyError::MalformedHex {
            expected: PUBLIC_KEY_HEX_LEN,
            got: hex_key.len(),
        });
    }
    let coordinates = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;

    let mut sec1 = Vec::with_capacity(1 + coordinates.len());
    sec1.push(UNCOMPRESSED_TAG);
    sec1.extend_from_slice(&coordinates);
    PublicKey::from_slice(&sec1).map_err(|_| KeyError::InvalidPublicKey)
}

/// Sign a message hash with a secret key
pub fn sign_message(secret_key: &SecretKey, message_hash: &[u8; 32]) -> Result<Signature, KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(message_hash)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(Signature::from_ecdsa(&signature))
}

/// Verify a signature against a public key
pub fn verify_signature(
    public_key: &PublicKey,
    message_hash: &[u8; 32],
    signature: &Signature,
) -> Result<bool, KeyError> {
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest_slice(message_hash)?;
    // libsecp256k1 only verifies low-S; external signers may emit either half
    let mut sig = signature.to_ecdsa()?;
    sig.normalize_s();

    match secp.verify_ecdsa(&message, &sig, public_key) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
