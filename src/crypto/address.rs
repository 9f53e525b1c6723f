//! Wallet address derivation
//!
//! An address is the Base58Check encoding of a versioned RIPEMD-160 digest
//! of the SHA-256 of the public key's X‖Y coordinates:
//!
//! ```text
//! base58( 0x00 ‖ RIPEMD160(SHA256(X ‖ Y)) ‖ SHA256(SHA256(0x00 ‖ ...))[..4] )
//! ```
//!
//! The stage order is fixed; changing it changes every address.

use ripemd::Ripemd160;
use secp256k1::PublicKey;
use sha2::Digest;

use super::hash::{double_sha256, sha256};
use super::keys::{public_key_from_hex, KeyError, COORDINATE_LEN};

/// Network version byte prepended to the key hash (0x00 for mainnet)
pub const MAINNET_VERSION: u8 = 0x00;

/// Length of the checksum appended to the versioned payload
pub const CHECKSUM_LEN: usize = 4;

/// Length of the decoded address: version + RIPEMD-160 + checksum
pub const ADDRESS_BYTES_LEN: usize = 1 + 20 + CHECKSUM_LEN;

/// Convert a public key to a ledger address
pub fn derive_address(public_key: &PublicKey) -> String {
    let uncompressed = public_key.serialize_uncompressed();
    let (x, y) = uncompressed[1..].split_at(COORDINATE_LEN);
    encode_key_hash(&left_pad(x), &left_pad(y))
}

/// Derive an address from raw big-endian coordinates.
///
/// Coordinates shorter than the curve width are left-padded with zeros
/// first, so a coordinate with leading zero bytes yields the same address
/// whether or not those bytes were stripped.
pub fn address_from_coordinates(x: &[u8], y: &[u8]) -> Result<String, KeyError> {
    if x.len() > COORDINATE_LEN || y.len() > COORDINATE_LEN {
        return Err(KeyError::InvalidPublicKey);
    }
    Ok(encode_key_hash(&left_pad(x), &left_pad(y)))
}

/// Derive an address from the X‖Y hex encoding of a public key
pub fn address_from_public_key_hex(hex_key: &str) -> Result<String, KeyError> {
    let public_key = public_key_from_hex(hex_key)?;
    Ok(derive_address(&public_key))
}

/// Check that a string is a well-formed address: base58, 25 bytes,
/// mainnet version and a matching checksum.
pub fn is_valid_address(address: &str) -> bool {
    let Ok(bytes) = bs58::decode(address).into_vec() else {
        return false;
    };
    if bytes.len() != ADDRESS_BYTES_LEN || bytes[0] != MAINNET_VERSION {
        return false;
    }
    let (payload, checksum) = bytes.split_at(ADDRESS_BYTES_LEN - CHECKSUM_LEN);
    double_sha256(payload)[..CHECKSUM_LEN] == *checksum
}

fn left_pad(coordinate: &[u8]) -> [u8; COORDINATE_LEN] {
    let mut padded = [0u8; COORDINATE_LEN];
    padded[COORDINATE_LEN - coordinate.len()..].copy_from_slice(coordinate);
    padded
}

fn encode_key_hash(x: &[u8; COORDINATE_LEN], y: &[u8; COORDINATE_LEN]) -> String {
    // SHA256 of X ‖ Y
    let mut coordinates = [0u8; COORDINATE_LEN * 2];
    coordinates[..COORDINATE_LEN].copy_from_slice(x);
    coordinates[COORDINATE_LEN..].copy_from_slice(y);
    let sha256_hash = sha256(&coordinates);

    // RIPEMD160 of the SHA256 hash
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256_hash);
    let ripemd_hash = ripemd.finalize();

    // Add version byte
    let mut address_bytes = Vec::with_capacity(ADDRESS_BYTES_LEN);
    address_bytes.push(MAINNET_VERSION);
    address_bytes.extend_from_slice(&ripemd_hash);

    // Checksum: first 4 bytes of double SHA256
    let checksum = double_sha256(&address_bytes);
    address_bytes.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    bs58::encode(address_bytes).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    const KNOWN_PUBLIC_KEY: &str = "50863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352\
                                    2cd470243453a299fa9e77237716103abc11a1df38855ed6f2ee187e9c582ba6";

    #[test]
    fn test_known_vector() {
        assert_eq!(
            address_from_public_key_hex(KNOWN_PUBLIC_KEY).unwrap(),
            "1LRdmypMdxPWKMo3PQmMdbupCabYvMyvP1"
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let kp = KeyPair::generate();
        assert_eq!(derive_address(&kp.public_key), derive_address(&kp.public_key));
        assert_eq!(
            derive_address(&kp.public_key),
            address_from_public_key_hex(&kp.public_key_hex()).unwrap()
        );
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_address_format() {
        let address = KeyPair::generate().address();
        // Version byte 0x00 always encodes as a leading '1'
        assert!(address.starts_with('1'));
        assert!(is_valid_address(&address));
    }

    #[test]
    fn test_short_coordinates_are_left_padded() {
        let mut x = [0x5au8; COORDINATE_LEN];
        x[0] = 0x00;
        x[1] = 0x00;
        let mut y = [0xa5u8; COORDINATE_LEN];
        y[0] = 0x00;

        let padded = address_from_coordinates(&x, &y).unwrap();
        let stripped = address_from_coordinates(&x[2..], &y[1..]).unwrap();
        assert_eq!(padded, stripped);

        // Without padding the digest input would shrink and the address change
        let mut unpadded = x[2..].to_vec();
        unpadded.extend_from_slice(&y[1..]);
        let naive = {
            let mut ripemd = Ripemd160::new();
            ripemd.update(sha256(&unpadded));
            let mut bytes = vec![MAINNET_VERSION];
            bytes.extend_from_slice(&ripemd.finalize());
            let checksum = double_sha256(&bytes);
            bytes.extend_from_slice(&checksum[..CHECKSUM_LEN]);
            bs58::encode(bytes).into_string()
        };
        assert_ne!(padded, naive);
    }

    #[test]
    fn test_oversized_coordinates_rejected() {
        let long = [1u8; COORDINATE_LEN + 1];
        assert!(address_from_coordinates(&long, &[1u8; 4]).is_err());
    }

    #[test]
    fn test_malformed_key_fails_closed() {
        assert!(address_from_public_key_hex("").is_err());
        assert!(address_from_public_key_hex(&"g".repeat(128)).is_err());
    }

    #[test]
    fn test_is_valid_address_rejects_tampering() {
        let address = KeyPair::generate().address();
        let mut chars: Vec<char> = address.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '2' { '3' } else { '2' };
        let tampered: String = chars.into_iter().collect();

        assert!(!is_valid_address(&tampered));
        assert!(!is_valid_address("MINER_ADDRESS"));
        assert!(!is_valid_address("0OIl"));
    }
}
