//! Fixed-width signature encoding
//!
//! A signature travels as 128 lowercase hex characters: R then S, each a
//! big-endian unsigned integer zero-padded to 64 characters.

use std::fmt;
use std::str::FromStr;

use secp256k1::ecdsa;

use super::keys::KeyError;

/// Width of one signature scalar in bytes
pub const SCALAR_LEN: usize = 32;

/// Length of the hex encoding of a signature
pub const SIGNATURE_HEX_LEN: usize = SCALAR_LEN * 2 * 2;

/// An ECDSA signature split into its R and S scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub r: [u8; SCALAR_LEN],
    pub s: [u8; SCALAR_LEN],
}

impl Signature {
    /// Build a signature from its two scalars
    pub fn new(r: [u8; SCALAR_LEN], s: [u8; SCALAR_LEN]) -> Self {
        Self { r, s }
    }

    /// Split a secp256k1 signature into R and S
    pub fn from_ecdsa(signature: &ecdsa::Signature) -> Self {
        let compact = signature.serialize_compact();
        let mut r = [0u8; SCALAR_LEN];
        let mut s = [0u8; SCALAR_LEN];
        r.copy_from_slice(&compact[..SCALAR_LEN]);
        s.copy_from_slice(&compact[SCALAR_LEN..]);
        Self { r, s }
    }

    /// Reassemble the secp256k1 signature, failing if R or S is out of range
    pub fn to_ecdsa(&self) -> Result<ecdsa::Signature, KeyError> {
        let mut compact = [0u8; SCALAR_LEN * 2];
        compact[..SCALAR_LEN].copy_from_slice(&self.r);
        compact[SCALAR_LEN..].copy_from_slice(&self.s);
        ecdsa::Signature::from_compact(&compact).map_err(|_| KeyError::InvalidSignature)
    }

    /// The same signature with S in the lower half of the curve order.
    ///
    /// `(r, s)` and `(r, n - s)` verify identically, so this is the form to
    /// compare when two signatures must be recognised as the same.
    pub fn normalized(&self) -> Result<Self, KeyError> {
        let mut signature = self.to_ecdsa()?;
        signature.normalize_s();
        Ok(Self::from_ecdsa(&signature))
    }

    /// Whether S is already in the lower half of the curve order
    pub fn is_low_s(&self) -> bool {
        self.normalized().map(|n| n == *self).unwrap_or(false)
    }

    /// The malleated twin `(r, n - s)`
    #[cfg(test)]
    pub(crate) fn negate_s(&self) -> Self {
        const CURVE_ORDER: [u8; SCALAR_LEN] = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c,
            0xd0, 0x36, 0x41, 0x41,
        ];
        let mut s = [0u8; SCALAR_LEN];
        let mut borrow = 0i16;
        for i in (0..SCALAR_LEN).rev() {
            let mut digit = CURVE_ORDER[i] as i16 - self.s[i] as i16 - borrow;
            borrow = 0;
            if digit < 0 {
                digit += 256;
                borrow = 1;
            }
            s[i] = digit as u8;
        }
        Self { r: self.r, s }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", hex::encode(self.r), hex::encode(self.s))
    }
}

impl FromStr for Signature {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SIGNATURE_HEX_LEN {
            return Err(KeyError::MalformedHex {
                expected: SIGNATURE_HEX_LEN,
                got: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidSignature)?;

        let mut r = [0u8; SCALAR_LEN];
        let mut sc = [0u8; SCALAR_LEN];
        r.copy_from_slice(&bytes[..SCALAR_LEN]);
        sc.copy_from_slice(&bytes[SCALAR_LEN..]);
        Ok(Self { r, s: sc })
    }
}
