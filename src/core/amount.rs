//! Fixed-precision ledger amounts
//!
//! Values are held as signed integer base units (8 decimal places) so that
//! balance replay is exact. On the wire they are plain JSON numbers in coins.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places carried by an amount
pub const DECIMALS: u32 = 8;

/// Base units in one coin
pub const UNITS_PER_COIN: i64 = 10i64.pow(DECIMALS);

/// Largest magnitude in base units that survives the JSON number encoding
/// exactly (2^53, about 90 million coins). Larger values would round in the
/// hashed transaction form, so two distinct amounts could hash alike.
pub const MAX_EXACT_UNITS: i64 = 1 << 53;

/// Error parsing an amount from text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid amount: {0}")]
pub struct ParseAmountError(pub String);

/// A signed fixed-precision amount of coins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from raw base units
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Create an amount from whole coins
    pub const fn from_coins(coins: i64) -> Self {
        Self(coins.saturating_mul(UNITS_PER_COIN))
    }

    /// Convert a floating point coin value, rounding to the nearest base unit.
    /// Returns `None` for NaN, infinities and values out of range.
    pub fn from_coins_f64(coins: f64) -> Option<Self> {
        if !coins.is_finite() {
            return None;
        }
        let units = (coins * UNITS_PER_COIN as f64).round();
        if units.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(units as i64))
    }

    /// Raw base units
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Value in coins as a float, for display and the wire format
    pub fn as_coins_f64(self) -> f64 {
        self.0 as f64 / UNITS_PER_COIN as f64
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the value round-trips through its JSON form without loss
    pub const fn is_exact(self) -> bool {
        self.0 >= -MAX_EXACT_UNITS && self.0 <= MAX_EXACT_UNITS
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        *self = *self - rhs;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(self.0.saturating_neg())
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / UNITS_PER_COIN as u64;
        let frac = abs % UNITS_PER_COIN as u64;
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:0width$}", frac, width = DECIMALS as usize);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coins: f64 = s
            .trim()
            .parse()
            .map_err(|_| ParseAmountError(s.to_string()))?;
        Amount::from_coins_f64(coins).ok_or_else(|| ParseAmountError(s.to_string()))
    }
}

/// Amounts are written as JSON numbers of coins. Only magnitudes up to
/// [`MAX_EXACT_UNITS`] base units are exact; the ledger refuses larger
/// transfers at admission.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_coins_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coins = f64::deserialize(deserializer)?;
        Amount::from_coins_f64(coins)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {}", coins)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_coins(3000).to_string(), "3000");
        assert_eq!(Amount::from_units(10_000_000).to_string(), "0.1");
        assert_eq!(Amount::from_units(-150_000_000).to_string(), "-1.5");
        assert_eq!(Amount::from_units(1).to_string(), "0.00000001");
    }

    #[test]
    fn test_fractional_sums_are_exact() {
        let tenth = Amount::from_coins_f64(0.1).unwrap();
        let total: Amount = std::iter::repeat(tenth).take(10).sum();
        assert_eq!(total, Amount::from_coins(1));
    }

    #[test]
    fn test_parse() {
        assert_eq!("2.5".parse::<Amount>().unwrap(), Amount::from_units(250_000_000));
        assert!("abc".parse::<Amount>().is_err());
        assert!("inf".parse::<Amount>().is_err());
    }

    #[test]
    fn test_json_is_a_number() {
        let json = serde_json::to_string(&Amount::from_coins(1000)).unwrap();
        assert_eq!(json, "1000.0");
        let back: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(back, Amount::from_units(10_000_000));
    }

    #[test]
    fn test_exactness_bound() {
        assert!(Amount::from_units(MAX_EXACT_UNITS).is_exact());
        assert!(Amount::from_units(-MAX_EXACT_UNITS).is_exact());
        assert!(!Amount::from_units(MAX_EXACT_UNITS + 1).is_exact());
        assert!(!Amount::from_coins(100_000_000).is_exact());
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::from_coins(3);
        let b = Amount::from_coins(5);
        assert_eq!(a - b, -Amount::from_coins(2));
        assert!((a - b).is_negative());
        let mut c = a;
        c += b;
        c -= a;
        assert_eq!(c, b);
    }
}
