// Money: fixed-point amount with two decimals

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::Add;

use crate::domain::error::{DomainError, Result};

/// Amount in minor units (1/100 of the currency unit)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Convert from a decimal amount, rounding half away from zero
    pub fn from_major(major: f64) -> Result<Self> {
        if !major.is_finite() {
            return Err(DomainError::ValidationError(format!(
                "Invalid amount: {}",
                major
            )));
        }
        let minor = (major * 100.0).round();
        if minor.abs() >= i64::MAX as f64 {
            return Err(DomainError::AmountOverflow);
        }
        Ok(Self(minor as i64))
    }

    /// Whole currency units (e.g. 200 -> 200.00)
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_mul(self, quantity: u32) -> Result<Self> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(DomainError::AmountOverflow)
    }

    pub fn checked_add(self, other: Money) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(DomainError::AmountOverflow)
    }
}

/// Saturates at the `i64` bounds; use `checked_add` where overflow must be reported
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        Money::from_major(major).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_to_cents() {
        assert_eq!(Money::from_major(499.99).unwrap().minor(), 49999);
        assert_eq!(Money::from_major(19.999).unwrap().minor(), 2000);
        assert_eq!(Money::from_major(-1.5).unwrap().minor(), -150);
    }

    #[test]
    fn test_from_major_rejects_nan() {
        assert!(Money::from_major(f64::NAN).is_err());
        assert!(Money::from_major(f64::INFINITY).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(20050).to_string(), "200.50");
        assert_eq!(Money::from_minor(7).to_string(), "0.07");
        assert_eq!(Money::from_minor(-125).to_string(), "-1.25");
    }

    #[test]
    fn test_checked_mul_overflow() {
        assert_eq!(
            Money::from_minor(250).checked_mul(4).unwrap(),
            Money::from_units(10)
        );
        assert!(Money::from_minor(i64::MAX).checked_mul(2).is_err());
    }

    #[test]
    fn test_add_and_sum_saturate() {
        let max = Money::from_minor(i64::MAX);
        let min = Money::from_minor(i64::MIN);
        assert_eq!(max + Money::from_minor(1), max);
        assert_eq!(min + Money::from_minor(-1), min);

        let total: Money = [
            Money::from_minor(i64::MAX - 5),
            Money::from_minor(10),
            Money::from_minor(1),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, max);
        assert!(max.checked_add(Money::from_minor(1)).is_err());
    }

    #[test]
    fn test_json_number() {
        let json = serde_json::to_string(&Money::from_minor(12345)).unwrap();
        assert_eq!(json, "123.45");

        let parsed: Money = serde_json::from_str("123.45").unwrap();
        assert_eq!(parsed, Money::from_minor(12345));
    }
}
