//! Token amounts.
//!
//! Amounts are integer base units (octas for MOVE) so that every split and
//! proportional share is exact integer arithmetic with explicit truncation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A quantity of the settlement token in base units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenAmount(u64);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `floor(self * bps / 10_000)`, computed in 128-bit so it cannot overflow.
    pub fn mul_bps(self, bps: u32) -> Self {
        Self((self.0 as u128 * bps as u128 / 10_000) as u64)
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for TokenAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a TokenAmount> for TokenAmount {
    fn sum<I: Iterator<Item = &'a TokenAmount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<u64> for TokenAmount {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_percent_fee_truncates() {
        assert_eq!(TokenAmount::new(33).mul_bps(500), TokenAmount::new(1));
        assert_eq!(TokenAmount::new(19).mul_bps(500), TokenAmount::ZERO);
        assert_eq!(TokenAmount::new(u64::MAX).mul_bps(10_000), TokenAmount::new(u64::MAX));
    }

    #[test]
    fn sums_over_references() {
        let amounts = [TokenAmount::new(34), TokenAmount::new(33), TokenAmount::new(33)];
        let total: TokenAmount = amounts.iter().sum();
        assert_eq!(total, TokenAmount::new(100));
    }
}
