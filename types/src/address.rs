//! On-chain wallet address (`0x`-prefixed hex account address).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Move-style account address, always prefixed with `0x`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub const PREFIX: &'static str = "0x";

    /// Create an address from a raw string. The value is lower-cased so that
    /// `0xABC` and `0xabc` compare equal.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address is `0x` followed by at least one hex digit.
    pub fn is_valid(&self) -> bool {
        match self.0.strip_prefix(Self::PREFIX) {
            Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit()),
            None => false,
        }
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_compare_case_insensitively() {
        assert_eq!(WalletAddress::new("0xABCdef"), WalletAddress::new("0xabcDEF"));
    }

    #[test]
    fn validity_requires_prefix_and_hex_body() {
        assert!(WalletAddress::new("0x1").is_valid());
        assert!(!WalletAddress::new("0x").is_valid());
        assert!(!WalletAddress::new("abc").is_valid());
        assert!(!WalletAddress::new("0xzz").is_valid());
    }
}
