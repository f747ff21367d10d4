//! Ledger transaction identifiers and signed transaction payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash returned by the ledger for a submitted transaction (`0x`-prefixed hex).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A BCS-serialised transaction signed by its sender outside this system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction(Vec<u8>);

impl SignedTransaction {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode the hex form wallets hand over, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(body).map(Self)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_prefix_is_optional() {
        let a = SignedTransaction::from_hex("0xdeadbeef").unwrap();
        let b = SignedTransaction::from_hex("deadbeef").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), "0xdeadbeef");
    }

    #[test]
    fn rejects_non_hex() {
        assert!(SignedTransaction::from_hex("0xplaceholder").is_err());
    }
}
