//! Error taxonomy shared across crates.
//!
//! Each crate has its own `thiserror` enum; every one of them classifies itself
//! into an [`ErrorKind`] so the orchestration layer can decide between retry,
//! compensation and escalation without matching on messages.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The referenced entity does not exist.
    NotFound,
    /// The operation is illegal in the entity's current lifecycle state.
    InvalidState,
    /// Malformed or inconsistent input.
    ValidationFailure,
    /// A ledger, oracle or validator call failed.
    ExternalFailure,
    /// The repository itself failed (backend, corruption, encoding).
    Storage,
}

impl ErrorKind {
    /// Whether re-invoking the same step can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalFailure | Self::Storage)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::InvalidState => "invalid_state",
            Self::ValidationFailure => "validation_failure",
            Self::ExternalFailure => "external_failure",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}
