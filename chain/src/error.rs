use optimus_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("ledger endpoint unreachable: {0}")]
    Unavailable(String),

    #[error("transaction rejected by the ledger: {0}")]
    Rejected(String),

    #[error("contract call {function} on {contract} failed: {reason}")]
    CallFailed {
        contract: String,
        function: String,
        reason: String,
    },

    #[error("invalid response from collaborator: {0}")]
    InvalidResponse(String),

    #[error("price oracle error: {0}")]
    Oracle(String),

    #[error("transaction validator error: {0}")]
    Validator(String),
}

impl ChainError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalFailure
    }
}
