use optimus_store::StoreError;
use optimus_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("risk profile for {0} not found")]
    ProfileNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RiskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProfileNotFound(_) => ErrorKind::NotFound,
            Self::Store(e) => e.kind(),
        }
    }
}
