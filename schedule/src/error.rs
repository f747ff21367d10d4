use optimus_types::{ErrorKind, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("installment count must be at least 1")]
    NoInstallments,

    #[error("installment count {requested} exceeds the maximum of {max}")]
    TooManyInstallments { requested: u32, max: u32 },

    #[error("payment period must be positive")]
    EmptyPeriod,

    #[error("installments sum to {actual}, expected principal {expected}")]
    SumMismatch {
        expected: TokenAmount,
        actual: TokenAmount,
    },

    #[error("installment {sequence} is already paid")]
    AlreadyPaid { sequence: u32 },
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyPaid { .. } => ErrorKind::InvalidState,
            _ => ErrorKind::ValidationFailure,
        }
    }
}
