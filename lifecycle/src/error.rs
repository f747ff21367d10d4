use optimus_chain::ChainError;
use optimus_governance::GovernanceError;
use optimus_risk::RiskError;
use optimus_schedule::ScheduleError;
use optimus_store::StoreError;
use optimus_types::ErrorKind;
use thiserror::Error;

/// Failure of a settlement operation.
///
/// Every variant carries enough context (entity, id, current state) for the
/// orchestration layer to decide between retrying, compensating and paging a
/// human. Branch on [`SettlementError::kind`], not on the message.
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("cannot {action} {entity} {id} in state {state}")]
    InvalidState {
        entity: &'static str,
        id: String,
        state: String,
        action: &'static str,
    },

    #[error("invalid {entity} {id}: {reason}")]
    Validation {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SettlementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::Validation { .. } | Self::Config(_) => ErrorKind::ValidationFailure,
            Self::Governance(e) => e.kind(),
            Self::Schedule(e) => e.kind(),
            Self::Risk(e) => e.kind(),
            Self::Chain(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }

    pub(crate) fn invalid_state(
        entity: &'static str,
        id: impl ToString,
        state: impl std::fmt::Debug,
        action: &'static str,
    ) -> Self {
        Self::InvalidState {
            entity,
            id: id.to_string(),
            state: format!("{state:?}"),
            action,
        }
    }

    pub(crate) fn validation(entity: &'static str, id: impl ToString, reason: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LoanStatus;

    #[test]
    fn kinds_follow_the_source() {
        let e = SettlementError::invalid_state("loan", "l1", LoanStatus::Rejected, "disburse");
        assert_eq!(e.kind(), ErrorKind::InvalidState);
        assert_eq!(e.to_string(), "cannot disburse loan l1 in state Rejected");

        let e: SettlementError = ChainError::Unavailable("down".into()).into();
        assert_eq!(e.kind(), ErrorKind::ExternalFailure);
        assert!(e.kind().is_retryable());

        let e: SettlementError = StoreError::Backend("io".into()).into();
        assert_eq!(e.kind(), ErrorKind::Storage);
    }
}
