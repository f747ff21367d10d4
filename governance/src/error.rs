use optimus_store::StoreError;
use optimus_types::{ErrorKind, SubjectRef, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(String),

    #[error("subject {subject} already has active proposal {proposal}")]
    ActiveProposalExists { subject: SubjectRef, proposal: String },

    #[error("proposal {0} is closed")]
    ProposalClosed(String),

    #[error("voting window for proposal {0} has elapsed")]
    VotingClosed(String),

    #[error("voting window for proposal {proposal} is open until {expires_at}")]
    VotingStillOpen {
        proposal: String,
        expires_at: Timestamp,
    },

    #[error("ballot proposal {ballot} does not match {proposal}")]
    BallotMismatch { ballot: String, proposal: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProposalNotFound(_) => ErrorKind::NotFound,
            Self::ActiveProposalExists { .. }
            | Self::ProposalClosed(_)
            | Self::VotingClosed(_)
            | Self::VotingStillOpen { .. } => ErrorKind::InvalidState,
            Self::BallotMismatch { .. } => ErrorKind::ValidationFailure,
            Self::Store(e) => e.kind(),
        }
    }
}
