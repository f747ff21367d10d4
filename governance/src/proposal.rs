//! Proposals and their lifecycle.

use crate::tally::TallyResult;
use optimus_types::{DaoId, ProposalId, SubjectRef, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Accepting ballots until `expires_at`.
    Active,
    /// Tallied. Ballots are frozen and `result` is set.
    Closed,
}

/// A quorum vote on one loan or BNPL-access application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub dao_id: DaoId,
    pub subject: SubjectRef,
    pub opened_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: ProposalStatus,
    /// Set exactly once, when the proposal is closed.
    pub result: Option<TallyResult>,
}

impl Proposal {
    pub fn open(dao_id: DaoId, subject: SubjectRef, window_secs: u64, now: Timestamp) -> Self {
        Self {
            id: ProposalId::for_subject(&subject),
            dao_id,
            subject,
            opened_at: now,
            expires_at: now.plus_secs(window_secs),
            status: ProposalStatus::Active,
            result: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    /// Whether ballots are still accepted at `now`.
    pub fn accepts_ballots(&self, now: Timestamp) -> bool {
        self.is_active() && now < self.expires_at
    }
}
