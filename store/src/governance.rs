//! Governance storage traits.

use crate::StoreError;
use optimus_types::{ParticipantId, ProposalId, SubjectRef};

/// Proposals plus the subject → proposal index that enforces
/// "at most one proposal per subject".
pub trait ProposalStore {
    fn put_proposal(&self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError>;

    fn get_proposal(&self, id: &ProposalId) -> Result<Vec<u8>, StoreError>;

    /// The proposal most recently opened for `subject`, if any.
    fn get_subject_proposal(&self, subject: &SubjectRef)
        -> Result<Option<ProposalId>, StoreError>;

    fn put_subject_proposal(
        &self,
        subject: &SubjectRef,
        proposal: &ProposalId,
    ) -> Result<(), StoreError>;
}

/// One ballot per (proposal, voter); a put for an existing pair replaces it.
pub trait BallotStore {
    fn put_ballot(
        &self,
        proposal: &ProposalId,
        voter: &ParticipantId,
        data: &[u8],
    ) -> Result<(), StoreError>;

    /// All ballots for a proposal, ordered by voter id.
    fn get_ballots(&self, proposal: &ProposalId) -> Result<Vec<Vec<u8>>, StoreError>;
}
