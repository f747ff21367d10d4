//! Governance engine: proposals and ballots over the repository.
//!
//! Opening and closing a proposal usually changes the subject's lifecycle
//! state too, so [`GovernanceEngine::prepare_proposal`] and
//! [`GovernanceEngine::close`] return the updated proposal for the caller to
//! commit in the same write batch as the subject.

use crate::ballot::{Ballot, BallotReceipt, VoteChoice, WeightingModel};
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalStatus};
use crate::tally::{tally, TallyResult};
use optimus_store::{codec, BallotStore, ProposalStore, StoreError};
use optimus_types::{DaoId, ParticipantId, ProposalId, SubjectRef, Timestamp};
use tracing::{debug, info};

pub struct GovernanceEngine<'a, S> {
    store: &'a S,
}

impl<'a, S> GovernanceEngine<'a, S>
where
    S: ProposalStore + BallotStore,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn proposal(&self, id: &ProposalId) -> Result<Proposal, GovernanceError> {
        let bytes = self.store.get_proposal(id).map_err(|e| match e {
            StoreError::NotFound(_) => GovernanceError::ProposalNotFound(id.to_string()),
            other => other.into(),
        })?;
        Ok(codec::decode(&bytes)?)
    }

    /// The proposal opened for `subject`, if any.
    pub fn proposal_for(&self, subject: &SubjectRef) -> Result<Option<Proposal>, GovernanceError> {
        match self.store.get_subject_proposal(subject)? {
            Some(id) => self.proposal(&id).map(Some),
            None => Ok(None),
        }
    }

    /// Build a new Active proposal for `subject`.
    ///
    /// Fails if the subject already has a proposal: `ActiveProposalExists` while
    /// it is still open, `ProposalClosed` once it has been decided.
    pub fn prepare_proposal(
        &self,
        dao_id: &DaoId,
        subject: &SubjectRef,
        window_secs: u64,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        if let Some(existing) = self.proposal_for(subject)? {
            return Err(match existing.status {
                ProposalStatus::Active => GovernanceError::ActiveProposalExists {
                    subject: subject.clone(),
                    proposal: existing.id.to_string(),
                },
                ProposalStatus::Closed => GovernanceError::ProposalClosed(existing.id.to_string()),
            });
        }
        Ok(Proposal::open(dao_id.clone(), subject.clone(), window_secs, now))
    }

    /// Record a ballot. A second ballot from the same voter replaces the first
    /// while the window is open.
    pub fn cast_ballot(
        &self,
        proposal_id: &ProposalId,
        voter: &ParticipantId,
        choice: VoteChoice,
        stake: u64,
        model: WeightingModel,
        now: Timestamp,
    ) -> Result<BallotReceipt, GovernanceError> {
        let proposal = self.proposal(proposal_id)?;
        if !proposal.is_active() {
            return Err(GovernanceError::ProposalClosed(proposal_id.to_string()));
        }
        if !proposal.accepts_ballots(now) {
            return Err(GovernanceError::VotingClosed(proposal_id.to_string()));
        }

        let receipt = if self.ballots(proposal_id)?.iter().any(|b| &b.voter == voter) {
            BallotReceipt::Replaced
        } else {
            BallotReceipt::Accepted
        };

        let ballot = Ballot {
            proposal_id: proposal_id.clone(),
            voter: voter.clone(),
            choice,
            weight: model.weight(stake),
        };
        self.store
            .put_ballot(proposal_id, voter, &codec::encode(&ballot)?)?;

        debug!(proposal = %proposal_id, voter = %voter, ?choice, weight = ballot.weight, ?receipt, "ballot recorded");
        Ok(receipt)
    }

    pub fn ballots(&self, proposal_id: &ProposalId) -> Result<Vec<Ballot>, GovernanceError> {
        let rows = self.store.get_ballots(proposal_id)?;
        let ballots: Vec<Ballot> = codec::decode_all(&rows)?;
        if let Some(stray) = ballots.iter().find(|b| &b.proposal_id != proposal_id) {
            return Err(GovernanceError::BallotMismatch {
                ballot: stray.proposal_id.to_string(),
                proposal: proposal_id.to_string(),
            });
        }
        Ok(ballots)
    }

    /// Tally an Active proposal without closing it.
    pub fn tally_proposal(
        &self,
        proposal_id: &ProposalId,
        now: Timestamp,
    ) -> Result<TallyResult, GovernanceError> {
        let proposal = self.proposal(proposal_id)?;
        if !proposal.is_active() {
            return Err(GovernanceError::ProposalClosed(proposal_id.to_string()));
        }
        let ballots = self.ballots(proposal_id)?;
        Ok(tally(&ballots, now, proposal.expires_at))
    }

    /// Tally and close. Requires the window to have elapsed unless `force`
    /// (explicit early close). The returned proposal is not yet persisted.
    pub fn close(
        &self,
        proposal_id: &ProposalId,
        now: Timestamp,
        force: bool,
    ) -> Result<(Proposal, TallyResult), GovernanceError> {
        let mut proposal = self.proposal(proposal_id)?;
        if !proposal.is_active() {
            return Err(GovernanceError::ProposalClosed(proposal_id.to_string()));
        }
        if !force && now < proposal.expires_at {
            return Err(GovernanceError::VotingStillOpen {
                proposal: proposal_id.to_string(),
                expires_at: proposal.expires_at,
            });
        }

        let ballots = self.ballots(proposal_id)?;
        let result = tally(&ballots, now, proposal.expires_at);
        proposal.status = ProposalStatus::Closed;
        proposal.result = Some(result);

        info!(
            proposal = %proposal_id,
            subject = %proposal.subject,
            yes = result.yes_weight,
            no = result.no_weight,
            approved = result.approved,
            "proposal closed"
        );
        Ok((proposal, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimus_nullables::NullStore;
    use optimus_types::LoanId;

    const DAY: u64 = 86_400;

    fn open(store: &NullStore, subject: &SubjectRef) -> Proposal {
        let engine = GovernanceEngine::new(store);
        let proposal = engine
            .prepare_proposal(&DaoId::new("0xdao"), subject, 7 * DAY, Timestamp::new(1_000))
            .unwrap();
        store
            .put_proposal(&proposal.id, &codec::encode(&proposal).unwrap())
            .unwrap();
        store.put_subject_proposal(subject, &proposal.id).unwrap();
        proposal
    }

    fn subject() -> SubjectRef {
        SubjectRef::Loan(LoanId::new("loan-1"))
    }

    #[test]
    fn second_proposal_for_subject_is_rejected() {
        let store = NullStore::new();
        open(&store, &subject());
        let engine = GovernanceEngine::new(&store);
        let err = engine
            .prepare_proposal(&DaoId::new("0xdao"), &subject(), DAY, Timestamp::new(2_000))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ActiveProposalExists { .. }));
        assert_eq!(err.kind(), optimus_types::ErrorKind::InvalidState);
    }

    #[test]
    fn revote_replaces_earlier_ballot() {
        let store = NullStore::new();
        let proposal = open(&store, &subject());
        let engine = GovernanceEngine::new(&store);
        let voter = ParticipantId::new("alice");
        let now = Timestamp::new(1_500);

        let first = engine
            .cast_ballot(&proposal.id, &voter, VoteChoice::No, 0, WeightingModel::OneMemberOneVote, now)
            .unwrap();
        let second = engine
            .cast_ballot(&proposal.id, &voter, VoteChoice::Yes, 0, WeightingModel::OneMemberOneVote, now)
            .unwrap();

        assert_eq!(first, BallotReceipt::Accepted);
        assert_eq!(second, BallotReceipt::Replaced);
        let result = engine.tally_proposal(&proposal.id, now).unwrap();
        assert_eq!(result.yes_weight, 1);
        assert_eq!(result.no_weight, 0);
        assert!(result.approved);
    }

    #[test]
    fn ballots_after_expiry_are_rejected() {
        let store = NullStore::new();
        let proposal = open(&store, &subject());
        let engine = GovernanceEngine::new(&store);
        let err = engine
            .cast_ballot(
                &proposal.id,
                &ParticipantId::new("bob"),
                VoteChoice::Yes,
                10,
                WeightingModel::Stake,
                proposal.expires_at,
            )
            .unwrap_err();
        assert!(matches!(err, GovernanceError::VotingClosed(_)));
    }

    #[test]
    fn close_requires_elapsed_window_unless_forced() {
        let store = NullStore::new();
        let proposal = open(&store, &subject());
        let engine = GovernanceEngine::new(&store);

        let early = Timestamp::new(2_000);
        assert!(matches!(
            engine.close(&proposal.id, early, false),
            Err(GovernanceError::VotingStillOpen { .. })
        ));

        let (closed, result) = engine.close(&proposal.id, early, true).unwrap();
        assert_eq!(closed.status, ProposalStatus::Closed);
        assert_eq!(closed.result, Some(result));
        assert!(!result.approved);
    }

    #[test]
    fn closed_proposal_cannot_be_tallied_again() {
        let store = NullStore::new();
        let proposal = open(&store, &subject());
        let engine = GovernanceEngine::new(&store);
        let (closed, _) = engine.close(&proposal.id, proposal.expires_at, false).unwrap();
        store
            .put_proposal(&closed.id, &codec::encode(&closed).unwrap())
            .unwrap();

        let err = engine.tally_proposal(&proposal.id, proposal.expires_at).unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalClosed(_)));
    }

    #[test]
    fn unknown_proposal_is_not_found() {
        let store = NullStore::new();
        let engine = GovernanceEngine::new(&store);
        let err = engine.proposal(&ProposalId::new("missing")).unwrap_err();
        assert_eq!(err.kind(), optimus_types::ErrorKind::NotFound);
    }
}
