//! The settlement engine and the pieces every lifecycle shares: collective
//! registration, ballots, voting decisions and soft risk updates.

use crate::error::SettlementError;
use crate::records::Collective;
use crate::repository::Repository;
use optimus_chain::LedgerClient;
use optimus_governance::{
    BallotReceipt, GovernanceEngine, Proposal, TallyResult, VoteChoice, WeightingModel,
};
use optimus_risk::{RiskEngine, RiskEvent, RiskPolicy};
use optimus_store::{codec, SettlementStore, WriteBatch};
use optimus_types::{DaoId, ParticipantId, ProposalId, SettlementParams, SubjectRef, Timestamp};
use optimus_utils::format_duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of a risk score update that must not fail its caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskUpdate {
    Applied { participant: ParticipantId, score: u32 },
    Failed { participant: ParticipantId, reason: String },
}

impl RiskUpdate {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Outcome of closing a vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDecision {
    pub subject: SubjectRef,
    pub proposal_id: ProposalId,
    pub tally: TallyResult,
    /// Set when the decision triggered a score change (loan rejection).
    pub risk: Option<RiskUpdate>,
    /// The vote had already been decided; nothing changed.
    pub replayed: bool,
}

/// Drives loans, BNPL applications, payments and liquidations through their
/// lifecycles against a repository and a ledger.
pub struct SettlementEngine<'a, S, L> {
    pub(crate) repo: Repository<'a, S>,
    pub(crate) ledger: &'a L,
    pub(crate) params: SettlementParams,
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    pub fn new(store: &'a S, ledger: &'a L, params: SettlementParams) -> Self {
        Self {
            repo: Repository::new(store),
            ledger,
            params,
        }
    }

    pub fn params(&self) -> &SettlementParams {
        &self.params
    }

    pub fn repository(&self) -> &Repository<'a, S> {
        &self.repo
    }

    pub(crate) fn governance(&self) -> GovernanceEngine<'a, S> {
        GovernanceEngine::new(self.repo.store())
    }

    pub fn risk(&self) -> RiskEngine<'a, S> {
        RiskEngine::new(self.repo.store(), RiskPolicy::from(&self.params))
    }

    /// Register (or update) a collective.
    pub fn register_collective(&self, collective: &Collective) -> Result<(), SettlementError> {
        self.repo.save_collective(collective)?;
        info!(dao = %collective.dao_id, treasury = %collective.treasury_address, "collective registered");
        Ok(())
    }

    pub(crate) fn active_collective(
        &self,
        dao_id: &DaoId,
        action: &'static str,
    ) -> Result<Collective, SettlementError> {
        let collective = self.repo.collective(dao_id)?;
        if !collective.is_active() {
            return Err(SettlementError::invalid_state(
                "collective",
                dao_id,
                collective.status,
                action,
            ));
        }
        Ok(collective)
    }

    /// Score an event without letting a scoring failure escape.
    pub(crate) fn score(
        &self,
        participant: &ParticipantId,
        event: RiskEvent,
        now: Timestamp,
    ) -> RiskUpdate {
        match self.risk().apply(participant, event, now) {
            Ok(profile) => RiskUpdate::Applied {
                participant: participant.clone(),
                score: profile.score,
            },
            Err(e) => {
                warn!(participant = %participant, ?event, error = %e, "risk update failed");
                RiskUpdate::Failed {
                    participant: participant.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    // ── Voting ──

    /// Stage a new proposal for `subject` into `batch`.
    pub(crate) fn stage_proposal(
        &self,
        batch: &mut (dyn WriteBatch + 'a),
        dao_id: &DaoId,
        subject: &SubjectRef,
        window_secs: u64,
        now: Timestamp,
    ) -> Result<Proposal, SettlementError> {
        let proposal = self
            .governance()
            .prepare_proposal(dao_id, subject, window_secs, now)?;
        batch.put_proposal(&proposal.id, &codec::encode(&proposal)?)?;
        batch.put_subject_proposal(subject, &proposal.id)?;
        info!(
            subject = %subject,
            proposal = %proposal.id,
            window = %format_duration(window_secs),
            "voting opened"
        );
        Ok(proposal)
    }

    /// Close the subject's proposal and stage the closed proposal.
    pub(crate) fn stage_close(
        &self,
        batch: &mut (dyn WriteBatch + 'a),
        subject: &SubjectRef,
        now: Timestamp,
        force: bool,
    ) -> Result<(Proposal, TallyResult), SettlementError> {
        let proposal = self.proposal_for(subject)?;
        let (closed, result) = self.governance().close(&proposal.id, now, force)?;
        batch.put_proposal(&closed.id, &codec::encode(&closed)?)?;
        Ok((closed, result))
    }

    pub fn proposal_for(&self, subject: &SubjectRef) -> Result<Proposal, SettlementError> {
        self.governance()
            .proposal_for(subject)?
            .ok_or_else(|| SettlementError::NotFound {
                entity: "proposal for",
                id: subject.to_string(),
            })
    }

    /// Decision already recorded on a closed proposal, for replays.
    pub(crate) fn recorded_decision(
        &self,
        subject: &SubjectRef,
    ) -> Result<Option<VoteDecision>, SettlementError> {
        let Some(proposal) = self.governance().proposal_for(subject)? else {
            return Ok(None);
        };
        Ok(proposal.result.map(|tally| VoteDecision {
            subject: subject.clone(),
            proposal_id: proposal.id,
            tally,
            risk: None,
            replayed: true,
        }))
    }

    /// Cast (or replace) a member's ballot on the subject's open proposal.
    pub fn cast_vote(
        &self,
        subject: &SubjectRef,
        voter: &ParticipantId,
        choice: VoteChoice,
        stake: u64,
        model: WeightingModel,
        now: Timestamp,
    ) -> Result<BallotReceipt, SettlementError> {
        let proposal = self.proposal_for(subject)?;
        Ok(self
            .governance()
            .cast_ballot(&proposal.id, voter, choice, stake, model, now)?)
    }

    /// Current tally of the subject's open proposal.
    pub fn tally(&self, subject: &SubjectRef, now: Timestamp) -> Result<TallyResult, SettlementError> {
        let proposal = self.proposal_for(subject)?;
        Ok(self.governance().tally_proposal(&proposal.id, now)?)
    }
}
