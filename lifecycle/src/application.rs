//! BNPL access applications.
//!
//! A participant asks one or more DAOs for BNPL access. Each DAO votes on its
//! own application; an approved application later carries the DAO's
//! pre-signed treasury operation that pays merchants for the participant's
//! purchases.

use crate::engine::{SettlementEngine, VoteDecision};
use crate::error::SettlementError;
use crate::records::{ApplicationStatus, BnplApplication};
use crate::repository::StageRecords;
use optimus_chain::{ChainError, ContractCall, LedgerClient};
use optimus_governance::Proposal;
use optimus_store::SettlementStore;
use optimus_types::{
    ApplicationId, DaoId, ParticipantId, SignedTransaction, SubjectRef, Timestamp, TokenAmount,
    WalletAddress,
};
use serde_json::json;
use tracing::{debug, info, warn};

/// On-chain resource type that marks `address` as a member of `dao`.
pub fn member_resource_type(dao_id: &DaoId) -> String {
    format!("{dao_id}::dao::MemberResource")
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    /// Apply for BNPL access to each of `dao_ids`.
    ///
    /// Every DAO must exist, be active and offer BNPL terms, and the applicant
    /// must not already be a member of any of them. A membership lookup that
    /// fails counts as "not a member". Applications already on file are
    /// returned as they are.
    pub async fn apply_for_bnpl_access(
        &self,
        applicant_id: &ParticipantId,
        applicant_address: &WalletAddress,
        dao_ids: &[DaoId],
        now: Timestamp,
    ) -> Result<Vec<BnplApplication>, SettlementError> {
        if dao_ids.is_empty() {
            return Err(SettlementError::validation(
                "bnpl application",
                applicant_id,
                "no DAOs selected",
            ));
        }

        let mut unconfigured = Vec::new();
        for dao_id in dao_ids {
            match self.repo.collective(dao_id) {
                Ok(c) if c.is_active() && c.bnpl_terms.is_some() => {}
                Ok(_) | Err(SettlementError::NotFound { .. }) => unconfigured.push(dao_id.to_string()),
                Err(e) => return Err(e),
            }
        }
        if !unconfigured.is_empty() {
            return Err(SettlementError::validation(
                "bnpl application",
                applicant_id,
                format!("invalid or unconfigured DAOs: {}", unconfigured.join(", ")),
            ));
        }

        let member_of = self.memberships(applicant_address, dao_ids).await;
        if !member_of.is_empty() {
            return Err(SettlementError::validation(
                "bnpl application",
                applicant_id,
                format!("applicant is a member of: {}", member_of.join(", ")),
            ));
        }

        let mut applications = Vec::with_capacity(dao_ids.len());
        let mut batch = self.repo.write_batch()?;
        for dao_id in dao_ids {
            let id = BnplApplication::id_for(applicant_id, dao_id);
            if let Some(existing) = self.repo.find_application(&id)? {
                debug!(application = %id, status = ?existing.status, "application already on file");
                applications.push(existing);
                continue;
            }
            let app = BnplApplication {
                id,
                dao_id: dao_id.clone(),
                applicant_id: applicant_id.clone(),
                applicant_address: applicant_address.clone(),
                status: ApplicationStatus::Requested,
                proposal_id: None,
                requested_at: now,
                decided_at: None,
                treasury_operation: None,
            };
            batch.stage_application(&app)?;
            applications.push(app);
        }
        batch.commit()?;
        info!(applicant = %applicant_id, count = applications.len(), "bnpl access requested");
        Ok(applications)
    }

    /// DAOs among `dao_ids` that `address` holds a member resource for.
    async fn memberships(&self, address: &WalletAddress, dao_ids: &[DaoId]) -> Vec<String> {
        let resources = match self.ledger.account_resources(address).await {
            Ok(r) => r,
            Err(e) => {
                warn!(address = %address, error = %e, "membership lookup failed, assuming no memberships");
                return Vec::new();
            }
        };
        dao_ids
            .iter()
            .filter(|dao| {
                let wanted = member_resource_type(dao);
                resources.iter().any(|r| r.starts_with(&wanted))
            })
            .map(|dao| dao.to_string())
            .collect()
    }

    pub fn application(&self, id: &ApplicationId) -> Result<BnplApplication, SettlementError> {
        self.repo.application(id)
    }

    /// `Requested → VotingOpen` with the BNPL voting window.
    pub fn open_application_voting(
        &self,
        id: &ApplicationId,
        now: Timestamp,
    ) -> Result<Proposal, SettlementError> {
        let mut app = self.repo.application(id)?;
        if app.status != ApplicationStatus::Requested {
            return Err(SettlementError::invalid_state(
                "application",
                id,
                app.status,
                "open voting on",
            ));
        }
        let subject = SubjectRef::Application(id.clone());
        let mut batch = self.repo.write_batch()?;
        let proposal = self.stage_proposal(
            batch.as_mut(),
            &app.dao_id,
            &subject,
            self.params.bnpl_voting_window_secs,
            now,
        )?;
        app.status = ApplicationStatus::VotingOpen;
        app.proposal_id = Some(proposal.id.clone());
        batch.stage_application(&app)?;
        batch.commit()?;
        Ok(proposal)
    }

    /// `VotingOpen → Approved | Rejected`.
    pub fn finalize_application(
        &self,
        id: &ApplicationId,
        now: Timestamp,
        force: bool,
    ) -> Result<VoteDecision, SettlementError> {
        let mut app = self.repo.application(id)?;
        let subject = SubjectRef::Application(id.clone());
        if app.status != ApplicationStatus::VotingOpen {
            if let Some(decision) = self.recorded_decision(&subject)? {
                return Ok(decision);
            }
            return Err(SettlementError::invalid_state(
                "application",
                id,
                app.status,
                "finalize",
            ));
        }

        let mut batch = self.repo.write_batch()?;
        let (proposal, tally) = self.stage_close(batch.as_mut(), &subject, now, force)?;
        app.status = if tally.approved {
            ApplicationStatus::Approved
        } else {
            ApplicationStatus::Rejected
        };
        app.decided_at = Some(now);
        batch.stage_application(&app)?;
        batch.commit()?;
        info!(application = %id, status = ?app.status, "bnpl application finalized");

        Ok(VoteDecision {
            subject,
            proposal_id: proposal.id,
            tally,
            risk: None,
            replayed: false,
        })
    }

    /// Collect the DAO's pre-signed treasury operation for an approved
    /// application, capped at `max_amount`. Already-collected operations are
    /// returned without asking the DAO again.
    pub async fn attach_treasury_operation(
        &self,
        id: &ApplicationId,
        max_amount: TokenAmount,
    ) -> Result<SignedTransaction, SettlementError> {
        let mut app = self.repo.application(id)?;
        if app.status != ApplicationStatus::Approved {
            return Err(SettlementError::invalid_state(
                "application",
                id,
                app.status,
                "attach a treasury operation to",
            ));
        }
        if let Some(op) = app.treasury_operation.clone() {
            return Ok(op);
        }

        let call = ContractCall::new(
            app.dao_id.contract_address(),
            "get_treasury_operation",
            vec![json!(app.applicant_address.as_str()), json!(max_amount.raw())],
        );
        let outcome = self.ledger.call(&call).await?;
        let encoded = outcome
            .value
            .get("treasury_operation")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ChainError::InvalidResponse(format!(
                    "DAO {} returned no treasury operation",
                    app.dao_id
                ))
            })?;
        let op = SignedTransaction::from_hex(encoded)
            .map_err(|e| ChainError::InvalidResponse(format!("treasury operation: {e}")))?;

        app.treasury_operation = Some(op.clone());
        self.repo.save_application(&app)?;
        info!(application = %id, dao = %app.dao_id, "treasury operation attached");
        Ok(op)
    }

    /// `* → Liquidated` for one application. Terminal applications cannot be
    /// liquidated.
    pub fn liquidate_application(&self, id: &ApplicationId) -> Result<BnplApplication, SettlementError> {
        let mut app = self.repo.application(id)?;
        if app.status == ApplicationStatus::Liquidated {
            return Ok(app);
        }
        if app.status.is_terminal() {
            return Err(SettlementError::invalid_state("application", id, app.status, "liquidate"));
        }
        app.status = ApplicationStatus::Liquidated;
        self.repo.save_application(&app)?;
        info!(application = %id, "application liquidated");
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_resource_type_is_namespaced_by_dao() {
        assert_eq!(
            member_resource_type(&DaoId::new("0xabc")),
            "0xabc::dao::MemberResource"
        );
    }
}
