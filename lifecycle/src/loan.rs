//! Loan lifecycle.
//!
//! ```text
//! Requested → VotingOpen → Approved → Disbursed → Repaying → Completed
//!                        ↘ Rejected              ↘ Defaulted
//! any non-terminal state → Liquidated
//! ```
//!
//! Approval builds the repayment plan in the same batch as the status change,
//! so an approved loan always has a plan. Disbursement is two external steps
//! (on-chain approval, then the treasury transfer); each is recorded as soon as
//! it succeeds and skipped on retry.

use crate::engine::{RiskUpdate, SettlementEngine, VoteDecision};
use crate::error::SettlementError;
use crate::payout::DistributionReport;
use crate::records::{Loan, LoanRequest, LoanStatus};
use crate::repository::StageRecords;
use optimus_chain::{ContractCall, LedgerClient};
use optimus_distribution::WeightedShare;
use optimus_governance::Proposal;
use optimus_risk::RiskEvent;
use optimus_schedule::{build_plan, consecutive_late, Installment, LateFeePolicy, PaymentTerms};
use optimus_store::SettlementStore;
use optimus_types::{DistributionId, LoanId, SubjectRef, Timestamp, TokenAmount, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

/// Result of `disburse`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disbursement {
    pub loan_id: LoanId,
    pub tx_hash: TxHash,
    /// The loan was already disbursed; no transfer was made.
    pub replayed: bool,
}

/// Result of `record_repayment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub installment: Installment,
    pub loan_status: LoanStatus,
    pub risk: Option<RiskUpdate>,
    pub replayed: bool,
}

/// Result of `evaluate_repayments`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentReview {
    pub loan_id: LoanId,
    /// `(sequence, fee)` for installments that turned late in this run.
    pub newly_late: Vec<(u32, TokenAmount)>,
    pub consecutive_late: u32,
    pub loan_status: LoanStatus,
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    /// Store a new `Requested` loan. Re-requesting an existing id returns the
    /// stored loan unchanged.
    pub fn request_loan(&self, request: LoanRequest, now: Timestamp) -> Result<Loan, SettlementError> {
        match self.repo.loan(&request.id) {
            Ok(existing) => {
                debug!(loan = %existing.id, status = ?existing.status, "loan already requested");
                return Ok(existing);
            }
            Err(SettlementError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        if request.principal.is_zero() {
            return Err(SettlementError::validation("loan", &request.id, "principal must be positive"));
        }
        if request.term_secs == 0 {
            return Err(SettlementError::validation("loan", &request.id, "term must be positive"));
        }
        self.active_collective(&request.dao_id, "request a loan from")?;

        let loan = Loan {
            id: request.id,
            dao_id: request.dao_id,
            borrower_id: request.borrower_id,
            borrower_address: request.borrower_address,
            principal: request.principal,
            interest_rate_bps: request.interest_rate_bps,
            term_secs: request.term_secs,
            status: LoanStatus::Requested,
            proposal_id: None,
            requested_at: now,
            approval_tx: None,
            disbursement_tx: None,
            disbursed_at: None,
        };
        self.repo.save_loan(&loan)?;
        info!(loan = %loan.id, dao = %loan.dao_id, principal = loan.principal.raw(), "loan requested");
        Ok(loan)
    }

    pub fn loan(&self, id: &LoanId) -> Result<Loan, SettlementError> {
        self.repo.loan(id)
    }

    /// `Requested → VotingOpen`: open a proposal with the loan voting window.
    pub fn open_loan_voting(&self, id: &LoanId, now: Timestamp) -> Result<Proposal, SettlementError> {
        let mut loan = self.repo.loan(id)?;
        if loan.status != LoanStatus::Requested {
            return Err(SettlementError::invalid_state("loan", id, loan.status, "open voting on"));
        }
        let subject = SubjectRef::Loan(id.clone());
        let mut batch = self.repo.write_batch()?;
        let proposal = self.stage_proposal(
            batch.as_mut(),
            &loan.dao_id,
            &subject,
            self.params.loan_voting_window_secs,
            now,
        )?;
        loan.status = LoanStatus::VotingOpen;
        loan.proposal_id = Some(proposal.id.clone());
        batch.stage_loan(&loan)?;
        batch.commit()?;
        Ok(proposal)
    }

    /// `VotingOpen → Approved | Rejected`.
    ///
    /// Requires the voting window to have elapsed unless `force`. Approval
    /// stores the repayment plan atomically with the new status; rejection
    /// applies the configured risk penalty to the borrower.
    pub fn close_loan_voting(
        &self,
        id: &LoanId,
        now: Timestamp,
        force: bool,
    ) -> Result<VoteDecision, SettlementError> {
        let mut loan = self.repo.loan(id)?;
        let subject = SubjectRef::Loan(id.clone());
        if loan.status != LoanStatus::VotingOpen {
            if let Some(decision) = self.recorded_decision(&subject)? {
                debug!(loan = %id, status = ?loan.status, "vote already decided");
                return Ok(decision);
            }
            return Err(SettlementError::invalid_state("loan", id, loan.status, "close voting on"));
        }

        let mut batch = self.repo.write_batch()?;
        let (proposal, tally) = self.stage_close(batch.as_mut(), &subject, now, force)?;

        if tally.approved {
            let plan = build_plan(&subject, loan.principal, self.loan_terms(&loan), self.repayment_origin(&loan, now))?;
            loan.status = LoanStatus::Approved;
            batch.stage_loan(&loan)?;
            batch.stage_installments(&plan)?;
            batch.commit()?;
            info!(loan = %id, installments = plan.len(), "loan approved, repayment plan stored");
            return Ok(VoteDecision {
                subject,
                proposal_id: proposal.id,
                tally,
                risk: None,
                replayed: false,
            });
        }

        loan.status = LoanStatus::Rejected;
        batch.stage_loan(&loan)?;
        batch.commit()?;
        info!(loan = %id, "loan rejected");
        let risk = self.score(&loan.borrower_id, RiskEvent::LoanRejected, now);
        Ok(VoteDecision {
            subject,
            proposal_id: proposal.id,
            tally,
            risk: Some(risk),
            replayed: false,
        })
    }

    fn loan_terms(&self, loan: &Loan) -> PaymentTerms {
        PaymentTerms::new(loan.term_secs, self.params.loan_installments)
    }

    /// Loan repayments start one installment interval after approval.
    fn repayment_origin(&self, loan: &Loan, approved_at: Timestamp) -> Timestamp {
        approved_at.plus_secs(self.loan_terms(loan).spacing_secs())
    }

    /// `Approved → Disbursed`.
    ///
    /// A loan with a recorded transfer returns it without touching the
    /// ledger, whatever state the loan has moved on to since.
    pub async fn disburse(&self, id: &LoanId, now: Timestamp) -> Result<Disbursement, SettlementError> {
        let mut loan = self.repo.loan(id)?;
        if let Some(tx_hash) = loan.disbursement_tx.clone() {
            info!(loan = %id, tx = %tx_hash, state = ?loan.status, "loan already disbursed, skipping transfer");
            return Ok(Disbursement {
                loan_id: id.clone(),
                tx_hash,
                replayed: true,
            });
        }
        if loan.status != LoanStatus::Approved {
            return Err(SettlementError::invalid_state("loan", id, loan.status, "disburse"));
        }
        let collective = self.active_collective(&loan.dao_id, "disburse from")?;

        if loan.approval_tx.is_none() {
            let call = ContractCall::new(
                loan.dao_id.contract_address(),
                "approve_loan",
                vec![json!(loan.borrower_address.as_str()), json!(loan.principal.raw())],
            );
            let tx = self.ledger.call(&call).await?.require_tx_hash(&call)?;
            info!(loan = %id, tx = %tx, "loan approved on-chain");
            loan.approval_tx = Some(tx);
            self.repo.save_loan(&loan)?;
        }

        let tx_hash = self
            .ledger
            .transfer(&collective.treasury_address, &loan.borrower_address, loan.principal)
            .await?;
        loan.status = LoanStatus::Disbursed;
        loan.disbursement_tx = Some(tx_hash.clone());
        loan.disbursed_at = Some(now);
        self.repo.save_loan(&loan)?;
        info!(
            loan = %id,
            borrower = %loan.borrower_address,
            amount = loan.principal.raw(),
            tx = %tx_hash,
            "loan disbursed"
        );
        Ok(Disbursement {
            loan_id: id.clone(),
            tx_hash,
            replayed: false,
        })
    }

    /// Record a confirmed repayment of one installment.
    ///
    /// Moves `Disbursed → Repaying`, and `Repaying → Completed` once every
    /// installment is paid. Replaying the same payment is a no-op.
    pub fn record_repayment(
        &self,
        id: &LoanId,
        sequence: u32,
        tx_hash: TxHash,
        now: Timestamp,
    ) -> Result<RepaymentOutcome, SettlementError> {
        let mut loan = self.repo.loan(id)?;
        let subject = SubjectRef::Loan(id.clone());
        let mut plan = self.repo.installments(&subject)?;
        let Some(idx) = plan.iter().position(|i| i.sequence == sequence) else {
            return Err(SettlementError::NotFound {
                entity: "installment",
                id: format!("{subject}#{sequence}"),
            });
        };

        if plan[idx].is_paid() {
            if plan[idx].payment_tx.as_ref() == Some(&tx_hash) {
                return Ok(RepaymentOutcome {
                    installment: plan[idx].clone(),
                    loan_status: loan.status,
                    risk: None,
                    replayed: true,
                });
            }
            return Err(SettlementError::invalid_state(
                "installment",
                format!("{subject}#{sequence}"),
                plan[idx].status,
                "record repayment for",
            ));
        }
        if !loan.status.is_disbursed() {
            return Err(SettlementError::invalid_state("loan", id, loan.status, "record repayment for"));
        }

        let was_late = plan[idx].mark_paid(tx_hash, now)?;
        loan.status = if plan.iter().all(Installment::is_paid) {
            LoanStatus::Completed
        } else {
            LoanStatus::Repaying
        };

        let mut batch = self.repo.write_batch()?;
        batch.stage_installments(&plan[idx..=idx])?;
        batch.stage_loan(&loan)?;
        batch.commit()?;
        info!(loan = %id, sequence, was_late, status = ?loan.status, "repayment recorded");

        let risk = self.score(&loan.borrower_id, RiskEvent::PaymentParticipation, now);
        Ok(RepaymentOutcome {
            installment: plan.swap_remove(idx),
            loan_status: loan.status,
            risk: Some(risk),
            replayed: false,
        })
    }

    /// Assess late fees on the loan's plan and default it once the run of
    /// consecutive late installments reaches the configured threshold.
    pub fn evaluate_repayments(&self, id: &LoanId, now: Timestamp) -> Result<RepaymentReview, SettlementError> {
        let mut loan = self.repo.loan(id)?;
        let subject = SubjectRef::Loan(id.clone());
        let mut plan = self.repo.installments(&subject)?;

        if loan.status == LoanStatus::Defaulted {
            return Ok(RepaymentReview {
                loan_id: id.clone(),
                newly_late: Vec::new(),
                consecutive_late: consecutive_late(&plan),
                loan_status: loan.status,
            });
        }
        if !loan.status.is_disbursed() {
            return Err(SettlementError::invalid_state("loan", id, loan.status, "evaluate repayments on"));
        }

        let policy = LateFeePolicy::new(self.params.late_fee_bps);
        let mut newly_late = Vec::new();
        let mut changed = Vec::new();
        for inst in plan.iter_mut() {
            if let Some(fee) = policy.assess(inst, now) {
                newly_late.push((inst.sequence, fee));
                changed.push(inst.clone());
            }
        }

        let run = consecutive_late(&plan);
        let threshold = self.params.default_after_consecutive_late;
        let defaulted = threshold > 0 && run >= threshold;
        if defaulted {
            loan.status = LoanStatus::Defaulted;
        }

        if !changed.is_empty() || defaulted {
            let mut batch = self.repo.write_batch()?;
            batch.stage_installments(&changed)?;
            batch.stage_loan(&loan)?;
            batch.commit()?;
        }
        if defaulted {
            warn!(loan = %id, consecutive_late = run, threshold, "loan defaulted");
        }

        Ok(RepaymentReview {
            loan_id: id.clone(),
            newly_late,
            consecutive_late: run,
            loan_status: loan.status,
        })
    }

    /// Pay a completed loan's interest to members by investment.
    ///
    /// Zero interest is a no-op. Nonzero interest with no investment to
    /// weight it by is a validation failure.
    pub async fn distribute_interest(
        &self,
        id: &LoanId,
        investments: &[WeightedShare],
        now: Timestamp,
    ) -> Result<DistributionReport, SettlementError> {
        let loan = self.repo.loan(id)?;
        if loan.status != LoanStatus::Completed {
            return Err(SettlementError::invalid_state("loan", id, loan.status, "distribute interest for"));
        }
        let distribution_id = DistributionId::new(format!("interest_{id}"));
        let interest = loan.interest();
        if interest.is_zero() {
            info!(loan = %id, "no interest to distribute");
            return Ok(DistributionReport::empty(distribution_id, interest));
        }
        if investments.iter().all(|s| s.weight == 0) {
            return Err(SettlementError::validation(
                "loan",
                id,
                "total investment is zero, cannot distribute interest",
            ));
        }
        let collective = self.repo.collective(&loan.dao_id)?;
        self.execute_distribution(&distribution_id, &collective.treasury_address, interest, investments, now)
            .await
    }

    /// `* → Liquidated` for one loan. Terminal loans cannot be liquidated.
    pub fn liquidate_loan(&self, id: &LoanId) -> Result<Loan, SettlementError> {
        let mut loan = self.repo.loan(id)?;
        if loan.status == LoanStatus::Liquidated {
            return Ok(loan);
        }
        if loan.status.is_terminal() {
            return Err(SettlementError::invalid_state("loan", id, loan.status, "liquidate"));
        }
        let from = loan.status;
        loan.status = LoanStatus::Liquidated;
        self.repo.save_loan(&loan)?;
        info!(loan = %id, from = ?from, "loan liquidated");
        Ok(loan)
    }
}
