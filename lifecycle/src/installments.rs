//! Plan-wide installment jobs: late fees, fee redistribution, reminders.

use crate::engine::SettlementEngine;
use crate::error::SettlementError;
use crate::payout::DistributionReport;
use optimus_chain::{ContractCall, LedgerClient, MemberWeight};
use optimus_distribution::WeightedShare;
use optimus_schedule::{is_reminder_due, LateFeePolicy, Reminder};
use optimus_store::SettlementStore;
use optimus_types::{DaoId, DistributionId, SubjectRef, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateFeeAssessment {
    pub parent: SubjectRef,
    /// `(sequence, fee)` for installments that turned late in this run.
    pub newly_late: Vec<(u32, TokenAmount)>,
    pub total_new_fees: TokenAmount,
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    /// Mark overdue installments of one plan `Late` and fix their fees.
    /// Installments that are already late keep the fee they were given.
    pub fn assess_late_fees(
        &self,
        parent: &SubjectRef,
        now: Timestamp,
    ) -> Result<LateFeeAssessment, SettlementError> {
        let policy = LateFeePolicy::new(self.params.late_fee_bps);
        let mut plan = self.repo.installments(parent)?;
        let mut newly_late = Vec::new();
        for inst in plan.iter_mut() {
            if let Some(fee) = policy.assess(inst, now) {
                self.repo.save_installment(inst)?;
                newly_late.push((inst.sequence, fee));
            }
        }
        let total_new_fees = newly_late.iter().map(|(_, fee)| *fee).sum();
        Ok(LateFeeAssessment {
            parent: parent.clone(),
            newly_late,
            total_new_fees,
        })
    }

    /// Pay a pool of collected late fees to the DAO's members, weighted by
    /// their on-chain voting power. Members without voting power get nothing;
    /// a DAO without any voting power is a no-op.
    pub async fn distribute_late_fees(
        &self,
        dao_id: &DaoId,
        fee_pool: TokenAmount,
        distribution_id: &DistributionId,
        now: Timestamp,
    ) -> Result<DistributionReport, SettlementError> {
        if fee_pool.is_zero() {
            return Ok(DistributionReport::empty(distribution_id.clone(), fee_pool));
        }
        let collective = self.repo.collective(dao_id)?;
        let call = ContractCall::new(dao_id.contract_address(), "get_members", Vec::new());
        let outcome = self.ledger.call(&call).await?;
        let shares: Vec<WeightedShare> = MemberWeight::parse_members(&outcome.value)?
            .into_iter()
            .filter(|m| m.voting_power > 0)
            .map(|m| WeightedShare::new(m.address, m.voting_power))
            .collect();

        if shares.is_empty() {
            warn!(dao = %dao_id, fees = fee_pool.raw(), "no member voting power, late fees not distributed");
            return Ok(DistributionReport::empty(distribution_id.clone(), fee_pool));
        }
        self.execute_distribution(distribution_id, &collective.treasury_address, fee_pool, &shares, now)
            .await
    }

    /// Pending installments, across every plan, due within the reminder window.
    pub fn reminders_due(&self, now: Timestamp) -> Result<Vec<Reminder>, SettlementError> {
        let window = self.params.reminder_window_secs;
        let mut reminders = Vec::new();
        for parent in self.repo.installment_parents()? {
            reminders.extend(
                self.repo
                    .installments(&parent)?
                    .iter()
                    .filter(|i| is_reminder_due(i, now, window))
                    .map(Reminder::from),
            );
        }
        info!(count = reminders.len(), "installment reminders due");
        Ok(reminders)
    }
}
