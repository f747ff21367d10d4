//! Winding up a collective.

use crate::engine::SettlementEngine;
use crate::error::SettlementError;
use crate::payout::DistributionReport;
use crate::records::{ApplicationStatus, CollectiveStatus, LoanStatus};
use crate::repository::StageRecords;
use optimus_chain::{ContractCall, LedgerClient};
use optimus_distribution::WeightedShare;
use optimus_store::SettlementStore;
use optimus_types::{ApplicationId, DaoId, DistributionId, LoanId, Timestamp, TokenAmount, TxHash};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationReport {
    pub dao_id: DaoId,
    pub loans_liquidated: Vec<LoanId>,
    pub applications_liquidated: Vec<ApplicationId>,
    pub distribution: DistributionReport,
    /// `None` while payouts are still outstanding.
    pub dissolve_tx: Option<TxHash>,
}

pub fn liquidation_distribution_id(dao_id: &DaoId) -> DistributionId {
    DistributionId::new(format!("liquidation_{dao_id}"))
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    /// Liquidate every open loan and application of a DAO, pay its remaining
    /// treasury out to members by investment and dissolve it on-chain.
    ///
    /// Only a fully paid distribution lets the DAO reach `Dissolved`. After a
    /// partial run the report has no dissolve transaction and the call can be
    /// repeated; it pays only the members still missing.
    pub async fn liquidate_collective(
        &self,
        dao_id: &DaoId,
        investments: &[WeightedShare],
        now: Timestamp,
    ) -> Result<LiquidationReport, SettlementError> {
        let mut collective = self.active_collective(dao_id, "liquidate")?;
        let distribution_id = liquidation_distribution_id(dao_id);

        // Balance already paid out by an earlier partial run is not on the
        // treasury any more, so the pool is reconstructed from the receipts.
        let balance = self.ledger.balance_of(&collective.treasury_address).await?;
        let already_paid: Vec<_> = investments
            .iter()
            .filter_map(|s| self.repo.payout(&distribution_id, &s.party).transpose())
            .collect::<Result<_, _>>()?;
        let pool = balance + already_paid.iter().map(|r| r.amount).sum::<TokenAmount>();
        let total_weight: u128 = investments.iter().map(|s| u128::from(s.weight)).sum();
        if !pool.is_zero() && total_weight == 0 {
            return Err(SettlementError::validation(
                "collective",
                dao_id,
                "treasury holds funds but no member has an investment",
            ));
        }

        let mut loans_liquidated = Vec::new();
        let mut applications_liquidated = Vec::new();
        let mut batch = self.repo.write_batch()?;
        for mut loan in self.repo.loans_of(dao_id)? {
            if loan.status.is_terminal() {
                continue;
            }
            loan.status = LoanStatus::Liquidated;
            batch.stage_loan(&loan)?;
            loans_liquidated.push(loan.id);
        }
        for mut app in self.repo.applications_of(dao_id)? {
            if app.status.is_terminal() {
                continue;
            }
            app.status = ApplicationStatus::Liquidated;
            batch.stage_application(&app)?;
            applications_liquidated.push(app.id);
        }
        batch.commit()?;
        info!(
            dao = %dao_id,
            loans = loans_liquidated.len(),
            applications = applications_liquidated.len(),
            "open obligations liquidated"
        );

        let distribution = self
            .execute_distribution(&distribution_id, &collective.treasury_address, pool, investments, now)
            .await?;
        if !distribution.is_complete() {
            warn!(
                dao = %dao_id,
                failed = distribution.failed.len(),
                "liquidation payout incomplete, collective left active"
            );
            return Ok(LiquidationReport {
                dao_id: dao_id.clone(),
                loans_liquidated,
                applications_liquidated,
                distribution,
                dissolve_tx: None,
            });
        }

        let dissolve_tx = match collective.dissolve_tx.clone() {
            Some(tx) => tx,
            None => {
                let call = ContractCall::new(dao_id.contract_address(), "dissolve_dao", Vec::new());
                let tx = self.ledger.call(&call).await?.require_tx_hash(&call)?;
                collective.dissolve_tx = Some(tx.clone());
                self.repo.save_collective(&collective)?;
                tx
            }
        };
        collective.status = CollectiveStatus::Dissolved;
        self.repo.save_collective(&collective)?;
        info!(dao = %dao_id, tx = %dissolve_tx, paid = distribution.total_paid().raw(), "collective dissolved");

        Ok(LiquidationReport {
            dao_id: dao_id.clone(),
            loans_liquidated,
            applications_liquidated,
            distribution,
            dissolve_tx: Some(dissolve_tx),
        })
    }
}
