//! Executing a distribution: one ledger transfer per party.
//!
//! Transfers are not transactional with each other. A failed transfer is
//! recorded and the run moves on to the next party; every successful one
//! leaves a receipt under `(distribution, party)` so a re-run pays only the
//! parties still missing.

use crate::engine::SettlementEngine;
use crate::error::SettlementError;
use crate::records::PayoutReceipt;
use optimus_chain::LedgerClient;
use optimus_distribution::{distribute, validate_sum, SumCheck, WeightedShare};
use optimus_store::SettlementStore;
use optimus_types::{DistributionId, Timestamp, TokenAmount, WalletAddress};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPayout {
    pub party: WalletAddress,
    pub amount: TokenAmount,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub distribution_id: DistributionId,
    pub total: TokenAmount,
    /// Paid by this run.
    pub paid: Vec<PayoutReceipt>,
    /// Paid by an earlier run of the same distribution.
    pub already_paid: Vec<PayoutReceipt>,
    pub failed: Vec<FailedPayout>,
    pub sum_check: SumCheck,
}

impl DistributionReport {
    pub fn empty(distribution_id: DistributionId, total: TokenAmount) -> Self {
        Self {
            distribution_id,
            total,
            paid: Vec::new(),
            already_paid: Vec::new(),
            failed: Vec::new(),
            sum_check: validate_sum(&[], TokenAmount::ZERO, 0),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_paid(&self) -> TokenAmount {
        self.paid
            .iter()
            .chain(&self.already_paid)
            .map(|r| r.amount)
            .sum()
    }
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    /// Split `total` across `shares` and transfer each payout from `source`.
    ///
    /// Storage failures abort the run; transfer failures do not.
    pub async fn execute_distribution(
        &self,
        distribution_id: &DistributionId,
        source: &WalletAddress,
        total: TokenAmount,
        shares: &[WeightedShare],
        now: Timestamp,
    ) -> Result<DistributionReport, SettlementError> {
        let payouts = distribute(total, shares);
        let parties = shares.iter().filter(|s| s.weight > 0).count();
        let sum_check = validate_sum(&payouts, total, parties);
        if !sum_check.within_tolerance {
            warn!(
                distribution = %distribution_id,
                total = total.raw(),
                distributed = sum_check.distributed.raw(),
                "distribution outside truncation tolerance, continuing"
            );
        }

        let mut report = DistributionReport {
            sum_check,
            ..DistributionReport::empty(distribution_id.clone(), total)
        };

        for payout in payouts {
            if let Some(receipt) = self.repo.payout(distribution_id, &payout.party)? {
                report.already_paid.push(receipt);
                continue;
            }
            match self
                .ledger
                .transfer(source, &payout.party, payout.amount)
                .await
            {
                Ok(tx_hash) => {
                    let receipt = PayoutReceipt {
                        distribution_id: distribution_id.clone(),
                        party: payout.party.clone(),
                        amount: payout.amount,
                        tx_hash,
                        paid_at: now,
                    };
                    self.repo.save_payout(&receipt)?;
                    info!(
                        distribution = %distribution_id,
                        party = %payout.party,
                        amount = payout.amount.raw(),
                        tx = %receipt.tx_hash,
                        "payout sent"
                    );
                    report.paid.push(receipt);
                }
                Err(e) => {
                    warn!(
                        distribution = %distribution_id,
                        party = %payout.party,
                        amount = payout.amount.raw(),
                        error = %e,
                        "payout failed"
                    );
                    report.failed.push(FailedPayout {
                        party: payout.party,
                        amount: payout.amount,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            distribution = %distribution_id,
            paid = report.paid.len(),
            already_paid = report.already_paid.len(),
            failed = report.failed.len(),
            "distribution run finished"
        );
        Ok(report)
    }
}
