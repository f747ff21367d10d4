//! Late-fee policy.

use crate::plan::{Installment, InstallmentStatus};
use optimus_types::{Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateFeePolicy {
    pub fee_bps: u32,
}

impl LateFeePolicy {
    pub fn new(fee_bps: u32) -> Self {
        Self { fee_bps }
    }

    pub fn fee_for(&self, amount: TokenAmount) -> TokenAmount {
        amount.mul_bps(self.fee_bps)
    }

    /// Turn an overdue, unpaid `Pending` installment `Late` and fix its fee.
    ///
    /// Returns the fee when this call made the transition. An installment that
    /// is already `Late` (or `Paid`, or not yet due) is left untouched, so
    /// re-evaluation never recomputes or compounds the fee.
    pub fn assess(&self, installment: &mut Installment, now: Timestamp) -> Option<TokenAmount> {
        let overdue = now > installment.due_at;
        if installment.status != InstallmentStatus::Pending
            || installment.paid_at.is_some()
            || !overdue
        {
            return None;
        }
        let fee = self.fee_for(installment.amount);
        installment.status = InstallmentStatus::Late;
        installment.late_fee = fee;
        tracing::info!(
            parent = %installment.parent,
            sequence = installment.sequence,
            fee = fee.raw(),
            "installment marked late"
        );
        Some(fee)
    }
}

/// Longest run of consecutive `Late` installments, by sequence number.
pub fn consecutive_late(plan: &[Installment]) -> u32 {
    let mut ordered: Vec<&Installment> = plan.iter().collect();
    ordered.sort_by_key(|i| i.sequence);

    let (mut best, mut run) = (0u32, 0u32);
    for inst in ordered {
        if inst.is_late() {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{build_plan, PaymentTerms};
    use optimus_types::{LoanId, SubjectRef, TxHash, SECS_PER_DAY};

    fn plan(n: u32) -> Vec<Installment> {
        build_plan(
            &SubjectRef::Loan(LoanId::new("l1")),
            TokenAmount::new(1_000 * n as u64),
            PaymentTerms::new(n as u64 * 30 * SECS_PER_DAY, n),
            Timestamp::new(0),
        )
        .unwrap()
    }

    #[test]
    fn fee_is_five_percent_rounded_down() {
        let policy = LateFeePolicy::new(500);
        assert_eq!(policy.fee_for(TokenAmount::new(1_000)), TokenAmount::new(50));
        assert_eq!(policy.fee_for(TokenAmount::new(39)), TokenAmount::new(1));
    }

    #[test]
    fn due_date_itself_is_not_late() {
        let policy = LateFeePolicy::new(500);
        let mut inst = plan(1).remove(0);
        let due_at = inst.due_at;
        assert_eq!(policy.assess(&mut inst, due_at), None);
        assert_eq!(inst.status, InstallmentStatus::Pending);
    }

    #[test]
    fn late_fee_is_assessed_once() {
        let policy = LateFeePolicy::new(500);
        let mut inst = plan(1).remove(0);
        let now = inst.due_at.plus_secs(1);

        assert_eq!(policy.assess(&mut inst, now), Some(TokenAmount::new(50)));
        assert_eq!(policy.assess(&mut inst, now.plus_days(30)), None);
        assert_eq!(inst.late_fee, TokenAmount::new(50));
        assert_eq!(inst.amount_due(), TokenAmount::new(1_050));
    }

    #[test]
    fn paid_installments_never_turn_late() {
        let policy = LateFeePolicy::new(500);
        let mut inst = plan(1).remove(0);
        inst.mark_paid(TxHash::new("0x1"), Timestamp::new(1)).unwrap();
        assert_eq!(policy.assess(&mut inst, Timestamp::new(u64::MAX)), None);
    }

    #[test]
    fn counts_longest_late_run() {
        let mut p = plan(5);
        p[0].status = InstallmentStatus::Late;
        p[2].status = InstallmentStatus::Late;
        p[3].status = InstallmentStatus::Late;
        assert_eq!(consecutive_late(&p), 2);
        p.reverse();
        assert_eq!(consecutive_late(&p), 2);
    }
}
