//! Installment plans.

use crate::split::split_principal;
use crate::ScheduleError;
use optimus_types::{SignedTransaction, SubjectRef, Timestamp, TokenAmount, TxHash, SECS_PER_DAY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Late,
}

/// Upper bound on the number of installments in one plan.
pub const MAX_INSTALLMENTS: u32 = 1_000;

/// How long a plan runs and how many installments it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub period_secs: u64,
    pub installments: u32,
}

impl PaymentTerms {
    pub fn new(period_secs: u64, installments: u32) -> Self {
        Self {
            period_secs,
            installments,
        }
    }

    /// Terms as a DAO configures them for BNPL: a period in whole days.
    pub fn from_days(period_days: u32, installments: u32) -> Self {
        Self::new(period_days as u64 * SECS_PER_DAY, installments)
    }

    /// Spacing between consecutive due dates.
    pub fn spacing_secs(&self) -> u64 {
        self.period_secs / self.installments.max(1) as u64
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.installments == 0 {
            return Err(ScheduleError::NoInstallments);
        }
        if self.installments > MAX_INSTALLMENTS {
            return Err(ScheduleError::TooManyInstallments {
                requested: self.installments,
                max: MAX_INSTALLMENTS,
            });
        }
        if self.installments > 1 && self.period_secs == 0 {
            return Err(ScheduleError::EmptyPeriod);
        }
        Ok(())
    }
}

/// One scheduled partial payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub parent: SubjectRef,
    /// 1-based position in the plan.
    pub sequence: u32,
    pub amount: TokenAmount,
    pub due_at: Timestamp,
    pub status: InstallmentStatus,
    /// Set once, when the installment turns `Late`.
    pub late_fee: TokenAmount,
    pub paid_at: Option<Timestamp>,
    pub payment_tx: Option<TxHash>,
    /// Pre-signed payer transaction to execute at the due date, if the plan was
    /// funded through the payment protocol.
    #[serde(default)]
    pub signed_tx: Option<SignedTransaction>,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }

    pub fn is_late(&self) -> bool {
        self.status == InstallmentStatus::Late
    }

    /// Amount owed right now, late fee included.
    pub fn amount_due(&self) -> TokenAmount {
        self.amount + self.late_fee
    }

    /// Record payment. Returns whether the installment was `Late` when paid.
    pub fn mark_paid(&mut self, tx: TxHash, now: Timestamp) -> Result<bool, ScheduleError> {
        if self.is_paid() {
            return Err(ScheduleError::AlreadyPaid {
                sequence: self.sequence,
            });
        }
        let was_late = self.is_late();
        self.status = InstallmentStatus::Paid;
        self.paid_at = Some(now);
        self.payment_tx = Some(tx);
        Ok(was_late)
    }
}

/// Build the full installment set for `parent`.
///
/// Deterministic in `(principal, terms, origin)`: the same inputs always
/// produce the same plan, whenever it is built.
pub fn build_plan(
    parent: &SubjectRef,
    principal: TokenAmount,
    terms: PaymentTerms,
    origin: Timestamp,
) -> Result<Vec<Installment>, ScheduleError> {
    terms.validate()?;
    let amounts = split_principal(principal, terms.installments)?;
    let spacing = terms.spacing_secs();

    let plan = amounts
        .into_iter()
        .enumerate()
        .map(|(i, amount)| Installment {
            parent: parent.clone(),
            sequence: i as u32 + 1,
            amount,
            due_at: origin.plus_secs(spacing.saturating_mul(i as u64)),
            status: InstallmentStatus::Pending,
            late_fee: TokenAmount::ZERO,
            paid_at: None,
            payment_tx: None,
            signed_tx: None,
        })
        .collect();

    tracing::debug!(
        parent = %parent,
        principal = principal.raw(),
        installments = terms.installments,
        spacing_secs = spacing,
        "installment plan built"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimus_types::PaymentRequestId;

    fn parent() -> SubjectRef {
        SubjectRef::PaymentRequest(PaymentRequestId::new("pr-1"))
    }

    #[test]
    fn due_dates_spaced_from_origin() {
        let origin = Timestamp::new(1_000_000);
        let plan = build_plan(
            &parent(),
            TokenAmount::new(100),
            PaymentTerms::from_days(28, 4),
            origin,
        )
        .unwrap();

        let dues: Vec<u64> = plan.iter().map(|i| i.due_at.as_secs()).collect();
        let week = 7 * SECS_PER_DAY;
        assert_eq!(
            dues,
            vec![1_000_000, 1_000_000 + week, 1_000_000 + 2 * week, 1_000_000 + 3 * week]
        );
        assert_eq!(plan[0].sequence, 1);
        assert_eq!(plan[3].sequence, 4);
    }

    #[test]
    fn plan_is_deterministic() {
        let origin = Timestamp::new(42);
        let terms = PaymentTerms::from_days(30, 3);
        let a = build_plan(&parent(), TokenAmount::new(1_001), terms, origin).unwrap();
        let b = build_plan(&parent(), TokenAmount::new(1_001), terms, origin).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn multi_installment_plan_needs_a_period() {
        let err = build_plan(&parent(), TokenAmount::new(10), PaymentTerms::new(0, 2), Timestamp::EPOCH)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyPeriod));
    }

    #[test]
    fn installment_count_is_capped() {
        let terms = PaymentTerms::from_days(90, 4_000_000_000);
        let err = build_plan(&parent(), TokenAmount::new(10), terms, Timestamp::EPOCH).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::TooManyInstallments { requested: 4_000_000_000, max: MAX_INSTALLMENTS }
        ));
        assert!(PaymentTerms::from_days(90, MAX_INSTALLMENTS).validate().is_ok());
    }

    #[test]
    fn paying_twice_is_rejected() {
        let mut plan =
            build_plan(&parent(), TokenAmount::new(10), PaymentTerms::new(0, 1), Timestamp::EPOCH)
                .unwrap();
        let inst = &mut plan[0];
        assert!(!inst.mark_paid(TxHash::new("0x1"), Timestamp::new(5)).unwrap());
        assert!(matches!(
            inst.mark_paid(TxHash::new("0x2"), Timestamp::new(6)),
            Err(ScheduleError::AlreadyPaid { sequence: 1 })
        ));
        assert_eq!(inst.payment_tx, Some(TxHash::new("0x1")));
    }
}
