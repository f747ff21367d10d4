//! Reminder eligibility.

use crate::plan::{Installment, InstallmentStatus};
use optimus_types::{SubjectRef, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

/// An installment a payer should be reminded about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub parent: SubjectRef,
    pub sequence: u32,
    pub amount: TokenAmount,
    pub due_at: Timestamp,
}

impl From<&Installment> for Reminder {
    fn from(inst: &Installment) -> Self {
        Self {
            parent: inst.parent.clone(),
            sequence: inst.sequence,
            amount: inst.amount_due(),
            due_at: inst.due_at,
        }
    }
}

/// Pending and due within `[now, now + window]`.
pub fn is_reminder_due(installment: &Installment, now: Timestamp, window_secs: u64) -> bool {
    installment.status == InstallmentStatus::Pending
        && installment.due_at >= now
        && installment.due_at <= now.plus_secs(window_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{build_plan, PaymentTerms};
    use optimus_types::{PaymentRequestId, SECS_PER_DAY};

    #[test]
    fn only_upcoming_pending_installments_qualify() {
        let plan = build_plan(
            &SubjectRef::PaymentRequest(PaymentRequestId::new("pr")),
            TokenAmount::new(300),
            PaymentTerms::from_days(30, 3),
            Timestamp::new(0),
        )
        .unwrap();
        let window = 3 * SECS_PER_DAY;

        // Day 8: installment 2 (due day 10) is within three days.
        let now = Timestamp::new(8 * SECS_PER_DAY);
        let due: Vec<u32> = plan
            .iter()
            .filter(|i| is_reminder_due(i, now, window))
            .map(|i| i.sequence)
            .collect();
        assert_eq!(due, vec![2]);

        // Installment 1 was due at day 0: overdue, not a reminder.
        assert!(!is_reminder_due(&plan[0], now, window));
    }
}
