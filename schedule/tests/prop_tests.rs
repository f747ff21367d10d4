use proptest::prelude::*;

use optimus_schedule::{build_plan, split_principal, LateFeePolicy, PaymentTerms};
use optimus_types::{LoanId, SubjectRef, Timestamp, TokenAmount};

proptest! {
    /// The installments always reconstruct the principal exactly.
    #[test]
    fn split_sums_to_principal(principal in 0u64..u64::MAX, n in 1u32..500) {
        let amounts = split_principal(TokenAmount::new(principal), n).unwrap();
        prop_assert_eq!(amounts.len(), n as usize);
        let sum: u128 = amounts.iter().map(|a| a.raw() as u128).sum();
        prop_assert_eq!(sum, principal as u128);
        // Only the first installment carries the remainder.
        for a in &amounts[1..] {
            prop_assert_eq!(*a, TokenAmount::new(principal / n as u64));
        }
    }

    /// Due dates start at the origin and are non-decreasing.
    #[test]
    fn due_dates_monotonic(
        origin in 0u64..1_000_000_000,
        period in 1u64..100_000_000,
        n in 1u32..50,
    ) {
        let plan = build_plan(
            &SubjectRef::Loan(LoanId::new("l")),
            TokenAmount::new(1_000_000),
            PaymentTerms::new(period, n),
            Timestamp::new(origin),
        ).unwrap();
        prop_assert_eq!(plan[0].due_at, Timestamp::new(origin));
        for pair in plan.windows(2) {
            prop_assert!(pair[0].due_at <= pair[1].due_at);
            prop_assert_eq!(pair[0].sequence + 1, pair[1].sequence);
        }
    }

    /// Re-assessing a late installment never changes its fee.
    #[test]
    fn late_fee_is_idempotent(amount in 0u64..1_000_000_000, extra in 1u64..10_000_000) {
        let policy = LateFeePolicy::new(500);
        let mut plan = build_plan(
            &SubjectRef::Loan(LoanId::new("l")),
            TokenAmount::new(amount),
            PaymentTerms::new(0, 1),
            Timestamp::new(0),
        ).unwrap();
        let inst = &mut plan[0];
        let first = policy.assess(inst, Timestamp::new(1));
        let fee = inst.late_fee;
        let second = policy.assess(inst, Timestamp::new(1 + extra));
        prop_assert_eq!(first, Some(TokenAmount::new(amount / 20)));
        prop_assert_eq!(second, None);
        prop_assert_eq!(inst.late_fee, fee);
    }
}
