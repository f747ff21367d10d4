use proptest::prelude::*;

use optimus_distribution::{distribute, validate_sum, WeightedShare};
use optimus_types::TokenAmount;

fn shares_strategy() -> impl Strategy<Value = Vec<WeightedShare>> {
    prop::collection::vec(0u64..10_000, 0..30).prop_map(|weights| {
        weights
            .into_iter()
            .enumerate()
            .map(|(i, w)| WeightedShare::new(format!("0x{i:x}"), w))
            .collect()
    })
}

proptest! {
    /// Payouts never exceed the total, and fall short by at most parties - 1.
    #[test]
    fn payouts_bounded_by_total(total in 0u64..10_000_000_000, shares in shares_strategy()) {
        let payouts = distribute(TokenAmount::new(total), &shares);
        let sum: u128 = payouts.iter().map(|p| p.amount.raw() as u128).sum();
        prop_assert!(sum <= total as u128);

        let parties = shares.iter().filter(|s| s.weight > 0).count();
        if parties > 0 && total > 0 {
            prop_assert!(total as u128 - sum <= parties.saturating_sub(1) as u128);
            prop_assert!(validate_sum(&payouts, TokenAmount::new(total), parties).within_tolerance);
        }
    }

    /// When every share divides the total exactly, the payouts are exact.
    #[test]
    fn evenly_divisible_totals_are_fully_paid(
        weights in prop::collection::vec(1u64..100, 1..10),
        multiplier in 1u64..1_000,
    ) {
        let total_weight: u64 = weights.iter().sum();
        let total = total_weight * multiplier;
        let shares: Vec<_> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| WeightedShare::new(format!("0x{i:x}"), *w))
            .collect();
        let payouts = distribute(TokenAmount::new(total), &shares);
        let sum: TokenAmount = payouts.iter().map(|p| p.amount).sum();
        prop_assert_eq!(sum, TokenAmount::new(total));
    }

    /// Nothing in, nothing out.
    #[test]
    fn zero_total_is_empty(shares in shares_strategy()) {
        prop_assert!(distribute(TokenAmount::ZERO, &shares).is_empty());
    }
}
