use proptest::prelude::*;

use optimus_types::{SettlementParams, Timestamp, TokenAmount};

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// elapsed_since saturates to 0 when now precedes the timestamp.
    #[test]
    fn timestamp_elapsed_since_saturates(
        base in 1u64..1_000_000,
        deficit in 1u64..1_000_000,
    ) {
        let later = Timestamp::new(base + deficit);
        let earlier = Timestamp::new(base);
        prop_assert_eq!(later.elapsed_since(earlier), 0);
        prop_assert_eq!(earlier.elapsed_since(later), deficit);
    }

    /// has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired_correct(
        start in 0u64..500_000,
        duration in 1u64..500_000,
        offset in 0u64..1_000_000,
    ) {
        let t = Timestamp::new(start);
        let now = Timestamp::new(start.saturating_add(offset));
        prop_assert_eq!(t.has_expired(duration, now), offset >= duration);
    }

    /// A basis-point share never exceeds the original amount for bps <= 10_000.
    #[test]
    fn mul_bps_bounded(raw in 0u64..u64::MAX, bps in 0u32..=10_000) {
        let amount = TokenAmount::new(raw);
        prop_assert!(amount.mul_bps(bps) <= amount);
    }

    /// saturating_sub returns ZERO on underflow.
    #[test]
    fn token_amount_saturating_sub(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let result = TokenAmount::new(a).saturating_sub(TokenAmount::new(b));
        if b > a {
            prop_assert_eq!(result, TokenAmount::ZERO);
        } else {
            prop_assert_eq!(result, TokenAmount::new(a - b));
        }
    }
}

#[test]
fn settlement_params_survive_bincode() {
    let params = SettlementParams::default();
    let bytes = bincode::serialize(&params).unwrap();
    let decoded: SettlementParams = bincode::deserialize(&bytes).unwrap();
    assert_eq!(decoded, params);
}
