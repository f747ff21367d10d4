use proptest::prelude::*;

use optimus_nullables::NullStore;
use optimus_risk::{RiskEngine, RiskEvent, RiskPolicy};
use optimus_types::{ParticipantId, Timestamp};

fn event() -> impl Strategy<Value = RiskEvent> {
    prop_oneof![
        Just(RiskEvent::PaymentParticipation),
        Just(RiskEvent::OnTimeInstallment),
        Just(RiskEvent::LateInstallment),
        Just(RiskEvent::InactivityDecay),
        Just(RiskEvent::LoanRejected),
    ]
}

proptest! {
    /// Replaying any event sequence matches a clamped running sum.
    #[test]
    fn score_tracks_clamped_sum(events in prop::collection::vec(event(), 0..64)) {
        let store = NullStore::new();
        let policy = RiskPolicy::default();
        let risk = RiskEngine::new(&store, policy);
        let who = ParticipantId::new("p");

        let mut expected: i64 = 0;
        for (i, e) in events.iter().enumerate() {
            let p = risk.apply(&who, *e, Timestamp::new(i as u64)).unwrap();
            expected = (expected + policy.delta(*e)).max(0);
            prop_assert_eq!(p.score as i64, expected);
        }
    }
}
