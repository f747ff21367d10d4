use proptest::prelude::*;

use optimus_governance::{tally, Ballot, VoteChoice};
use optimus_types::{ParticipantId, ProposalId, Timestamp};

fn ballots_strategy() -> impl Strategy<Value = Vec<Ballot>> {
    prop::collection::vec((0u8..20, any::<bool>(), 0u64..1_000), 0..40).prop_map(|raw| {
        raw.into_iter()
            .map(|(voter, yes, weight)| Ballot {
                proposal_id: ProposalId::new("p"),
                voter: ParticipantId::new(format!("voter-{voter}")),
                choice: if yes { VoteChoice::Yes } else { VoteChoice::No },
                weight,
            })
            .collect()
    })
}

proptest! {
    /// Re-tallying the same ballots always gives the same answer.
    #[test]
    fn tally_is_pure(ballots in ballots_strategy(), now in 0u64..1_000_000) {
        let expires = Timestamp::new(500_000);
        let first = tally(&ballots, Timestamp::new(now), expires);
        let second = tally(&ballots, Timestamp::new(now), expires);
        let later = tally(&ballots, Timestamp::new(now + 1_000_000), expires);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, later);
    }

    /// Approval is exactly strict majority of the counted weight.
    #[test]
    fn approval_is_strict_majority(ballots in ballots_strategy()) {
        let result = tally(&ballots, Timestamp::new(0), Timestamp::new(1));
        prop_assert_eq!(result.total_weight, result.yes_weight + result.no_weight);
        if result.total_weight == 0 {
            prop_assert!(!result.approved);
        } else {
            prop_assert_eq!(result.approved, result.yes_weight * 2 > result.total_weight);
        }
    }

    /// An exact split is never approved.
    #[test]
    fn exact_split_is_rejected(weight in 0u64..1_000_000) {
        let ballots = vec![
            Ballot {
                proposal_id: ProposalId::new("p"),
                voter: ParticipantId::new("yes"),
                choice: VoteChoice::Yes,
                weight,
            },
            Ballot {
                proposal_id: ProposalId::new("p"),
                voter: ParticipantId::new("no"),
                choice: VoteChoice::No,
                weight,
            },
        ];
        prop_assert!(!tally(&ballots, Timestamp::new(0), Timestamp::new(1)).approved);
    }
}
