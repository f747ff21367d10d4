//! The voting tally.

use crate::ballot::{Ballot, VoteChoice};
use optimus_types::{ParticipantId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weighted vote counts for one proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    pub yes_weight: u128,
    pub no_weight: u128,
    pub total_weight: u128,
    pub approved: bool,
}

impl TallyResult {
    fn from_weights(yes_weight: u128, no_weight: u128) -> Self {
        let total_weight = yes_weight + no_weight;
        // Strict majority: yes > total / 2. A tie is a rejection and so is an
        // empty tally.
        let approved = total_weight > 0 && yes_weight * 2 > total_weight;
        Self {
            yes_weight,
            no_weight,
            total_weight,
            approved,
        }
    }
}

/// Count `ballots` and decide strict majority.
///
/// A pure function of the ballot set: calling it again on the same ballots
/// returns the same result. If a voter appears more than once, the last ballot
/// in slice order counts. Tallying after `expires_at` is allowed.
pub fn tally(ballots: &[Ballot], now: Timestamp, expires_at: Timestamp) -> TallyResult {
    let mut latest: BTreeMap<&ParticipantId, &Ballot> = BTreeMap::new();
    for ballot in ballots {
        latest.insert(&ballot.voter, ballot);
    }

    let (mut yes, mut no) = (0u128, 0u128);
    for ballot in latest.values() {
        match ballot.choice {
            VoteChoice::Yes => yes += ballot.weight as u128,
            VoteChoice::No => no += ballot.weight as u128,
        }
    }

    let result = TallyResult::from_weights(yes, no);
    tracing::debug!(
        yes = result.yes_weight,
        no = result.no_weight,
        approved = result.approved,
        late = now > expires_at,
        "tallied ballots"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimus_types::ProposalId;

    fn ballot(voter: &str, choice: VoteChoice, weight: u64) -> Ballot {
        Ballot {
            proposal_id: ProposalId::new("p1"),
            voter: ParticipantId::new(voter),
            choice,
            weight,
        }
    }

    fn run(ballots: &[Ballot]) -> TallyResult {
        tally(ballots, Timestamp::new(10), Timestamp::new(100))
    }

    #[test]
    fn six_to_five_is_approved() {
        let result = run(&[
            ballot("a", VoteChoice::Yes, 6),
            ballot("b", VoteChoice::No, 5),
        ]);
        assert_eq!(result.total_weight, 11);
        assert!(result.approved);
    }

    #[test]
    fn tie_is_rejected() {
        let result = run(&[
            ballot("a", VoteChoice::Yes, 5),
            ballot("b", VoteChoice::No, 5),
        ]);
        assert!(!result.approved);
    }

    #[test]
    fn no_ballots_is_rejected() {
        let result = run(&[]);
        assert_eq!(result.total_weight, 0);
        assert!(!result.approved);
    }

    #[test]
    fn zero_weight_ballots_do_not_approve() {
        let result = run(&[ballot("a", VoteChoice::Yes, 0)]);
        assert_eq!(result.total_weight, 0);
        assert!(!result.approved);
    }

    #[test]
    fn last_ballot_per_voter_counts() {
        let result = run(&[
            ballot("a", VoteChoice::No, 1),
            ballot("b", VoteChoice::No, 1),
            ballot("a", VoteChoice::Yes, 1),
        ]);
        assert_eq!(result.yes_weight, 1);
        assert_eq!(result.no_weight, 1);
        assert!(!result.approved);
    }

    #[test]
    fn late_tally_gives_the_same_answer() {
        let ballots = [ballot("a", VoteChoice::Yes, 3), ballot("b", VoteChoice::No, 1)];
        let on_time = tally(&ballots, Timestamp::new(10), Timestamp::new(100));
        let late = tally(&ballots, Timestamp::new(10_000), Timestamp::new(100));
        assert_eq!(on_time, late);
    }
}
