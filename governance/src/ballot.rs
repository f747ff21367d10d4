//! Ballots and voting-power models.

use optimus_types::{ParticipantId, ProposalId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
}

/// One member's vote on one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub proposal_id: ProposalId,
    pub voter: ParticipantId,
    pub choice: VoteChoice,
    /// Voting power. Zero-weight ballots are recorded but move nothing.
    pub weight: u64,
}

/// How a member's stake turns into voting power.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightingModel {
    /// Every ballot weighs 1.
    #[default]
    OneMemberOneVote,
    /// Weight equals the member's stake / investment.
    Stake,
}

impl WeightingModel {
    pub fn weight(&self, stake: u64) -> u64 {
        match self {
            Self::OneMemberOneVote => 1,
            Self::Stake => stake,
        }
    }
}

/// Outcome of casting a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BallotReceipt {
    /// First ballot from this voter on this proposal.
    Accepted,
    /// Replaced the voter's earlier ballot (last ballot wins).
    Replaced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_member_one_vote_ignores_stake() {
        assert_eq!(WeightingModel::OneMemberOneVote.weight(0), 1);
        assert_eq!(WeightingModel::OneMemberOneVote.weight(5_000), 1);
    }

    #[test]
    fn stake_weighting_passes_stake_through() {
        assert_eq!(WeightingModel::Stake.weight(0), 0);
        assert_eq!(WeightingModel::Stake.weight(5_000), 5_000);
    }
}
