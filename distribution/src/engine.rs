use optimus_types::{TokenAmount, WalletAddress};
use serde::{Deserialize, Serialize};

/// A party's claim on a distribution. Transient input, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedShare {
    pub party: WalletAddress,
    pub weight: u64,
}

impl WeightedShare {
    pub fn new(party: impl Into<WalletAddress>, weight: u64) -> Self {
        Self {
            party: party.into(),
            weight,
        }
    }
}

/// What one party is owed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub party: WalletAddress,
    pub amount: TokenAmount,
}

/// Split `total` across `shares` in proportion to weight, rounding down.
///
/// Returns an empty distribution when there is nothing to distribute
/// (`total == 0`) or nobody to distribute to (`Σweight == 0`). Zero-weight
/// parties and parties whose share truncates to zero are omitted. Input order
/// is preserved.
pub fn distribute(total: TokenAmount, shares: &[WeightedShare]) -> Vec<Payout> {
    let total_weight: u128 = shares.iter().map(|s| s.weight as u128).sum();
    if total.is_zero() || total_weight == 0 {
        return Vec::new();
    }

    shares
        .iter()
        .filter(|s| s.weight > 0)
        .filter_map(|s| {
            // weight ≤ Σweight, so the quotient is ≤ total and fits in u64.
            let amount = (s.weight as u128 * total.raw() as u128 / total_weight) as u64;
            (amount > 0).then(|| Payout {
                party: s.party.clone(),
                amount: TokenAmount::new(amount),
            })
        })
        .collect()
}

/// Result of checking a distribution against its target total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumCheck {
    pub total: TokenAmount,
    pub distributed: TokenAmount,
    /// `total - distributed` (zero if over-allocated).
    pub shortfall: TokenAmount,
    /// Largest acceptable shortfall: `parties - 1`.
    pub tolerance: u64,
    pub within_tolerance: bool,
}

/// Check that `payouts` never exceed `total` and fall short by no more than
/// the truncation bound for `party_count` parties.
pub fn validate_sum(payouts: &[Payout], total: TokenAmount, party_count: usize) -> SumCheck {
    let distributed: u128 = payouts.iter().map(|p| p.amount.raw() as u128).sum();
    let tolerance = party_count.saturating_sub(1) as u64;
    let over = distributed > total.raw() as u128;
    let shortfall = (total.raw() as u128).saturating_sub(distributed) as u64;
    let within_tolerance = !over && shortfall <= tolerance;

    if !within_tolerance {
        tracing::warn!(
            total = total.raw(),
            distributed = distributed as u64,
            tolerance,
            "distribution sum outside truncation tolerance"
        );
    }

    SumCheck {
        total,
        distributed: TokenAmount::new(distributed.min(u64::MAX as u128) as u64),
        shortfall: TokenAmount::new(shortfall),
        tolerance,
        within_tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(party: &str, weight: u64) -> WeightedShare {
        WeightedShare::new(party, weight)
    }

    #[test]
    fn thirty_seventy_split_of_one_thousand() {
        let payouts = distribute(
            TokenAmount::new(1_000),
            &[share("0xa", 30), share("0xb", 70)],
        );
        assert_eq!(
            payouts,
            vec![
                Payout { party: "0xa".into(), amount: TokenAmount::new(300) },
                Payout { party: "0xb".into(), amount: TokenAmount::new(700) },
            ]
        );
    }

    #[test]
    fn nothing_to_distribute_is_empty() {
        assert!(distribute(TokenAmount::ZERO, &[share("0xa", 1)]).is_empty());
        assert!(distribute(TokenAmount::new(100), &[]).is_empty());
        assert!(distribute(TokenAmount::new(100), &[share("0xa", 0)]).is_empty());
    }

    #[test]
    fn remainder_is_left_unallocated() {
        let shares = [share("0xa", 1), share("0xb", 1), share("0xc", 1)];
        let payouts = distribute(TokenAmount::new(100), &shares);
        let sum: TokenAmount = payouts.iter().map(|p| p.amount).sum();
        assert_eq!(sum, TokenAmount::new(99));
        let check = validate_sum(&payouts, TokenAmount::new(100), shares.len());
        assert!(check.within_tolerance);
        assert_eq!(check.shortfall, TokenAmount::new(1));
    }

    #[test]
    fn parties_with_truncated_zero_share_are_omitted() {
        let payouts = distribute(
            TokenAmount::new(10),
            &[share("0xwhale", 1_000), share("0xminnow", 1)],
        );
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].party, WalletAddress::new("0xwhale"));
        assert_eq!(payouts[0].amount, TokenAmount::new(9));
    }

    #[test]
    fn over_allocation_fails_validation() {
        let payouts = vec![Payout {
            party: "0xa".into(),
            amount: TokenAmount::new(101),
        }];
        assert!(!validate_sum(&payouts, TokenAmount::new(100), 1).within_tolerance);
    }

    #[test]
    fn large_weights_do_not_overflow() {
        let payouts = distribute(
            TokenAmount::new(u64::MAX),
            &[share("0xa", u64::MAX), share("0xb", u64::MAX)],
        );
        assert_eq!(payouts.len(), 2);
        assert_eq!(payouts[0].amount, TokenAmount::new(u64::MAX / 2));
    }
}
