//! Proportional distribution.
//!
//! One algorithm serves three payouts: loan interest and treasury liquidation
//! (weights = member investment) and BNPL late-fee redistribution
//! (weights = member voting power).
//!
//! Each party receives `floor(weight / Σweight × total)`. The leftover from
//! truncation is never allocated, so the payouts may sum to less than `total`
//! by at most `parties - 1` units. [`validate_sum`] checks that bound; callers
//! log a failed check and carry on.

pub mod engine;

pub use engine::{distribute, validate_sum, Payout, SumCheck, WeightedShare};
