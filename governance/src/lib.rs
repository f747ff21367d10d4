//! Governance for member-governed collectives.
//!
//! A loan or BNPL-access application that needs the DAO's consent gets a
//! [`Proposal`] with a fixed voting window. Members cast weighted [`Ballot`]s
//! and the proposal is decided by strict majority of the cast weight:
//! `approved = yes > total / 2`, with no ballots meaning rejection.
//!
//! Weighting is the caller's choice ([`WeightingModel`]): one member one vote,
//! or weight = stake for plutocratic DAOs. The tally itself is weight-agnostic.

pub mod ballot;
pub mod engine;
pub mod error;
pub mod proposal;
pub mod tally;

pub use ballot::{Ballot, BallotReceipt, VoteChoice, WeightingModel};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use proposal::{Proposal, ProposalStatus};
pub use tally::{tally, TallyResult};
