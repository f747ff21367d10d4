//! Fundamental types for Optimus DAO settlement.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, wallet addresses, token amounts, timestamps, settlement parameters,
//! and the error taxonomy the orchestration layer branches on.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod ids;
pub mod params;
pub mod subject;
pub mod time;

pub use address::WalletAddress;
pub use amount::TokenAmount;
pub use error::ErrorKind;
pub use hash::{SignedTransaction, TxHash};
pub use ids::{
    ApplicationId, DaoId, DistributionId, LoanId, ParticipantId, PaymentRequestId, ProposalId,
};
pub use params::SettlementParams;
pub use subject::SubjectRef;
pub use time::{Timestamp, SECS_PER_DAY};
