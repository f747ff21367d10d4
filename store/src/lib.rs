//! Abstract repository traits for Optimus settlement.
//!
//! Every storage backend (a SQL table set, a KV store, in-memory for testing)
//! implements these traits. Records cross the boundary as bincode bytes; the
//! engines own the record types and use [`codec`] to encode them.
//!
//! Single-entity puts are atomic. Multi-entity transitions go through a
//! [`WriteBatch`], which is all-or-nothing on `commit` and discarded on drop.

pub mod batch;
pub mod codec;
pub mod error;
pub mod governance;
pub mod installment;
pub mod lending;
pub mod payout;
pub mod risk;

pub use batch::{BatchStore, WriteBatch};
pub use error::StoreError;
pub use governance::{BallotStore, ProposalStore};
pub use installment::InstallmentStore;
pub use lending::{ApplicationStore, CollectiveStore, LoanStore, PaymentRequestStore};
pub use payout::PayoutStore;
pub use risk::RiskProfileStore;

/// Everything the settlement engines need from a backend.
pub trait SettlementStore:
    LoanStore
    + ApplicationStore
    + CollectiveStore
    + PaymentRequestStore
    + ProposalStore
    + BallotStore
    + InstallmentStore
    + RiskProfileStore
    + PayoutStore
    + BatchStore
{
}

impl<T> SettlementStore for T where
    T: LoanStore
        + ApplicationStore
        + CollectiveStore
        + PaymentRequestStore
        + ProposalStore
        + BallotStore
        + InstallmentStore
        + RiskProfileStore
        + PayoutStore
        + BatchStore
{
}
