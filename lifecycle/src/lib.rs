//! Settlement lifecycles for member-governed collectives.
//!
//! [`SettlementEngine`] drives loans and BNPL-access applications from request
//! through the DAO vote to disbursement, repayment and closure, and settles
//! direct payments. [`BnplPurchaseEngine`] adds pre-signed installment
//! purchases on top and exists only with a transaction validator attached.
//!
//! Every operation may be invoked more than once for the same step. Each one
//! reads the stored state first and either resumes or reports a replay, so a
//! retried call never repeats a ledger side effect that already succeeded.
//! Risk score updates never fail the operation that triggers them; their
//! outcome is carried in the result as a [`RiskUpdate`].

pub mod application;
pub mod config;
pub mod engine;
pub mod error;
pub mod installments;
pub mod liquidation;
pub mod loan;
pub mod payment;
pub mod payout;
pub mod purchase;
pub mod records;
pub mod repository;

pub use application::member_resource_type;
pub use config::SettlementConfig;
pub use engine::{RiskUpdate, SettlementEngine, VoteDecision};
pub use error::SettlementError;
pub use installments::LateFeeAssessment;
pub use liquidation::{liquidation_distribution_id, LiquidationReport};
pub use loan::{Disbursement, RepaymentOutcome, RepaymentReview};
pub use payment::PaymentSettlement;
pub use payout::{DistributionReport, FailedPayout};
pub use purchase::{BnplPurchaseEngine, CollectionOutcome, PurchaseOutcome};
pub use records::{
    ApplicationStatus, BnplApplication, BnplTerms, Collective, CollectiveStatus, Loan,
    LoanRequest, LoanStatus, PaymentDraft, PaymentRequest, PaymentRequestStatus,
    PayoutReceipt, PurchaseProgress,
};
pub use repository::Repository;
