//! External collaborators of the settlement core.
//!
//! The core never talks to a chain, an oracle or a payment facilitator
//! directly. It is handed implementations of these traits at construction
//! time; tests hand it the doubles from `optimus-nullables`.
//!
//! All ledger calls are at-least-once from the core's point of view, so the
//! engines read their own stored state before issuing any call that moves funds.

pub mod error;
pub mod ledger;
pub mod oracle;
pub mod validator;

pub use error::ChainError;
pub use ledger::{CallOutcome, ContractCall, LedgerClient, MemberWeight};
pub use oracle::PriceOracle;
pub use validator::{TransactionValidator, ValidationReport};
