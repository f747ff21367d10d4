//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every external collaborator of the settlement engines (clock, repository,
//! ledger, price oracle, transaction validator) is abstracted behind a trait.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be scripted to fail on demand
//! - Record what they were asked to do
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod oracle;
pub mod store;
pub mod validator;

pub use clock::NullClock;
pub use ledger::{NullLedger, RecordedTransfer};
pub use oracle::NullOracle;
pub use store::NullStore;
pub use validator::NullValidator;
