//! Risk profile engine.
//!
//! One profile per participant, created lazily on the first scored event.
//! Every event applies an integer delta with a floor of zero. Inactivity decay
//! is driven by the last-activity timestamp alone: a participant who transacts
//! between two decay runs simply drops out of the next run's inactive set.

pub mod engine;
pub mod error;
pub mod event;
pub mod profile;

pub use engine::{DecayReport, RiskEngine};
pub use error::RiskError;
pub use event::{RiskEvent, RiskPolicy};
pub use profile::RiskProfile;
