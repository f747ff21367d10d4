//! What a proposal or an installment plan belongs to.

use crate::ids::{ApplicationId, LoanId, PaymentRequestId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to the entity a proposal votes on or an installment plan repays.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubjectRef {
    Loan(LoanId),
    Application(ApplicationId),
    PaymentRequest(PaymentRequestId),
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loan(id) => write!(f, "loan_{id}"),
            Self::Application(id) => write!(f, "bnpl_access_{id}"),
            Self::PaymentRequest(id) => write!(f, "payment_{id}"),
        }
    }
}
