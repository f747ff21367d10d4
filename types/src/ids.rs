//! String identifiers for settlement entities.
//!
//! Every id is an opaque string chosen by the caller (usually a UUID minted by
//! the orchestration layer), so retries of the same step address the same record.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// A member-governed collective, identified by its on-chain DAO address.
    DaoId
);
string_id!(
    /// A loan requested from a DAO treasury.
    LoanId
);
string_id!(
    /// A request for BNPL access to one DAO.
    ApplicationId
);
string_id!(
    /// A payment request (direct payment or BNPL purchase).
    PaymentRequestId
);
string_id!(
    /// A governance proposal put to a quorum vote.
    ProposalId
);
string_id!(
    /// A user known to the settlement system (borrower, voter, payer).
    ParticipantId
);
string_id!(
    /// One run of the distribution engine whose payouts are tracked together.
    DistributionId
);

impl DaoId {
    /// The DAO id doubles as its on-chain contract address.
    pub fn contract_address(&self) -> crate::WalletAddress {
        crate::WalletAddress::new(self.0.clone())
    }
}

impl ProposalId {
    /// Deterministic proposal id for a subject, so a retried "open voting"
    /// step can never mint a second proposal.
    pub fn for_subject(subject: &crate::SubjectRef) -> Self {
        Self(format!("proposal_{}", subject))
    }
}
