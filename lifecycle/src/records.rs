//! Persisted settlement records.
//!
//! These are the values the engines encode into the byte-level stores. Each
//! status enum is the entity's lifecycle state; records are only ever moved
//! forward, never deleted.

use optimus_schedule::PaymentTerms;
use optimus_types::{
    ApplicationId, DaoId, DistributionId, LoanId, ParticipantId, PaymentRequestId, ProposalId,
    SignedTransaction, Timestamp, TokenAmount, TxHash, WalletAddress,
};
use serde::{Deserialize, Serialize};

// ── Collective ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectiveStatus {
    Active,
    Dissolved,
}

/// BNPL payment terms a DAO offers: a period in days split into installments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BnplTerms {
    pub period_days: u32,
    pub installments: u32,
}

impl BnplTerms {
    pub fn payment_terms(&self) -> PaymentTerms {
        PaymentTerms::from_days(self.period_days, self.installments)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collective {
    pub dao_id: DaoId,
    pub treasury_address: WalletAddress,
    /// `None` for a DAO that does not offer BNPL.
    pub bnpl_terms: Option<BnplTerms>,
    pub status: CollectiveStatus,
    pub dissolve_tx: Option<TxHash>,
}

impl Collective {
    pub fn new(dao_id: DaoId, treasury_address: WalletAddress) -> Self {
        Self {
            dao_id,
            treasury_address,
            bnpl_terms: None,
            status: CollectiveStatus::Active,
            dissolve_tx: None,
        }
    }

    pub fn with_bnpl_terms(mut self, period_days: u32, installments: u32) -> Self {
        self.bnpl_terms = Some(BnplTerms {
            period_days,
            installments,
        });
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == CollectiveStatus::Active
    }
}

// ── Loan ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Requested,
    VotingOpen,
    Approved,
    Rejected,
    Disbursed,
    Repaying,
    Completed,
    Defaulted,
    Liquidated,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Completed | Self::Defaulted | Self::Liquidated
        )
    }

    /// Funds have left the treasury.
    pub fn is_disbursed(&self) -> bool {
        matches!(self, Self::Disbursed | Self::Repaying)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub dao_id: DaoId,
    pub borrower_id: ParticipantId,
    pub borrower_address: WalletAddress,
    pub principal: TokenAmount,
    /// Simple interest over the whole term, in basis points.
    pub interest_rate_bps: u32,
    pub term_secs: u64,
    pub status: LoanStatus,
    pub proposal_id: Option<ProposalId>,
    pub requested_at: Timestamp,
    pub approval_tx: Option<TxHash>,
    pub disbursement_tx: Option<TxHash>,
    pub disbursed_at: Option<Timestamp>,
}

impl Loan {
    pub fn interest(&self) -> TokenAmount {
        self.principal.mul_bps(self.interest_rate_bps)
    }
}

/// Input to `request_loan`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub id: LoanId,
    pub dao_id: DaoId,
    pub borrower_id: ParticipantId,
    pub borrower_address: WalletAddress,
    pub principal: TokenAmount,
    pub interest_rate_bps: u32,
    pub term_secs: u64,
}

// ── BNPL access ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Requested,
    VotingOpen,
    Approved,
    Rejected,
    Liquidated,
}

impl ApplicationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Liquidated)
    }
}

/// A participant's request for BNPL access to one DAO.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BnplApplication {
    pub id: ApplicationId,
    pub dao_id: DaoId,
    pub applicant_id: ParticipantId,
    pub applicant_address: WalletAddress,
    pub status: ApplicationStatus,
    pub proposal_id: Option<ProposalId>,
    pub requested_at: Timestamp,
    pub decided_at: Option<Timestamp>,
    /// The DAO's pre-signed treasury → merchant operation, collected after approval.
    pub treasury_operation: Option<SignedTransaction>,
}

impl BnplApplication {
    /// One application per (applicant, DAO), so a retried `apply` finds the
    /// record it created the first time.
    pub fn id_for(applicant: &ParticipantId, dao_id: &DaoId) -> ApplicationId {
        ApplicationId::new(format!("{applicant}@{dao_id}"))
    }
}

// ── Payment requests ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentRequestStatus {
    Created,
    Completed,
}

/// Progress of a BNPL purchase, so a retried purchase resumes where it stopped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseProgress {
    pub dao_id: DaoId,
    pub application_id: ApplicationId,
    pub merchant_tx: Option<TxHash>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub id: PaymentRequestId,
    pub payer_id: ParticipantId,
    pub payer_address: WalletAddress,
    pub recipient_id: ParticipantId,
    pub recipient_address: WalletAddress,
    /// Fiat amount in minor units (cents).
    pub amount_fiat_minor: u64,
    pub currency: String,
    pub token: String,
    pub amount_token: TokenAmount,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: PaymentRequestStatus,
    pub settlement_tx: Option<TxHash>,
    pub purchase: Option<PurchaseProgress>,
}

impl PaymentRequest {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Input to `create_payment_request`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub id: PaymentRequestId,
    pub payer_id: ParticipantId,
    pub payer_address: WalletAddress,
    pub recipient_id: ParticipantId,
    pub recipient_address: WalletAddress,
    pub amount_fiat_minor: u64,
    pub currency: String,
    pub expires_at: Timestamp,
}

// ── Payout receipts ────────────────────────────────────────────────────

/// Proof that one party of one distribution was paid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub distribution_id: DistributionId,
    pub party: WalletAddress,
    pub amount: TokenAmount,
    pub tx_hash: TxHash,
    pub paid_at: Timestamp,
}
