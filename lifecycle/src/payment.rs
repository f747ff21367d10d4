//! Direct payments between participants.

use crate::engine::{RiskUpdate, SettlementEngine};
use crate::error::SettlementError;
use crate::records::{PaymentDraft, PaymentRequest, PaymentRequestStatus};
use optimus_chain::{LedgerClient, PriceOracle};
use optimus_risk::RiskEvent;
use optimus_store::SettlementStore;
use optimus_types::{PaymentRequestId, SignedTransaction, Timestamp, TokenAmount, TxHash};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettlement {
    pub request_id: PaymentRequestId,
    pub tx_hash: TxHash,
    /// Payer first, then recipient. Empty on replay.
    pub risk: Vec<RiskUpdate>,
    pub replayed: bool,
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    /// Convert a fiat amount (minor units) into `token` at the oracle's
    /// current price.
    pub async fn quote<O: PriceOracle>(
        &self,
        oracle: &O,
        amount_fiat_minor: u64,
        currency: &str,
        token: &str,
    ) -> Result<TokenAmount, SettlementError> {
        let amount = oracle.convert(amount_fiat_minor, currency, token).await?;
        info!(fiat = amount_fiat_minor, currency, token, amount = amount.raw(), "price quoted");
        Ok(amount)
    }

    /// Price a payment request and store it as `Created`. An id already on
    /// file is returned unchanged.
    pub async fn create_payment_request<O: PriceOracle>(
        &self,
        oracle: &O,
        draft: PaymentDraft,
        token: &str,
        now: Timestamp,
    ) -> Result<PaymentRequest, SettlementError> {
        match self.repo.payment_request(&draft.id) {
            Ok(existing) => return Ok(existing),
            Err(SettlementError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        if draft.amount_fiat_minor == 0 {
            return Err(SettlementError::validation("payment request", &draft.id, "amount must be positive"));
        }
        if draft.expires_at <= now {
            return Err(SettlementError::validation("payment request", &draft.id, "already expired"));
        }
        let amount_token = self
            .quote(oracle, draft.amount_fiat_minor, &draft.currency, token)
            .await?;

        let request = PaymentRequest {
            id: draft.id,
            payer_id: draft.payer_id,
            payer_address: draft.payer_address,
            recipient_id: draft.recipient_id,
            recipient_address: draft.recipient_address,
            amount_fiat_minor: draft.amount_fiat_minor,
            currency: draft.currency,
            token: token.to_string(),
            amount_token,
            created_at: now,
            expires_at: draft.expires_at,
            status: PaymentRequestStatus::Created,
            settlement_tx: None,
            purchase: None,
        };
        self.repo.save_payment_request(&request)?;
        info!(request = %request.id, amount = amount_token.raw(), "payment request created");
        Ok(request)
    }

    /// A request can be paid if it exists, has not expired and is still
    /// `Created`.
    pub fn validate_payment_request(
        &self,
        id: &PaymentRequestId,
        now: Timestamp,
    ) -> Result<PaymentRequest, SettlementError> {
        let request = self.repo.payment_request(id)?;
        if request.status != PaymentRequestStatus::Created {
            return Err(SettlementError::invalid_state("payment request", id, request.status, "pay"));
        }
        if request.is_expired(now) {
            return Err(SettlementError::validation("payment request", id, "payment request has expired"));
        }
        Ok(request)
    }

    /// Submit the payer-signed transfer and complete the request.
    ///
    /// Both parties earn the participation bonus; a scoring failure is
    /// reported in the result and never undoes the payment.
    pub async fn settle_payment(
        &self,
        id: &PaymentRequestId,
        signed_tx: &SignedTransaction,
        now: Timestamp,
    ) -> Result<PaymentSettlement, SettlementError> {
        let current = self.repo.payment_request(id)?;
        // Requests funded through BNPL are settled by the purchase flow.
        if current.purchase.is_some() {
            return Err(SettlementError::invalid_state(
                "payment request",
                id,
                current.status,
                "settle a BNPL purchase of",
            ));
        }
        if let (PaymentRequestStatus::Completed, Some(tx_hash)) =
            (current.status, current.settlement_tx.clone())
        {
            return Ok(PaymentSettlement {
                request_id: id.clone(),
                tx_hash,
                risk: Vec::new(),
                replayed: true,
            });
        }

        let mut request = self.validate_payment_request(id, now)?;
        let tx_hash = self.ledger.submit(signed_tx).await?;
        request.status = PaymentRequestStatus::Completed;
        request.settlement_tx = Some(tx_hash.clone());
        self.repo.save_payment_request(&request)?;
        info!(request = %id, tx = %tx_hash, "payment settled");

        let risk = vec![
            self.score(&request.payer_id, RiskEvent::PaymentParticipation, now),
            self.score(&request.recipient_id, RiskEvent::PaymentParticipation, now),
        ];
        Ok(PaymentSettlement {
            request_id: id.clone(),
            tx_hash,
            risk,
            replayed: false,
        })
    }
}
