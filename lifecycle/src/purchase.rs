//! BNPL purchases.
//!
//! The payer hands over one pre-signed transfer per installment. Every one is
//! checked by the transaction validator before anything reaches the ledger;
//! then the DAO's treasury operation pays the merchant and the first
//! installment is collected at once. Later installments are collected when
//! they fall due.

use crate::engine::{RiskUpdate, SettlementEngine};
use crate::error::SettlementError;
use crate::records::{
    ApplicationStatus, BnplApplication, PaymentRequest, PaymentRequestStatus, PurchaseProgress,
};
use crate::repository::StageRecords;
use optimus_chain::{LedgerClient, TransactionValidator};
use optimus_risk::RiskEvent;
use optimus_schedule::{build_plan, Installment, LateFeePolicy};
use optimus_store::SettlementStore;
use optimus_types::{
    DaoId, PaymentRequestId, SignedTransaction, SubjectRef, Timestamp, TxHash, WalletAddress,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub request_id: PaymentRequestId,
    pub dao_id: DaoId,
    pub plan: Vec<Installment>,
    pub merchant_tx: TxHash,
    pub first_installment_tx: TxHash,
    pub risk: Option<RiskUpdate>,
    pub replayed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionOutcome {
    pub installment: Installment,
    pub tx_hash: TxHash,
    pub was_late: bool,
    pub risk: Option<RiskUpdate>,
    pub replayed: bool,
}

/// A settlement engine that can also check pre-signed transactions.
pub struct BnplPurchaseEngine<'a, S, L, V> {
    engine: SettlementEngine<'a, S, L>,
    validator: &'a V,
}

impl<'a, S, L> SettlementEngine<'a, S, L>
where
    S: SettlementStore,
    L: LedgerClient,
{
    pub fn with_validator<V: TransactionValidator>(self, validator: &'a V) -> BnplPurchaseEngine<'a, S, L, V> {
        BnplPurchaseEngine {
            engine: self,
            validator,
        }
    }
}

fn installment_key(parent: &SubjectRef, sequence: u32) -> String {
    format!("{parent}#{sequence}")
}

impl<'a, S, L, V> BnplPurchaseEngine<'a, S, L, V>
where
    S: SettlementStore,
    L: LedgerClient,
    V: TransactionValidator,
{
    pub fn engine(&self) -> &SettlementEngine<'a, S, L> {
        &self.engine
    }

    /// Buy through `dao_id`'s BNPL treasury.
    ///
    /// Safe to call again after a partial failure: the stored plan, the
    /// merchant payment and the first installment are each reused once they
    /// exist.
    pub async fn purchase(
        &self,
        request_id: &PaymentRequestId,
        dao_id: &DaoId,
        signed_installments: &[SignedTransaction],
        now: Timestamp,
    ) -> Result<PurchaseOutcome, SettlementError> {
        let repo = &self.engine.repo;
        let parent = SubjectRef::PaymentRequest(request_id.clone());
        let mut request = repo.payment_request(request_id)?;

        if request.status == PaymentRequestStatus::Completed {
            return self.replayed_purchase(&request, &parent);
        }
        if request.purchase.is_none() && request.is_expired(now) {
            return Err(SettlementError::validation("payment request", request_id, "payment request has expired"));
        }

        let collective = self.engine.active_collective(dao_id, "purchase through")?;
        let terms = collective.bnpl_terms.ok_or_else(|| {
            SettlementError::validation("collective", dao_id, "DAO does not offer BNPL terms")
        })?;
        let application_id = BnplApplication::id_for(&request.payer_id, dao_id);
        let application = repo.application(&application_id)?;
        if application.status != ApplicationStatus::Approved {
            return Err(SettlementError::invalid_state(
                "application",
                &application_id,
                application.status,
                "purchase with",
            ));
        }
        let treasury_op = application.treasury_operation.ok_or_else(|| {
            SettlementError::validation("application", &application_id, "no treasury operation attached")
        })?;
        let treasury = collective.treasury_address;

        let mut plan = repo.installments(&parent)?;
        if plan.is_empty() {
            let mut fresh = build_plan(&parent, request.amount_token, terms.payment_terms(), now)?;
            self.check_signed_installments(&request, &treasury, &fresh, signed_installments)?;
            for (inst, tx) in fresh.iter_mut().zip(signed_installments) {
                inst.signed_tx = Some(tx.clone());
            }
            request.purchase = Some(PurchaseProgress {
                dao_id: dao_id.clone(),
                application_id,
                merchant_tx: None,
            });
            let mut batch = repo.write_batch()?;
            batch.stage_installments(&fresh)?;
            batch.stage_payment_request(&request)?;
            batch.commit()?;
            plan = fresh;
        } else {
            debug!(request = %request_id, "resuming purchase with stored plan");
        }

        let merchant_tx = match request.purchase.as_ref().and_then(|p| p.merchant_tx.clone()) {
            Some(tx) => tx,
            None => {
                let tx = self.engine.ledger.submit(&treasury_op).await?;
                let progress = request.purchase.get_or_insert_with(|| PurchaseProgress {
                    dao_id: dao_id.clone(),
                    application_id: BnplApplication::id_for(&request.payer_id, dao_id),
                    merchant_tx: None,
                });
                progress.merchant_tx = Some(tx.clone());
                repo.save_payment_request(&request)?;
                info!(request = %request_id, dao = %dao_id, tx = %tx, "merchant paid from treasury");
                tx
            }
        };

        let first = plan.first_mut().ok_or_else(|| {
            SettlementError::validation("payment request", request_id, "installment plan is empty")
        })?;
        let mut risk = None;
        let first_installment_tx = match first.payment_tx.clone().filter(|_| first.is_paid()) {
            Some(tx) => tx,
            None => {
                let signed = first.signed_tx.clone().ok_or_else(|| {
                    SettlementError::validation(
                        "installment",
                        installment_key(&parent, first.sequence),
                        "no pre-signed transaction",
                    )
                })?;
                let tx = self.engine.ledger.submit(&signed).await?;
                first.mark_paid(tx.clone(), now)?;
                repo.save_installment(first)?;
                risk = Some(self.engine.score(&request.payer_id, RiskEvent::OnTimeInstallment, now));
                tx
            }
        };

        request.status = PaymentRequestStatus::Completed;
        request.settlement_tx = Some(first_installment_tx.clone());
        repo.save_payment_request(&request)?;
        info!(
            request = %request_id,
            dao = %dao_id,
            installments = plan.len(),
            "bnpl purchase completed"
        );

        Ok(PurchaseOutcome {
            request_id: request_id.clone(),
            dao_id: dao_id.clone(),
            plan,
            merchant_tx,
            first_installment_tx,
            risk,
            replayed: false,
        })
    }

    fn replayed_purchase(
        &self,
        request: &PaymentRequest,
        parent: &SubjectRef,
    ) -> Result<PurchaseOutcome, SettlementError> {
        let Some(progress) = &request.purchase else {
            return Err(SettlementError::invalid_state(
                "payment request",
                &request.id,
                request.status,
                "purchase through BNPL",
            ));
        };
        let incomplete = || {
            SettlementError::invalid_state(
                "payment request",
                &request.id,
                request.status,
                "replay an unfinished purchase of",
            )
        };
        let merchant_tx = progress.merchant_tx.clone().ok_or_else(incomplete)?;
        let first_installment_tx = request.settlement_tx.clone().ok_or_else(incomplete)?;
        Ok(PurchaseOutcome {
            request_id: request.id.clone(),
            dao_id: progress.dao_id.clone(),
            plan: self.engine.repo.installments(parent)?,
            merchant_tx,
            first_installment_tx,
            risk: None,
            replayed: true,
        })
    }

    /// Every installment needs exactly one transaction moving its scheduled
    /// amount from the payer to the treasury.
    fn check_signed_installments(
        &self,
        request: &PaymentRequest,
        treasury: &WalletAddress,
        plan: &[Installment],
        signed: &[SignedTransaction],
    ) -> Result<(), SettlementError> {
        if signed.len() != plan.len() {
            return Err(SettlementError::validation(
                "payment request",
                &request.id,
                format!(
                    "expected {} pre-signed installments, got {}",
                    plan.len(),
                    signed.len()
                ),
            ));
        }
        for (index, (inst, tx)) in plan.iter().zip(signed).enumerate() {
            let report = self
                .validator
                .validate(tx, &request.payer_address, treasury, inst.amount)?;
            if !report.matches(&request.payer_address, treasury, inst.amount) {
                let detail = report
                    .error_message
                    .unwrap_or_else(|| "sender, recipient or amount mismatch".to_string());
                return Err(SettlementError::validation(
                    "payment request",
                    &request.id,
                    format!("installment transaction {index} rejected: {detail}"),
                ));
            }
        }
        Ok(())
    }

    /// Submit the stored pre-signed transaction for a due installment.
    ///
    /// An overdue installment is assessed here if no sweep has reached it yet,
    /// so it is scored late and carries its fee. The pre-signed transfer moves
    /// the scheduled amount only; the fee stays recorded on the installment
    /// and the payer's balance is checked against the transfer alone.
    pub async fn collect_installment(
        &self,
        request_id: &PaymentRequestId,
        sequence: u32,
        now: Timestamp,
    ) -> Result<CollectionOutcome, SettlementError> {
        let repo = &self.engine.repo;
        let parent = SubjectRef::PaymentRequest(request_id.clone());
        let key = installment_key(&parent, sequence);
        let request = repo.payment_request(request_id)?;
        let mut installment = repo
            .installments(&parent)?
            .into_iter()
            .find(|i| i.sequence == sequence)
            .ok_or_else(|| SettlementError::NotFound {
                entity: "installment",
                id: key.clone(),
            })?;

        if let Some(tx_hash) = installment.payment_tx.clone().filter(|_| installment.is_paid()) {
            return Ok(CollectionOutcome {
                installment,
                tx_hash,
                was_late: false,
                risk: None,
                replayed: true,
            });
        }
        if now < installment.due_at {
            return Err(SettlementError::invalid_state("installment", &key, installment.status, "collect early"));
        }

        let policy = LateFeePolicy::new(self.engine.params.late_fee_bps);
        if policy.assess(&mut installment, now).is_some() {
            repo.save_installment(&installment)?;
        }

        let transfer = installment.amount;
        let balance = self.engine.ledger.balance_of(&request.payer_address).await?;
        if balance < transfer {
            return Err(SettlementError::validation(
                "installment",
                &key,
                format!("payer balance {} below installment amount {}", balance.raw(), transfer.raw()),
            ));
        }
        let signed = installment
            .signed_tx
            .clone()
            .ok_or_else(|| SettlementError::validation("installment", &key, "no pre-signed transaction"))?;

        let tx_hash = self.engine.ledger.submit(&signed).await?;
        let was_late = installment.mark_paid(tx_hash.clone(), now)?;
        repo.save_installment(&installment)?;
        info!(installment = %key, tx = %tx_hash, was_late, "installment collected");

        let event = if was_late {
            RiskEvent::LateInstallment
        } else {
            RiskEvent::OnTimeInstallment
        };
        let risk = Some(self.engine.score(&request.payer_id, event, now));
        Ok(CollectionOutcome {
            installment,
            tx_hash,
            was_late,
            risk,
            replayed: false,
        })
    }
}
