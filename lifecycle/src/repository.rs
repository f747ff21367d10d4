//! Typed access to the byte-level stores.

use crate::error::SettlementError;
use crate::records::{BnplApplication, Collective, Loan, PaymentRequest, PayoutReceipt};
use optimus_schedule::Installment;
use optimus_store::{codec, SettlementStore, StoreError, WriteBatch};
use optimus_types::{
    ApplicationId, DaoId, DistributionId, LoanId, PaymentRequestId, SubjectRef, WalletAddress,
};

pub struct Repository<'a, S> {
    store: &'a S,
}

fn not_found(entity: &'static str, id: impl ToString) -> impl FnOnce(StoreError) -> SettlementError {
    let id = id.to_string();
    move |e| match e {
        StoreError::NotFound(_) => SettlementError::NotFound { entity, id },
        other => other.into(),
    }
}

impl<'a, S: SettlementStore> Repository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn write_batch(&self) -> Result<Box<dyn WriteBatch + 'a>, SettlementError> {
        Ok(self.store.write_batch()?)
    }

    // ── Collectives ──

    pub fn collective(&self, id: &DaoId) -> Result<Collective, SettlementError> {
        let bytes = self
            .store
            .get_collective(id)
            .map_err(not_found("collective", id))?;
        Ok(codec::decode(&bytes)?)
    }

    pub fn save_collective(&self, collective: &Collective) -> Result<(), SettlementError> {
        self.store
            .put_collective(&collective.dao_id, &codec::encode(collective)?)?;
        Ok(())
    }

    // ── Loans ──

    pub fn loan(&self, id: &LoanId) -> Result<Loan, SettlementError> {
        let bytes = self.store.get_loan(id).map_err(not_found("loan", id))?;
        Ok(codec::decode(&bytes)?)
    }

    pub fn save_loan(&self, loan: &Loan) -> Result<(), SettlementError> {
        self.store.put_loan(&loan.id, &codec::encode(loan)?)?;
        Ok(())
    }

    pub fn loans_of(&self, dao_id: &DaoId) -> Result<Vec<Loan>, SettlementError> {
        let loans: Vec<Loan> = codec::decode_all(&self.store.iter_loans()?)?;
        Ok(loans.into_iter().filter(|l| &l.dao_id == dao_id).collect())
    }

    // ── Applications ──

    pub fn application(&self, id: &ApplicationId) -> Result<BnplApplication, SettlementError> {
        let bytes = self
            .store
            .get_application(id)
            .map_err(not_found("application", id))?;
        Ok(codec::decode(&bytes)?)
    }

    pub fn find_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<BnplApplication>, SettlementError> {
        match self.store.get_application(id) {
            Ok(bytes) => Ok(Some(codec::decode(&bytes)?)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_application(&self, app: &BnplApplication) -> Result<(), SettlementError> {
        self.store
            .put_application(&app.id, &codec::encode(app)?)?;
        Ok(())
    }

    pub fn applications_of(&self, dao_id: &DaoId) -> Result<Vec<BnplApplication>, SettlementError> {
        let apps: Vec<BnplApplication> = codec::decode_all(&self.store.iter_applications()?)?;
        Ok(apps.into_iter().filter(|a| &a.dao_id == dao_id).collect())
    }

    // ── Payment requests ──

    pub fn payment_request(&self, id: &PaymentRequestId) -> Result<PaymentRequest, SettlementError> {
        let bytes = self
            .store
            .get_payment_request(id)
            .map_err(not_found("payment request", id))?;
        Ok(codec::decode(&bytes)?)
    }

    pub fn save_payment_request(&self, request: &PaymentRequest) -> Result<(), SettlementError> {
        self.store
            .put_payment_request(&request.id, &codec::encode(request)?)?;
        Ok(())
    }

    // ── Installments ──

    /// The plan for `parent`, ordered by sequence. Empty if none exists.
    pub fn installments(&self, parent: &SubjectRef) -> Result<Vec<Installment>, SettlementError> {
        Ok(codec::decode_all(&self.store.get_installments(parent)?)?)
    }

    pub fn save_installment(&self, installment: &Installment) -> Result<(), SettlementError> {
        self.store.put_installment(
            &installment.parent,
            installment.sequence,
            &codec::encode(installment)?,
        )?;
        Ok(())
    }

    pub fn installment_parents(&self) -> Result<Vec<SubjectRef>, SettlementError> {
        Ok(self.store.iter_installment_parents()?)
    }

    // ── Payout receipts ──

    pub fn payout(
        &self,
        distribution: &DistributionId,
        party: &WalletAddress,
    ) -> Result<Option<PayoutReceipt>, SettlementError> {
        match self.store.get_payout(distribution, party)? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_payout(&self, receipt: &PayoutReceipt) -> Result<(), SettlementError> {
        self.store.put_payout(
            &receipt.distribution_id,
            &receipt.party,
            &codec::encode(receipt)?,
        )?;
        Ok(())
    }
}

/// Stage whole records into a batch.
pub(crate) trait StageRecords {
    fn stage_loan(&mut self, loan: &Loan) -> Result<(), SettlementError>;
    fn stage_application(&mut self, app: &BnplApplication) -> Result<(), SettlementError>;
    fn stage_payment_request(&mut self, request: &PaymentRequest) -> Result<(), SettlementError>;
    fn stage_installments(&mut self, plan: &[Installment]) -> Result<(), SettlementError>;
}

impl<B: WriteBatch + ?Sized> StageRecords for B {
    fn stage_loan(&mut self, loan: &Loan) -> Result<(), SettlementError> {
        self.put_loan(&loan.id, &codec::encode(loan)?)?;
        Ok(())
    }

    fn stage_application(&mut self, app: &BnplApplication) -> Result<(), SettlementError> {
        self.put_application(&app.id, &codec::encode(app)?)?;
        Ok(())
    }

    fn stage_payment_request(&mut self, request: &PaymentRequest) -> Result<(), SettlementError> {
        self.put_payment_request(&request.id, &codec::encode(request)?)?;
        Ok(())
    }

    fn stage_installments(&mut self, plan: &[Installment]) -> Result<(), SettlementError> {
        for inst in plan {
            self.put_installment(&inst.parent, inst.sequence, &codec::encode(inst)?)?;
        }
        Ok(())
    }
}
