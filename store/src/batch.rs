//! Scoped write batches.
//!
//! ```ignore
//! let mut batch = store.write_batch()?;
//! batch.put_loan(&loan.id, &codec::encode(&loan)?)?;
//! batch.put_installment(&parent, 1, &codec::encode(&first)?)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], none of the
//! staged writes become visible.

use crate::StoreError;
use optimus_types::{ApplicationId, DaoId, LoanId, PaymentRequestId, ProposalId, SubjectRef};

pub trait WriteBatch {
    fn put_loan(&mut self, id: &LoanId, data: &[u8]) -> Result<(), StoreError>;

    fn put_application(&mut self, id: &ApplicationId, data: &[u8]) -> Result<(), StoreError>;

    fn put_collective(&mut self, id: &DaoId, data: &[u8]) -> Result<(), StoreError>;

    fn put_payment_request(
        &mut self,
        id: &PaymentRequestId,
        data: &[u8],
    ) -> Result<(), StoreError>;

    fn put_proposal(&mut self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError>;

    fn put_subject_proposal(
        &mut self,
        subject: &SubjectRef,
        proposal: &ProposalId,
    ) -> Result<(), StoreError>;

    fn put_installment(
        &mut self,
        parent: &SubjectRef,
        sequence: u32,
        data: &[u8],
    ) -> Result<(), StoreError>;

    /// Apply every staged write atomically.
    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

pub trait BatchStore {
    fn write_batch(&self) -> Result<Box<dyn WriteBatch + '_>, StoreError>;
}
