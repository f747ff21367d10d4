//! Installment plan storage trait.

use crate::StoreError;
use optimus_types::SubjectRef;

/// Installments keyed by `(parent, sequence_number)`.
pub trait InstallmentStore {
    fn put_installment(
        &self,
        parent: &SubjectRef,
        sequence: u32,
        data: &[u8],
    ) -> Result<(), StoreError>;

    /// The full plan for a parent, ordered by sequence number. Empty if none.
    fn get_installments(&self, parent: &SubjectRef) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Every parent that has a plan.
    fn iter_installment_parents(&self) -> Result<Vec<SubjectRef>, StoreError>;
}
