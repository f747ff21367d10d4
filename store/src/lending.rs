//! Storage traits for the lending-side entities: loans, BNPL-access
//! applications, collectives and payment requests.

use crate::StoreError;
use optimus_types::{ApplicationId, DaoId, LoanId, PaymentRequestId};

/// Loans are never deleted, only transitioned to a terminal state.
pub trait LoanStore {
    fn put_loan(&self, id: &LoanId, data: &[u8]) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] if the loan does not exist.
    fn get_loan(&self, id: &LoanId) -> Result<Vec<u8>, StoreError>;

    fn iter_loans(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}

pub trait ApplicationStore {
    fn put_application(&self, id: &ApplicationId, data: &[u8]) -> Result<(), StoreError>;

    fn get_application(&self, id: &ApplicationId) -> Result<Vec<u8>, StoreError>;

    fn iter_applications(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}

pub trait CollectiveStore {
    fn put_collective(&self, id: &DaoId, data: &[u8]) -> Result<(), StoreError>;

    fn get_collective(&self, id: &DaoId) -> Result<Vec<u8>, StoreError>;
}

pub trait PaymentRequestStore {
    fn put_payment_request(&self, id: &PaymentRequestId, data: &[u8])
        -> Result<(), StoreError>;

    fn get_payment_request(&self, id: &PaymentRequestId) -> Result<Vec<u8>, StoreError>;
}
