//! Nullable transaction validator — answers from registered transactions.

use optimus_chain::{ChainError, TransactionValidator, ValidationReport};
use optimus_types::{SignedTransaction, TokenAmount, WalletAddress};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Reports whatever was registered for a transaction's bytes. Unknown
/// transactions are reported invalid.
pub struct NullValidator {
    known: Mutex<HashMap<Vec<u8>, ValidationReport>>,
    unavailable: AtomicBool,
}

impl NullValidator {
    pub fn new() -> Self {
        Self {
            known: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Register a well-formed, correctly signed transfer and return its bytes.
    pub fn sign(
        &self,
        sender: &WalletAddress,
        recipient: &WalletAddress,
        amount: TokenAmount,
    ) -> SignedTransaction {
        let bytes = format!("transfer:{sender}:{recipient}:{}", amount.raw()).into_bytes();
        self.register(
            &SignedTransaction::new(bytes.clone()),
            ValidationReport {
                valid: true,
                signature_valid: true,
                sender: sender.clone(),
                recipient: recipient.clone(),
                amount,
                error_message: None,
            },
        );
        SignedTransaction::new(bytes)
    }

    pub fn register(&self, tx: &SignedTransaction, report: ValidationReport) {
        self.known
            .lock()
            .unwrap()
            .insert(tx.as_bytes().to_vec(), report);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Default for NullValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionValidator for NullValidator {
    fn validate(
        &self,
        tx: &SignedTransaction,
        expected_sender: &WalletAddress,
        expected_recipient: &WalletAddress,
        expected_amount: TokenAmount,
    ) -> Result<ValidationReport, ChainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ChainError::Validator("validator offline".into()));
        }
        Ok(self
            .known
            .lock()
            .unwrap()
            .get(tx.as_bytes())
            .cloned()
            .unwrap_or_else(|| ValidationReport {
                valid: false,
                signature_valid: false,
                sender: expected_sender.clone(),
                recipient: expected_recipient.clone(),
                amount: expected_amount,
                error_message: Some("unknown transaction".into()),
            }))
    }
}
