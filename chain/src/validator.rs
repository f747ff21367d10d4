//! Payment-protocol transaction validator contract.

use crate::ChainError;
use optimus_types::{SignedTransaction, TokenAmount, WalletAddress};
use serde::{Deserialize, Serialize};

/// What the validator found inside a pre-signed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub signature_valid: bool,
    pub sender: WalletAddress,
    pub recipient: WalletAddress,
    pub amount: TokenAmount,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ValidationReport {
    /// Whether the transaction is valid, correctly signed, and moves exactly
    /// `amount` from `sender` to `recipient`.
    pub fn matches(
        &self,
        sender: &WalletAddress,
        recipient: &WalletAddress,
        amount: TokenAmount,
    ) -> bool {
        self.valid
            && self.signature_valid
            && &self.sender == sender
            && &self.recipient == recipient
            && self.amount == amount
    }
}

/// Validates pre-signed transactions without submitting them.
pub trait TransactionValidator: Send + Sync {
    fn validate(
        &self,
        tx: &SignedTransaction,
        expected_sender: &WalletAddress,
        expected_recipient: &WalletAddress,
        expected_amount: TokenAmount,
    ) -> Result<ValidationReport, ChainError>;
}
