//! Ledger client contract.

use crate::ChainError;
use optimus_types::{SignedTransaction, TokenAmount, TxHash, WalletAddress};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// A call to a function of an on-chain contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: WalletAddress,
    pub function: String,
    pub args: Vec<Value>,
}

impl ContractCall {
    pub fn new(contract: WalletAddress, function: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            contract,
            function: function.into(),
            args,
        }
    }
}

/// Result of a contract call. Entry functions produce a transaction hash;
/// view functions only a value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub tx_hash: Option<TxHash>,
    pub value: Value,
}

impl CallOutcome {
    /// The transaction hash, or an error naming the call that failed to produce one.
    pub fn require_tx_hash(self, call: &ContractCall) -> Result<TxHash, ChainError> {
        self.tx_hash
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ChainError::CallFailed {
                contract: call.contract.to_string(),
                function: call.function.clone(),
                reason: "no transaction hash returned".to_string(),
            })
    }
}

/// A DAO member and their voting power as reported by the DAO contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberWeight {
    pub address: WalletAddress,
    #[serde(default)]
    pub voting_power: u64,
}

impl MemberWeight {
    /// Parse the `get_members` view result: `{"members": [{"address", "voting_power"}]}`.
    pub fn parse_members(value: &Value) -> Result<Vec<Self>, ChainError> {
        match value.get("members") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(members) => serde_json::from_value(members.clone())
                .map_err(|e| ChainError::InvalidResponse(format!("get_members: {e}"))),
        }
    }
}

/// The blockchain client.
///
/// Implementations submit to a real network; every method may be invoked more
/// than once for the same logical step.
pub trait LedgerClient: Send + Sync {
    /// Submit a transaction that was signed outside this system.
    fn submit(
        &self,
        signed_tx: &SignedTransaction,
    ) -> impl Future<Output = Result<TxHash, ChainError>> + Send;

    /// Call a contract function (entry or view).
    fn call(
        &self,
        call: &ContractCall,
    ) -> impl Future<Output = Result<CallOutcome, ChainError>> + Send;

    /// Token balance held by an address.
    fn balance_of(
        &self,
        address: &WalletAddress,
    ) -> impl Future<Output = Result<TokenAmount, ChainError>> + Send;

    /// Transfer from an account the operator signs for (a DAO treasury).
    fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> impl Future<Output = Result<TxHash, ChainError>> + Send;

    /// Resource type tags held by an account, e.g. `0xdao::dao::MemberResource`.
    fn account_resources(
        &self,
        address: &WalletAddress,
    ) -> impl Future<Output = Result<Vec<String>, ChainError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_member_list() {
        let value = json!({"members": [
            {"address": "0xA1", "voting_power": 3},
            {"address": "0xb2"}
        ]});
        let members = MemberWeight::parse_members(&value).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].address, WalletAddress::new("0xa1"));
        assert_eq!(members[0].voting_power, 3);
        assert_eq!(members[1].voting_power, 0);
    }

    #[test]
    fn missing_member_list_is_empty() {
        assert!(MemberWeight::parse_members(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn malformed_member_list_is_rejected() {
        let err = MemberWeight::parse_members(&json!({"members": "nope"})).unwrap_err();
        assert!(matches!(err, ChainError::InvalidResponse(_)));
    }

    #[test]
    fn entry_call_without_hash_is_an_error() {
        let call = ContractCall::new(WalletAddress::new("0xdao"), "approve_loan", vec![]);
        let err = CallOutcome::default().require_tx_hash(&call).unwrap_err();
        assert!(matches!(err, ChainError::CallFailed { .. }));
    }
}
