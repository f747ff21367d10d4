//! Nullable ledger — scripted chain client for testing.

use optimus_chain::{CallOutcome, ChainError, ContractCall, LedgerClient, MemberWeight};
use optimus_types::{SignedTransaction, TokenAmount, TxHash, WalletAddress};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A transfer the ledger executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub from: WalletAddress,
    pub to: WalletAddress,
    pub amount: TokenAmount,
    pub tx_hash: TxHash,
}

#[derive(Default)]
struct LedgerState {
    next_tx: u64,
    balances: HashMap<WalletAddress, TokenAmount>,
    members: HashMap<WalletAddress, Vec<MemberWeight>>,
    resources: HashMap<WalletAddress, Vec<String>>,
    treasury_operations: HashMap<WalletAddress, SignedTransaction>,
    submitted: Vec<SignedTransaction>,
    transfers: Vec<RecordedTransfer>,
    calls: Vec<ContractCall>,
    failing_recipients: HashSet<WalletAddress>,
    failing_functions: HashSet<String>,
    failing_submits: usize,
    failing_txs: HashSet<Vec<u8>>,
    resources_unavailable: bool,
}

impl LedgerState {
    fn mint_hash(&mut self) -> TxHash {
        self.next_tx += 1;
        TxHash::new(format!("0x{:064x}", self.next_tx))
    }
}

/// An in-memory ledger.
///
/// Balances move on `transfer`; `submit` accepts any non-empty transaction
/// and mints a sequential hash. Contract calls answer `get_members` and
/// `get_treasury_operation` from scripted data; every other function
/// succeeds with a fresh transaction hash.
pub struct NullLedger {
    state: Mutex<LedgerState>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub fn set_balance(&self, address: impl Into<WalletAddress>, amount: u64) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(address.into(), TokenAmount::new(amount));
    }

    /// Members and voting power returned by `get_members` on `contract`.
    pub fn set_members(&self, contract: impl Into<WalletAddress>, members: &[(&str, u64)]) {
        let members = members
            .iter()
            .map(|(address, power)| MemberWeight {
                address: WalletAddress::new(*address),
                voting_power: *power,
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .members
            .insert(contract.into(), members);
    }

    pub fn set_resources(&self, address: impl Into<WalletAddress>, resources: &[&str]) {
        self.state.lock().unwrap().resources.insert(
            address.into(),
            resources.iter().map(|r| r.to_string()).collect(),
        );
    }

    pub fn set_treasury_operation(
        &self,
        contract: impl Into<WalletAddress>,
        operation: SignedTransaction,
    ) {
        self.state
            .lock()
            .unwrap()
            .treasury_operations
            .insert(contract.into(), operation);
    }

    /// Every transfer to `address` is rejected.
    pub fn fail_transfers_to(&self, address: impl Into<WalletAddress>) {
        self.state
            .lock()
            .unwrap()
            .failing_recipients
            .insert(address.into());
    }

    /// Every call of `function` fails.
    pub fn fail_calls_to(&self, function: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_functions
            .insert(function.to_string());
    }

    pub fn clear_call_failures(&self) {
        self.state.lock().unwrap().failing_functions.clear();
    }

    /// The next `count` submissions fail as unreachable.
    pub fn fail_next_submits(&self, count: usize) {
        self.state.lock().unwrap().failing_submits = count;
    }

    /// Submissions of exactly `tx` fail as unreachable until cleared.
    pub fn fail_submits_of(&self, tx: &SignedTransaction) {
        self.state
            .lock()
            .unwrap()
            .failing_txs
            .insert(tx.as_bytes().to_vec());
    }

    pub fn clear_submit_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing_submits = 0;
        state.failing_txs.clear();
    }

    pub fn make_resources_unavailable(&self) {
        self.state.lock().unwrap().resources_unavailable = true;
    }

    pub fn balance(&self, address: &WalletAddress) -> TokenAmount {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.state.lock().unwrap().transfers.clone()
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn calls(&self) -> Vec<ContractCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, function: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.function == function)
            .count()
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerClient for NullLedger {
    async fn submit(&self, signed_tx: &SignedTransaction) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_submits > 0 {
            state.failing_submits -= 1;
            return Err(ChainError::Unavailable("scripted submit failure".into()));
        }
        if state.failing_txs.contains(signed_tx.as_bytes()) {
            return Err(ChainError::Unavailable("scripted submit failure".into()));
        }
        if signed_tx.is_empty() {
            return Err(ChainError::Rejected("empty transaction".into()));
        }
        state.submitted.push(signed_tx.clone());
        Ok(state.mint_hash())
    }

    async fn call(&self, call: &ContractCall) -> Result<CallOutcome, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());
        if state.failing_functions.contains(&call.function) {
            return Err(ChainError::CallFailed {
                contract: call.contract.to_string(),
                function: call.function.clone(),
                reason: "scripted call failure".into(),
            });
        }
        match call.function.as_str() {
            "get_members" => {
                let members = state
                    .members
                    .get(&call.contract)
                    .cloned()
                    .unwrap_or_default();
                let members: Vec<Value> = members
                    .iter()
                    .map(|m| json!({"address": m.address.as_str(), "voting_power": m.voting_power}))
                    .collect();
                Ok(CallOutcome {
                    tx_hash: None,
                    value: json!({ "members": members }),
                })
            }
            "get_treasury_operation" => {
                let value = match state.treasury_operations.get(&call.contract) {
                    Some(op) => json!({ "treasury_operation": op.to_hex() }),
                    None => json!({}),
                };
                Ok(CallOutcome {
                    tx_hash: None,
                    value,
                })
            }
            _ => Ok(CallOutcome {
                tx_hash: Some(state.mint_hash()),
                value: Value::Null,
            }),
        }
    }

    async fn balance_of(&self, address: &WalletAddress) -> Result<TokenAmount, ChainError> {
        Ok(self.balance(address))
    }

    async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_recipients.contains(to) {
            return Err(ChainError::Rejected(format!("transfer to {to} rejected")));
        }
        let available = state.balances.get(from).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| ChainError::Rejected(format!("insufficient funds in {from}")))?;
        state.balances.insert(from.clone(), remaining);
        let credited = state.balances.get(to).copied().unwrap_or_default() + amount;
        state.balances.insert(to.clone(), credited);

        let tx_hash = state.mint_hash();
        state.transfers.push(RecordedTransfer {
            from: from.clone(),
            to: to.clone(),
            amount,
            tx_hash: tx_hash.clone(),
        });
        Ok(tx_hash)
    }

    async fn account_resources(&self, address: &WalletAddress) -> Result<Vec<String>, ChainError> {
        let state = self.state.lock().unwrap();
        if state.resources_unavailable {
            return Err(ChainError::Unavailable("resource indexer offline".into()));
        }
        Ok(state.resources.get(address).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transfers_move_balances() {
        let ledger = NullLedger::new();
        ledger.set_balance("0xdao", 100);
        let tx = ledger
            .transfer(
                &WalletAddress::new("0xdao"),
                &WalletAddress::new("0xbob"),
                TokenAmount::new(40),
            )
            .await
            .unwrap();
        assert!(!tx.is_empty());
        assert_eq!(ledger.balance(&WalletAddress::new("0xdao")), TokenAmount::new(60));
        assert_eq!(ledger.balance(&WalletAddress::new("0xbob")), TokenAmount::new(40));
    }

    #[tokio::test]
    async fn overdraft_is_rejected() {
        let ledger = NullLedger::new();
        let err = ledger
            .transfer(
                &WalletAddress::new("0xdao"),
                &WalletAddress::new("0xbob"),
                TokenAmount::new(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Rejected(_)));
        assert!(ledger.transfers().is_empty());
    }

    #[tokio::test]
    async fn members_round_trip_through_json() {
        let ledger = NullLedger::new();
        ledger.set_members("0xdao", &[("0xa", 3), ("0xb", 1)]);
        let outcome = ledger
            .call(&ContractCall::new(WalletAddress::new("0xdao"), "get_members", vec![]))
            .await
            .unwrap();
        let members = MemberWeight::parse_members(&outcome.value).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].voting_power, 3);
    }
}
