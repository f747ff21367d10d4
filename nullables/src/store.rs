//! Nullable store — thread-safe in-memory repository for testing.

use optimus_store::{
    ApplicationStore, BallotStore, BatchStore, CollectiveStore, InstallmentStore, LoanStore,
    PaymentRequestStore, PayoutStore, ProposalStore, RiskProfileStore, StoreError, WriteBatch,
};
use optimus_types::{
    ApplicationId, DaoId, DistributionId, LoanId, ParticipantId, PaymentRequestId, ProposalId,
    SubjectRef, WalletAddress,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// An in-memory implementation of every settlement store trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    loans: Mutex<BTreeMap<LoanId, Vec<u8>>>,
    applications: Mutex<BTreeMap<ApplicationId, Vec<u8>>>,
    collectives: Mutex<HashMap<DaoId, Vec<u8>>>,
    payment_requests: Mutex<HashMap<PaymentRequestId, Vec<u8>>>,
    proposals: Mutex<HashMap<ProposalId, Vec<u8>>>,
    subject_proposals: Mutex<HashMap<SubjectRef, ProposalId>>,
    ballots: Mutex<BTreeMap<(ProposalId, ParticipantId), Vec<u8>>>,
    installments: Mutex<BTreeMap<(SubjectRef, u32), Vec<u8>>>,
    profiles: Mutex<BTreeMap<ParticipantId, Vec<u8>>>,
    payouts: Mutex<HashMap<(DistributionId, WalletAddress), Vec<u8>>>,
    fail_next_commit: AtomicBool,
    fail_profile_writes: AtomicBool,
    commits: AtomicUsize,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            loans: Mutex::new(BTreeMap::new()),
            applications: Mutex::new(BTreeMap::new()),
            collectives: Mutex::new(HashMap::new()),
            payment_requests: Mutex::new(HashMap::new()),
            proposals: Mutex::new(HashMap::new()),
            subject_proposals: Mutex::new(HashMap::new()),
            ballots: Mutex::new(BTreeMap::new()),
            installments: Mutex::new(BTreeMap::new()),
            profiles: Mutex::new(BTreeMap::new()),
            payouts: Mutex::new(HashMap::new()),
            fail_next_commit: AtomicBool::new(false),
            fail_profile_writes: AtomicBool::new(false),
            commits: AtomicUsize::new(0),
        }
    }

    /// Make the next `WriteBatch::commit` fail without applying anything.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Make every risk profile write fail until cleared.
    pub fn fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn apply(&self, write: StagedWrite) {
        match write {
            StagedWrite::Loan(id, data) => {
                self.loans.lock().unwrap().insert(id, data);
            }
            StagedWrite::Application(id, data) => {
                self.applications.lock().unwrap().insert(id, data);
            }
            StagedWrite::Collective(id, data) => {
                self.collectives.lock().unwrap().insert(id, data);
            }
            StagedWrite::PaymentRequest(id, data) => {
                self.payment_requests.lock().unwrap().insert(id, data);
            }
            StagedWrite::Proposal(id, data) => {
                self.proposals.lock().unwrap().insert(id, data);
            }
            StagedWrite::SubjectProposal(subject, proposal) => {
                self.subject_proposals
                    .lock()
                    .unwrap()
                    .insert(subject, proposal);
            }
            StagedWrite::Installment(parent, sequence, data) => {
                self.installments
                    .lock()
                    .unwrap()
                    .insert((parent, sequence), data);
            }
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanStore for NullStore {
    fn put_loan(&self, id: &LoanId, data: &[u8]) -> Result<(), StoreError> {
        self.loans.lock().unwrap().insert(id.clone(), data.to_vec());
        Ok(())
    }

    fn get_loan(&self, id: &LoanId) -> Result<Vec<u8>, StoreError> {
        self.loans
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("loan {id}")))
    }

    fn iter_loans(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.loans.lock().unwrap().values().cloned().collect())
    }
}

impl ApplicationStore for NullStore {
    fn put_application(&self, id: &ApplicationId, data: &[u8]) -> Result<(), StoreError> {
        self.applications
            .lock()
            .unwrap()
            .insert(id.clone(), data.to_vec());
        Ok(())
    }

    fn get_application(&self, id: &ApplicationId) -> Result<Vec<u8>, StoreError> {
        self.applications
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("application {id}")))
    }

    fn iter_applications(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.applications.lock().unwrap().values().cloned().collect())
    }
}

impl CollectiveStore for NullStore {
    fn put_collective(&self, id: &DaoId, data: &[u8]) -> Result<(), StoreError> {
        self.collectives
            .lock()
            .unwrap()
            .insert(id.clone(), data.to_vec());
        Ok(())
    }

    fn get_collective(&self, id: &DaoId) -> Result<Vec<u8>, StoreError> {
        self.collectives
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("collective {id}")))
    }
}

impl PaymentRequestStore for NullStore {
    fn put_payment_request(
        &self,
        id: &PaymentRequestId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.payment_requests
            .lock()
            .unwrap()
            .insert(id.clone(), data.to_vec());
        Ok(())
    }

    fn get_payment_request(&self, id: &PaymentRequestId) -> Result<Vec<u8>, StoreError> {
        self.payment_requests
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("payment request {id}")))
    }
}

impl ProposalStore for NullStore {
    fn put_proposal(&self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError> {
        self.proposals
            .lock()
            .unwrap()
            .insert(id.clone(), data.to_vec());
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Vec<u8>, StoreError> {
        self.proposals
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))
    }

    fn get_subject_proposal(
        &self,
        subject: &SubjectRef,
    ) -> Result<Option<ProposalId>, StoreError> {
        Ok(self.subject_proposals.lock().unwrap().get(subject).cloned())
    }

    fn put_subject_proposal(
        &self,
        subject: &SubjectRef,
        proposal: &ProposalId,
    ) -> Result<(), StoreError> {
        self.subject_proposals
            .lock()
            .unwrap()
            .insert(subject.clone(), proposal.clone());
        Ok(())
    }
}

impl BallotStore for NullStore {
    fn put_ballot(
        &self,
        proposal: &ProposalId,
        voter: &ParticipantId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.ballots
            .lock()
            .unwrap()
            .insert((proposal.clone(), voter.clone()), data.to_vec());
        Ok(())
    }

    fn get_ballots(&self, proposal: &ProposalId) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self
            .ballots
            .lock()
            .unwrap()
            .iter()
            .filter(|((p, _), _)| p == proposal)
            .map(|(_, data)| data.clone())
            .collect())
    }
}

impl InstallmentStore for NullStore {
    fn put_installment(
        &self,
        parent: &SubjectRef,
        sequence: u32,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.installments
            .lock()
            .unwrap()
            .insert((parent.clone(), sequence), data.to_vec());
        Ok(())
    }

    fn get_installments(&self, parent: &SubjectRef) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self
            .installments
            .lock()
            .unwrap()
            .iter()
            .filter(|((p, _), _)| p == parent)
            .map(|(_, data)| data.clone())
            .collect())
    }

    fn iter_installment_parents(&self) -> Result<Vec<SubjectRef>, StoreError> {
        let mut parents: Vec<SubjectRef> = self
            .installments
            .lock()
            .unwrap()
            .keys()
            .map(|(p, _)| p.clone())
            .collect();
        parents.dedup();
        Ok(parents)
    }
}

impl RiskProfileStore for NullStore {
    fn put_profile(&self, participant: &ParticipantId, data: &[u8]) -> Result<(), StoreError> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("risk profile table unavailable".into()));
        }
        self.profiles
            .lock()
            .unwrap()
            .insert(participant.clone(), data.to_vec());
        Ok(())
    }

    fn get_profile(&self, participant: &ParticipantId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.profiles.lock().unwrap().get(participant).cloned())
    }

    fn iter_profiles(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.profiles.lock().unwrap().values().cloned().collect())
    }
}

impl PayoutStore for NullStore {
    fn put_payout(
        &self,
        distribution: &DistributionId,
        party: &WalletAddress,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.payouts
            .lock()
            .unwrap()
            .insert((distribution.clone(), party.clone()), data.to_vec());
        Ok(())
    }

    fn get_payout(
        &self,
        distribution: &DistributionId,
        party: &WalletAddress,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .payouts
            .lock()
            .unwrap()
            .get(&(distribution.clone(), party.clone()))
            .cloned())
    }
}

// ── Write batches ───────────────────────────────────────────────────────

enum StagedWrite {
    Loan(LoanId, Vec<u8>),
    Application(ApplicationId, Vec<u8>),
    Collective(DaoId, Vec<u8>),
    PaymentRequest(PaymentRequestId, Vec<u8>),
    Proposal(ProposalId, Vec<u8>),
    SubjectProposal(SubjectRef, ProposalId),
    Installment(SubjectRef, u32, Vec<u8>),
}

/// Stages writes in memory; nothing reaches the store until `commit`.
pub struct NullWriteBatch<'a> {
    store: &'a NullStore,
    staged: Vec<StagedWrite>,
}

impl WriteBatch for NullWriteBatch<'_> {
    fn put_loan(&mut self, id: &LoanId, data: &[u8]) -> Result<(), StoreError> {
        self.staged.push(StagedWrite::Loan(id.clone(), data.to_vec()));
        Ok(())
    }

    fn put_application(&mut self, id: &ApplicationId, data: &[u8]) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::Application(id.clone(), data.to_vec()));
        Ok(())
    }

    fn put_collective(&mut self, id: &DaoId, data: &[u8]) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::Collective(id.clone(), data.to_vec()));
        Ok(())
    }

    fn put_payment_request(
        &mut self,
        id: &PaymentRequestId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::PaymentRequest(id.clone(), data.to_vec()));
        Ok(())
    }

    fn put_proposal(&mut self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::Proposal(id.clone(), data.to_vec()));
        Ok(())
    }

    fn put_subject_proposal(
        &mut self,
        subject: &SubjectRef,
        proposal: &ProposalId,
    ) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::SubjectProposal(subject.clone(), proposal.clone()));
        Ok(())
    }

    fn put_installment(
        &mut self,
        parent: &SubjectRef,
        sequence: u32,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::Installment(parent.clone(), sequence, data.to_vec()));
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        if self.store.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::BatchAborted("scripted commit failure".into()));
        }
        let Self { store, staged } = *self;
        for write in staged {
            store.apply(write);
        }
        store.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl BatchStore for NullStore {
    fn write_batch(&self) -> Result<Box<dyn WriteBatch + '_>, StoreError> {
        Ok(Box::new(NullWriteBatch {
            store: self,
            staged: Vec::new(),
        }))
    }
}
