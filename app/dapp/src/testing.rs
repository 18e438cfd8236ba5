use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use alloy_primitives::{Address, B256, hex};
use alloy_sol_types::{Revert, SolError};
use ballot::{
    Action, Candidate, Gender, RemoteError, Slot, TxHash, Voter, VotingContract, VotingStatus,
};
use serde_json::Value;
use tokio::sync::Notify;

use crate::{error::AppError, wallet::Wallet};

pub fn addr(byte: u8) -> Address {
    Address::with_last_byte(byte)
}

pub fn voter(voter_id: u64, address: u8, vote_candidate_id: u64) -> Voter {
    Voter {
        name: format!("voter {voter_id}"),
        age: 30,
        voter_id,
        gender: Gender::NotSpecified,
        vote_candidate_id,
        voter_address: addr(address),
    }
}

pub fn candidate(candidate_id: u64, address: u8, votes: u64) -> Candidate {
    Candidate {
        name: format!("candidate {candidate_id}"),
        party: "Independent".into(),
        age: 40,
        gender: Gender::NotSpecified,
        candidate_id,
        candidate_address: addr(address),
        votes,
    }
}

#[derive(Default)]
struct Chain {
    commission: Address,
    voters: Vec<Voter>,
    candidates: Vec<Candidate>,
    status: VotingStatus,
    winner: Option<Address>,
    failing: Vec<Slot>,
    reject: Option<(String, Option<Value>)>,
    gate: Option<Arc<Notify>>,
}

/// Scriptable contract that records submissions without applying them.
#[derive(Default)]
pub struct FakeContract {
    chain: Mutex<Chain>,
    submitted: AtomicUsize,
}

impl FakeContract {
    pub fn set_voters(&self, voters: Vec<Voter>) {
        self.chain.lock().unwrap().voters = voters;
    }

    pub fn set_candidates(&self, candidates: Vec<Candidate>) {
        self.chain.lock().unwrap().candidates = candidates;
    }

    pub fn set_status(&self, status: VotingStatus) {
        self.chain.lock().unwrap().status = status;
    }

    /// Makes reads of the given slots fail until called again.
    pub fn fail_reads(&self, slots: &[Slot]) {
        self.chain.lock().unwrap().failing = slots.to_vec();
    }

    /// Rejects the next submissions with a node-style error message.
    pub fn reject(&self, message: &str) {
        self.chain.lock().unwrap().reject = Some((message.to_string(), None));
    }

    /// Rejects like geth does, with `Error(string)` revert bytes next to the message.
    pub fn revert(&self, reason: &str) {
        let data = Revert {
            reason: reason.to_string(),
        }
        .abi_encode();

        self.chain.lock().unwrap().reject = Some((
            format!("execution reverted: {reason}"),
            Some(Value::String(hex::encode_prefixed(data))),
        ));
    }

    /// Holds every confirmation until the returned handle is notified.
    pub fn hold_confirmations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.chain.lock().unwrap().gate = Some(gate.clone());
        gate
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    fn read<T>(&self, slot: Slot, pick: impl FnOnce(&Chain) -> T) -> Result<T, RemoteError> {
        let chain = self.chain.lock().unwrap();
        if chain.failing.contains(&slot) {
            return Err(RemoteError::Malformed(format!("{slot:?} read failed")));
        }

        Ok(pick(&chain))
    }
}

impl VotingContract for FakeContract {
    async fn election_commission(&self) -> Result<Address, RemoteError> {
        Ok(self.chain.lock().unwrap().commission)
    }

    async fn voter_list(&self) -> Result<Vec<Voter>, RemoteError> {
        self.read(Slot::Voters, |chain| chain.voters.clone())
    }

    async fn candidate_list(&self) -> Result<Vec<Candidate>, RemoteError> {
        self.read(Slot::Candidates, |chain| chain.candidates.clone())
    }

    async fn voting_status(&self) -> Result<VotingStatus, RemoteError> {
        self.read(Slot::Status, |chain| chain.status)
    }

    async fn winner(&self) -> Result<Option<Address>, RemoteError> {
        self.read(Slot::Winner, |chain| chain.winner)
    }

    async fn submit(&self, _action: &Action) -> Result<TxHash, RemoteError> {
        if let Some((message, data)) = self.chain.lock().unwrap().reject.clone() {
            return Err(RemoteError::Rpc {
                code: 3,
                message,
                data,
            });
        }

        let count = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(B256::with_last_byte(count as u8))
    }

    async fn confirm(&self, _tx: TxHash) -> Result<(), RemoteError> {
        let gate = self.chain.lock().unwrap().gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        Ok(())
    }
}

/// Wallet that already granted its accounts and binds fresh fake contracts.
pub struct FakeWallet {
    granted: Vec<Address>,
}

impl FakeWallet {
    pub fn granted(account: Address) -> Self {
        Self {
            granted: vec![account],
        }
    }
}

impl Wallet for FakeWallet {
    type Contract = FakeContract;

    async fn accounts(&self) -> Result<Vec<Address>, AppError> {
        Ok(self.granted.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, AppError> {
        Ok(self.granted.clone())
    }

    fn bind(&self, _signer: Address) -> Result<FakeContract, AppError> {
        Ok(FakeContract::default())
    }
}
