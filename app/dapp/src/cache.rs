//! # Read Model
//!
//! Local, unpersisted mirror of the four contract reads.
//!
//! ## Rules
//!
//! - Every refresh is a full re-fetch and a full replace of its slot
//! - A failed fetch is logged and the slot keeps its previous value
//! - Slots are independent, one failing never blocks the others
//! - Overlapping refreshes are not ordered, the last one to resolve wins
use alloy_primitives::Address;
use ballot::{Candidate, RemoteError, Slot, Voter, VotingContract, VotingStatus};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub voters: Vec<Voter>,
    pub candidates: Vec<Candidate>,
    pub status: VotingStatus,
    pub winner: Option<Address>,
}

#[derive(Default)]
pub struct ReadModel {
    voters: RwLock<Vec<Voter>>,
    candidates: RwLock<Vec<Candidate>>,
    status: RwLock<VotingStatus>,
    winner: RwLock<Option<Address>>,
}

impl ReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            voters: self.voters.read().await.clone(),
            candidates: self.candidates.read().await.clone(),
            status: *self.status.read().await,
            winner: *self.winner.read().await,
        }
    }

    pub async fn refresh_all<C: VotingContract>(&self, contract: &C) {
        tokio::join!(
            self.refresh_slot(contract, Slot::Voters),
            self.refresh_slot(contract, Slot::Candidates),
            self.refresh_slot(contract, Slot::Status),
            self.refresh_slot(contract, Slot::Winner),
        );
    }

    pub async fn refresh<C: VotingContract>(&self, contract: &C, slots: &[Slot]) {
        for slot in slots {
            self.refresh_slot(contract, *slot).await;
        }
    }

    /// Returns whether the slot was replaced.
    pub async fn refresh_slot<C: VotingContract>(&self, contract: &C, slot: Slot) -> bool {
        let outcome = match slot {
            Slot::Voters => replace(&self.voters, contract.voter_list().await).await,
            Slot::Candidates => replace(&self.candidates, contract.candidate_list().await).await,
            Slot::Status => replace(&self.status, contract.voting_status().await).await,
            Slot::Winner => replace(&self.winner, contract.winner().await).await,
        };

        match outcome {
            Ok(()) => {
                debug!("Refreshed {slot:?}");
                true
            }
            Err(e) => {
                warn!("Error fetching {slot:?}: {e}");
                false
            }
        }
    }

    pub async fn clear(&self) {
        self.voters.write().await.clear();
        self.candidates.write().await.clear();
        *self.status.write().await = VotingStatus::default();
        *self.winner.write().await = None;
    }
}

async fn replace<T>(slot: &RwLock<T>, fetched: Result<T, RemoteError>) -> Result<(), RemoteError> {
    *slot.write().await = fetched?;

    Ok(())
}
