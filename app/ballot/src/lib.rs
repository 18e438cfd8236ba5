//! # Ballot
//!
//! Everything this app knows about the deployed voting contract.
//!
//! ## Surface
//!
//! - Writes: `registerVoter`, `registerCandidate`, `castVote`, `setVotingPeriod`, `announceVotingResult`,
//!   `emergencyStopVoting`
//! - Reads: `electionCommission`, `getVoterList`, `getCandidateList`, `getVotingStatus`, `winner`
//!
//! The contract is the only source of truth. Records here are read-only projections of whatever
//! the last `eth_call` returned.
//!
//! ## Encodings
//!
//! - Gender: 0 not specified, 1 male, 2 female, 3 other
//! - Voting status: 0 not started, 1 in progress, 2 ended
//! - Winner: zero address until announced
use std::{fmt, str::FromStr};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

pub mod contract;
pub mod remote;

pub use contract::{RemoteContract, TxHash, VotingContract};
pub use remote::{HttpProvider, Provider, RemoteError};

pub const CONTRACT_ADDRESS: &str = "0xd48b917257B7Aa5b3e36Ef2C567fF12F7b09D0b6";

pub mod abi {
    use alloy_sol_types::sol;

    sol! {
        #[derive(Debug, PartialEq)]
        struct Voter {
            string name;
            uint256 age;
            uint256 voterId;
            uint8 gender;
            uint256 voteCandidateId;
            address voterAddress;
        }

        #[derive(Debug, PartialEq)]
        struct Candidate {
            string name;
            string party;
            uint256 age;
            uint8 gender;
            uint256 candidateId;
            address candidateAddress;
            uint256 votes;
        }

        interface IVote {
            function registerVoter(string _name, uint256 _age, uint8 _gender) external;
            function registerCandidate(string _name, string _party, uint256 _age, uint8 _gender) external;
            function castVote(uint256 _voterId, uint256 _candidateId) external;
            function setVotingPeriod(uint256 _endTimeDuration) external;
            function announceVotingResult() external;
            function emergencyStopVoting() external;

            function electionCommission() external view returns (address);
            function getVoterList() external view returns (Voter[] memory);
            function getCandidateList() external view returns (Candidate[] memory);
            function getVotingStatus() external view returns (uint8);
            function winner() external view returns (address);
        }
    }
}

use abi::IVote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Gender {
    #[default]
    NotSpecified = 0,
    Male = 1,
    Female = 2,
    Other = 3,
}

impl TryFrom<u8> for Gender {
    type Error = RemoteError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Gender::NotSpecified),
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Female),
            3 => Ok(Gender::Other),
            other => Err(RemoteError::Malformed(format!("unknown gender {other}"))),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "unspecified" | "not-specified" | "none" => Ok(Gender::NotSpecified),
            "1" | "male" | "m" => Ok(Gender::Male),
            "2" | "female" | "f" => Ok(Gender::Female),
            "3" | "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{other}', expected 0-3 or male/female/other")),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::NotSpecified => "Not Specified",
        };

        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum VotingStatus {
    #[default]
    NotStarted = 0,
    InProgress = 1,
    Ended = 2,
}

impl TryFrom<u8> for VotingStatus {
    type Error = RemoteError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VotingStatus::NotStarted),
            1 => Ok(VotingStatus::InProgress),
            2 => Ok(VotingStatus::Ended),
            other => Err(RemoteError::Malformed(format!("unknown voting status {other}"))),
        }
    }
}

impl fmt::Display for VotingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VotingStatus::NotStarted => "Not Started",
            VotingStatus::InProgress => "In Progress",
            VotingStatus::Ended => "Ended",
        };

        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    pub name: String,
    pub age: u64,
    pub voter_id: u64,
    pub gender: Gender,
    /// 0 until the voter casts a vote.
    pub vote_candidate_id: u64,
    pub voter_address: Address,
}

impl Voter {
    pub fn has_voted(&self) -> bool {
        self.vote_candidate_id != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub party: String,
    pub age: u64,
    pub gender: Gender,
    pub candidate_id: u64,
    pub candidate_address: Address,
    pub votes: u64,
}

fn narrow(value: U256, field: &'static str) -> Result<u64, RemoteError> {
    u64::try_from(value).map_err(|_| RemoteError::OutOfRange(field))
}

impl TryFrom<abi::Voter> for Voter {
    type Error = RemoteError;

    fn try_from(raw: abi::Voter) -> Result<Self, Self::Error> {
        Ok(Voter {
            name: raw.name,
            age: narrow(raw.age, "voter age")?,
            voter_id: narrow(raw.voterId, "voter id")?,
            gender: Gender::try_from(raw.gender)?,
            vote_candidate_id: narrow(raw.voteCandidateId, "vote candidate id")?,
            voter_address: raw.voterAddress,
        })
    }
}

impl TryFrom<abi::Candidate> for Candidate {
    type Error = RemoteError;

    fn try_from(raw: abi::Candidate) -> Result<Self, Self::Error> {
        Ok(Candidate {
            name: raw.name,
            party: raw.party,
            age: narrow(raw.age, "candidate age")?,
            gender: Gender::try_from(raw.gender)?,
            candidate_id: narrow(raw.candidateId, "candidate id")?,
            candidate_address: raw.candidateAddress,
            votes: narrow(raw.votes, "candidate votes")?,
        })
    }
}

/// Read-model slots a mutating call can invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Voters,
    Candidates,
    Status,
    Winner,
}

/// One mutating contract call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RegisterVoter {
        name: String,
        age: u64,
        gender: Gender,
    },
    RegisterCandidate {
        name: String,
        party: String,
        age: u64,
        gender: Gender,
    },
    CastVote {
        voter_id: u64,
        candidate_id: u64,
    },
    SetVotingPeriod {
        duration_secs: u64,
    },
    AnnounceResult,
    EmergencyStop,
}

impl Action {
    pub fn calldata(&self) -> Vec<u8> {
        match self {
            Action::RegisterVoter { name, age, gender } => IVote::registerVoterCall {
                _name: name.clone(),
                _age: U256::from(*age),
                _gender: *gender as u8,
            }
            .abi_encode(),
            Action::RegisterCandidate {
                name,
                party,
                age,
                gender,
            } => IVote::registerCandidateCall {
                _name: name.clone(),
                _party: party.clone(),
                _age: U256::from(*age),
                _gender: *gender as u8,
            }
            .abi_encode(),
            Action::CastVote {
                voter_id,
                candidate_id,
            } => IVote::castVoteCall {
                _voterId: U256::from(*voter_id),
                _candidateId: U256::from(*candidate_id),
            }
            .abi_encode(),
            Action::SetVotingPeriod { duration_secs } => IVote::setVotingPeriodCall {
                _endTimeDuration: U256::from(*duration_secs),
            }
            .abi_encode(),
            Action::AnnounceResult => IVote::announceVotingResultCall {}.abi_encode(),
            Action::EmergencyStop => IVote::emergencyStopVotingCall {}.abi_encode(),
        }
    }

    pub fn refreshes(&self) -> &'static [Slot] {
        match self {
            Action::RegisterVoter { .. } => &[Slot::Voters],
            Action::RegisterCandidate { .. } => &[Slot::Candidates],
            Action::CastVote { .. } => &[Slot::Candidates, Slot::Voters],
            Action::SetVotingPeriod { .. } | Action::EmergencyStop => &[Slot::Status],
            Action::AnnounceResult => &[Slot::Winner],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::RegisterVoter { .. } => "registerVoter",
            Action::RegisterCandidate { .. } => "registerCandidate",
            Action::CastVote { .. } => "castVote",
            Action::SetVotingPeriod { .. } => "setVotingPeriod",
            Action::AnnounceResult => "announceVotingResult",
            Action::EmergencyStop => "emergencyStopVoting",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Action::RegisterVoter { .. } => "Voter registered successfully!",
            Action::RegisterCandidate { .. } => "Candidate registered successfully!",
            Action::CastVote { .. } => "Vote cast successfully!",
            Action::SetVotingPeriod { .. } => "Voting period set successfully!",
            Action::AnnounceResult => "Result announced successfully!",
            Action::EmergencyStop => "Voting stopped successfully!",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::RegisterVoter { .. } => "Failed to register voter",
            Action::RegisterCandidate { .. } => "Failed to register candidate",
            Action::CastVote { .. } => "Failed to cast vote",
            Action::SetVotingPeriod { .. } => "Failed to set voting period",
            Action::AnnounceResult => "Failed to announce result",
            Action::EmergencyStop => "Failed to stop voting",
        }
    }
}

/// Zero address means no winner has been announced yet.
pub fn announced(winner: Address) -> Option<Address> {
    (!winner.is_zero()).then_some(winner)
}
