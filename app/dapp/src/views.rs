//! # Views
//!
//! View models derived from the session and the read model. No business rules
//! live here beyond what a screen needs to decide what to show.
//!
//! ## Derived values
//!
//! - Turnout: voters who voted / registered voters, 0 without voters
//! - Vote share: candidate votes / total votes, 0 without votes
//!
//! ## Gating
//!
//! - Vote form only while voting is in progress and the connected voter has not voted
//! - Admin panel only for the election commission
//! - Registration pre-checks are advisory, the contract is the final arbiter
use std::fmt;

use alloy_primitives::Address;
use ballot::{Candidate, Voter, VotingStatus};

use crate::{
    cache::Snapshot,
    utils::percent,
    wallet::{Role, Session},
};

pub fn is_registered_voter(voters: &[Voter], account: Address) -> bool {
    voters.iter().any(|voter| voter.voter_address == account)
}

pub fn is_registered_candidate(candidates: &[Candidate], account: Address) -> bool {
    candidates
        .iter()
        .any(|candidate| candidate.candidate_address == account)
}

pub fn total_votes(candidates: &[Candidate]) -> u64 {
    candidates
        .iter()
        .fold(0u64, |total, candidate| total.saturating_add(candidate.votes))
}

pub fn turnout(voters: &[Voter]) -> f64 {
    let voted = voters.iter().filter(|voter| voter.has_voted()).count();

    percent(voted as u64, voters.len() as u64)
}

pub fn vote_share(candidate: &Candidate, total: u64) -> f64 {
    percent(candidate.votes, total)
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoteView {
    NotConnected,
    NotRegistered,
    NotOpen(VotingStatus),
    AlreadyVoted { candidate: Option<String> },
    Ballot { voter_id: u64, candidates: Vec<Candidate> },
}

impl VoteView {
    pub fn can_submit(&self) -> bool {
        matches!(self, VoteView::Ballot { .. })
    }
}

impl fmt::Display for VoteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteView::NotConnected => write!(f, "Please connect your wallet to vote."),
            VoteView::NotRegistered => {
                write!(f, "You need to register as a voter before you can vote.")
            }
            VoteView::NotOpen(VotingStatus::NotStarted) => write!(f, "Voting has not started yet."),
            VoteView::NotOpen(_) => write!(f, "Voting has ended."),
            VoteView::AlreadyVoted { candidate } => match candidate {
                Some(name) => write!(f, "You have already voted for {name}."),
                None => write!(f, "You have already voted."),
            },
            VoteView::Ballot { candidates, .. } => {
                writeln!(f, "Select a candidate:")?;
                for candidate in candidates {
                    writeln!(
                        f,
                        "  [{}] {} ({}), {} years, {}",
                        candidate.candidate_id,
                        candidate.name,
                        candidate.party,
                        candidate.age,
                        candidate.gender
                    )?;
                }
                Ok(())
            }
        }
    }
}

pub fn vote_view(session: Option<&Session>, snapshot: &Snapshot) -> VoteView {
    let Some(session) = session else {
        return VoteView::NotConnected;
    };

    let Some(voter) = snapshot
        .voters
        .iter()
        .find(|voter| voter.voter_address == session.account)
    else {
        return VoteView::NotRegistered;
    };

    if snapshot.status != VotingStatus::InProgress {
        return VoteView::NotOpen(snapshot.status);
    }

    if voter.has_voted() {
        let candidate = snapshot
            .candidates
            .iter()
            .find(|candidate| candidate.candidate_id == voter.vote_candidate_id)
            .map(|candidate| candidate.name.clone());

        return VoteView::AlreadyVoted { candidate };
    }

    VoteView::Ballot {
        voter_id: voter.voter_id,
        candidates: snapshot.candidates.clone(),
    }
}

/// Counters on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeStats {
    pub candidates: usize,
    pub voters: usize,
    pub total_votes: u64,
}

pub fn home_stats(snapshot: &Snapshot) -> HomeStats {
    HomeStats {
        candidates: snapshot.candidates.len(),
        voters: snapshot.voters.len(),
        total_votes: total_votes(&snapshot.candidates),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAction {
    RegisterVoter,
    RegisterCandidate,
    CastVote,
    ViewResults,
    AdminPanel,
}

impl HomeAction {
    pub fn title(&self) -> &'static str {
        match self {
            HomeAction::RegisterVoter => "Register as Voter",
            HomeAction::RegisterCandidate => "Register as Candidate",
            HomeAction::CastVote => "Cast Your Vote",
            HomeAction::ViewResults => "View Results",
            HomeAction::AdminPanel => "Admin Panel",
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            HomeAction::RegisterVoter => "register-voter",
            HomeAction::RegisterCandidate => "register-candidate",
            HomeAction::CastVote => "vote",
            HomeAction::ViewResults => "results",
            HomeAction::AdminPanel => "admin",
        }
    }
}

pub fn home_actions(session: Option<&Session>, status: VotingStatus) -> Vec<HomeAction> {
    let Some(session) = session else {
        return Vec::new();
    };

    let mut actions = Vec::new();
    if !session.is_commission() {
        actions.push(HomeAction::RegisterVoter);
        actions.push(HomeAction::RegisterCandidate);
    }
    if status == VotingStatus::InProgress {
        actions.push(HomeAction::CastVote);
    }
    actions.push(HomeAction::ViewResults);
    if session.is_commission() {
        actions.push(HomeAction::AdminPanel);
    }

    actions
}

pub fn navigation(role: Option<Role>) -> Vec<&'static str> {
    let mut entries = vec![
        "Home",
        "Register Voter",
        "Register Candidate",
        "Vote",
        "Results",
    ];
    if role == Some(Role::ElectionCommission) {
        entries.push("Admin");
    }

    entries
}

pub struct StatusCard {
    pub title: &'static str,
    pub description: &'static str,
}

pub fn status_card(status: VotingStatus) -> StatusCard {
    match status {
        VotingStatus::NotStarted => StatusCard {
            title: "Voting Not Started",
            description: "Waiting for election commission to start the voting period",
        },
        VotingStatus::InProgress => StatusCard {
            title: "Voting In Progress",
            description: "Voting is currently active. Cast your vote now!",
        },
        VotingStatus::Ended => StatusCard {
            title: "Voting Ended",
            description: "Voting period has ended. Results will be announced soon.",
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminView {
    NotConnected,
    Denied,
    Panel(AdminPanel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminPanel {
    pub status: VotingStatus,
    pub candidates: usize,
    pub voters: usize,
    pub total_votes: u64,
    pub turnout: f64,
    pub can_set_period: bool,
    pub can_stop: bool,
    pub can_announce: bool,
}

pub fn admin_view(session: Option<&Session>, snapshot: &Snapshot) -> AdminView {
    match session {
        None => AdminView::NotConnected,
        Some(session) if !session.is_commission() => AdminView::Denied,
        Some(_) => AdminView::Panel(AdminPanel {
            status: snapshot.status,
            candidates: snapshot.candidates.len(),
            voters: snapshot.voters.len(),
            total_votes: total_votes(&snapshot.candidates),
            turnout: turnout(&snapshot.voters),
            can_set_period: snapshot.status == VotingStatus::NotStarted,
            can_stop: snapshot.status == VotingStatus::InProgress,
            can_announce: snapshot.status == VotingStatus::Ended,
        }),
    }
}

impl fmt::Display for AdminView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let panel = match self {
            AdminView::NotConnected => {
                return write!(f, "Please connect your wallet to access the admin panel.")
            }
            AdminView::Denied => {
                return write!(f, "Only the election commission can access this page.")
            }
            AdminView::Panel(panel) => panel,
        };

        writeln!(f, "Status:      {}", panel.status)?;
        writeln!(f, "Candidates:  {}", panel.candidates)?;
        writeln!(f, "Voters:      {}", panel.voters)?;
        writeln!(f, "Total votes: {}", panel.total_votes)?;
        writeln!(f, "Turnout:     {:.1}%", panel.turnout)?;
        writeln!(f)?;

        let controls = [
            (panel.can_set_period, "set-period <hours>"),
            (panel.can_stop, "stop"),
            (panel.can_announce, "announce"),
        ];
        for (enabled, command) in controls {
            let marker = if enabled { "available" } else { "unavailable" };
            writeln!(f, "  {command:<20} {marker}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub candidate_id: u64,
    pub name: String,
    pub party: String,
    pub votes: u64,
    pub share: f64,
    pub is_winner: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub total_votes: u64,
    pub registered_voters: usize,
    pub turnout: f64,
    pub rows: Vec<ResultRow>,
}

impl ResultsView {
    pub fn winner(&self) -> Option<&ResultRow> {
        self.rows.iter().find(|row| row.is_winner)
    }
}

pub fn results_view(snapshot: &Snapshot) -> ResultsView {
    let total = total_votes(&snapshot.candidates);

    let rows = snapshot
        .candidates
        .iter()
        .map(|candidate| ResultRow {
            candidate_id: candidate.candidate_id,
            name: candidate.name.clone(),
            party: candidate.party.clone(),
            votes: candidate.votes,
            share: vote_share(candidate, total),
            is_winner: snapshot.winner == Some(candidate.candidate_address),
        })
        .collect();

    ResultsView {
        total_votes: total,
        registered_voters: snapshot.voters.len(),
        turnout: turnout(&snapshot.voters),
        rows,
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total votes:       {}", self.total_votes)?;
        writeln!(f, "Registered voters: {}", self.registered_voters)?;
        writeln!(f, "Turnout:           {:.1}%", self.turnout)?;

        if let Some(winner) = self.winner() {
            writeln!(
                f,
                "Winner:            {} ({}) with {} votes ({:.1}%)",
                winner.name, winner.party, winner.votes, winner.share
            )?;
        }

        writeln!(f)?;
        for row in &self.rows {
            let marker = if row.is_winner { "*" } else { " " };
            writeln!(
                f,
                "{marker} [{}] {:<20} {:<16} {:>6} votes {:>6.1}%",
                row.candidate_id, row.name, row.party, row.votes, row.share
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{addr, candidate, voter};

    fn participant(byte: u8) -> Session {
        Session {
            account: addr(byte),
            role: Role::Participant,
        }
    }

    fn commission(byte: u8) -> Session {
        Session {
            account: addr(byte),
            role: Role::ElectionCommission,
        }
    }

    fn snapshot(status: VotingStatus, voters: Vec<Voter>, candidates: Vec<Candidate>) -> Snapshot {
        Snapshot {
            voters,
            candidates,
            status,
            winner: None,
        }
    }

    #[test]
    fn test_vote_permitted_only_in_progress_and_unvoted() {
        let statuses = [
            VotingStatus::NotStarted,
            VotingStatus::InProgress,
            VotingStatus::Ended,
        ];
        let session = participant(0xa1);

        for status in statuses {
            for voted in [0, 7] {
                let snap = snapshot(
                    status,
                    vec![voter(1, 0xa1, voted)],
                    vec![candidate(7, 0xc7, 0)],
                );
                let view = vote_view(Some(&session), &snap);

                let expected = status == VotingStatus::InProgress && voted == 0;
                assert_eq!(view.can_submit(), expected, "{status:?} voted={voted}");
            }
        }
    }

    #[test]
    fn test_vote_view_states() {
        let snap = snapshot(
            VotingStatus::InProgress,
            vec![voter(1, 0xa1, 7)],
            vec![candidate(7, 0xc7, 1)],
        );

        assert_eq!(vote_view(None, &snap), VoteView::NotConnected);
        assert_eq!(vote_view(Some(&participant(0xa2)), &snap), VoteView::NotRegistered);
        assert_eq!(
            vote_view(Some(&participant(0xa1)), &snap),
            VoteView::AlreadyVoted {
                candidate: Some("candidate 7".into())
            }
        );

        let ended = snapshot(VotingStatus::Ended, vec![voter(1, 0xa1, 0)], vec![]);
        assert_eq!(
            vote_view(Some(&participant(0xa1)), &ended),
            VoteView::NotOpen(VotingStatus::Ended)
        );
        assert_eq!(
            vote_view(Some(&participant(0xa1)), &ended).to_string(),
            "Voting has ended."
        );
    }

    #[test]
    fn test_turnout_bounds() {
        assert_eq!(turnout(&[]), 0.0);
        assert_eq!(turnout(&[voter(1, 1, 0)]), 0.0);
        assert_eq!(turnout(&[voter(1, 1, 3), voter(2, 2, 0)]), 50.0);
        assert_eq!(turnout(&[voter(1, 1, 3), voter(2, 2, 4)]), 100.0);
    }

    #[test]
    fn test_vote_share_sums_to_hundred() {
        let candidates = vec![candidate(1, 1, 1), candidate(2, 2, 1), candidate(3, 3, 1)];
        let total = total_votes(&candidates);

        let sum: f64 = candidates.iter().map(|c| vote_share(c, total)).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        let silent = vec![candidate(1, 1, 0), candidate(2, 2, 0)];
        assert!(silent.iter().all(|c| vote_share(c, 0) == 0.0));
    }

    #[test]
    fn test_total_votes_saturates() {
        let candidates = vec![candidate(1, 1, u64::MAX), candidate(2, 2, 5)];
        assert_eq!(total_votes(&candidates), u64::MAX);
    }

    #[test]
    fn test_home_stats() {
        let snap = snapshot(
            VotingStatus::InProgress,
            vec![voter(1, 0xa1, 7), voter(2, 0xa2, 0)],
            vec![candidate(7, 0xc7, 1), candidate(8, 0xc8, 0)],
        );

        assert_eq!(
            home_stats(&snap),
            HomeStats {
                candidates: 2,
                voters: 2,
                total_votes: 1,
            }
        );
    }

    #[test]
    fn test_registration_membership() {
        let voters = vec![voter(1, 0xa1, 0)];
        assert!(is_registered_voter(&voters, addr(0xa1)));
        assert!(!is_registered_voter(&voters, addr(0xa2)));

        let candidates = vec![candidate(7, 0xc7, 0)];
        assert!(is_registered_candidate(&candidates, addr(0xc7)));
        assert!(!is_registered_candidate(&candidates, addr(0xa1)));
    }

    #[test]
    fn test_home_actions() {
        assert!(home_actions(None, VotingStatus::InProgress).is_empty());

        assert_eq!(
            home_actions(Some(&participant(1)), VotingStatus::NotStarted),
            vec![
                HomeAction::RegisterVoter,
                HomeAction::RegisterCandidate,
                HomeAction::ViewResults
            ]
        );
        assert_eq!(
            home_actions(Some(&commission(1)), VotingStatus::InProgress),
            vec![
                HomeAction::CastVote,
                HomeAction::ViewResults,
                HomeAction::AdminPanel
            ]
        );
    }

    #[test]
    fn test_navigation() {
        assert!(!navigation(Some(Role::Participant)).contains(&"Admin"));
        assert!(navigation(Some(Role::ElectionCommission)).contains(&"Admin"));
    }

    #[test]
    fn test_admin_gating() {
        let snap = snapshot(VotingStatus::NotStarted, vec![], vec![]);

        assert_eq!(admin_view(None, &snap), AdminView::NotConnected);
        assert_eq!(admin_view(Some(&participant(1)), &snap), AdminView::Denied);

        for (status, period, stop, announce) in [
            (VotingStatus::NotStarted, true, false, false),
            (VotingStatus::InProgress, false, true, false),
            (VotingStatus::Ended, false, false, true),
        ] {
            let snap = snapshot(status, vec![], vec![]);
            let AdminView::Panel(panel) = admin_view(Some(&commission(1)), &snap) else {
                panic!("commission should see the panel");
            };
            assert_eq!(
                (panel.can_set_period, panel.can_stop, panel.can_announce),
                (period, stop, announce)
            );
        }
    }

    #[test]
    fn test_admin_turnout() {
        let snap = snapshot(
            VotingStatus::InProgress,
            vec![voter(1, 0xa1, 7), voter(2, 0xa2, 0), voter(3, 0xa3, 0), voter(4, 0xa4, 7)],
            vec![candidate(7, 0xc7, 2)],
        );

        let view = admin_view(Some(&commission(1)), &snap);
        let AdminView::Panel(panel) = &view else {
            panic!("commission should see the panel");
        };
        assert_eq!(panel.turnout, 50.0);
        assert!(view.to_string().contains("Turnout:     50.0%"));
    }

    #[test]
    fn test_results_winner() {
        let mut snap = snapshot(
            VotingStatus::Ended,
            vec![voter(1, 0xa1, 7), voter(2, 0xa2, 7), voter(3, 0xa3, 8)],
            vec![candidate(7, 0xc7, 2), candidate(8, 0xc8, 1)],
        );
        assert!(results_view(&snap).winner().is_none());

        snap.winner = Some(addr(0xc7));
        let results = results_view(&snap);

        assert_eq!(results.total_votes, 3);
        assert_eq!(results.turnout, 100.0);
        assert_eq!(results.winner().map(|w| w.candidate_id), Some(7));
        assert!(results.to_string().contains("Winner:"));
    }
}
