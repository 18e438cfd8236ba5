use std::time::Duration;

use ballot::{Candidate, Voter};
use chrono::{Local, TimeDelta};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{
    sync::broadcast::{Receiver, error::RecvError},
    task::JoinHandle,
};

use crate::{
    cache::Snapshot,
    dispatch::SUBMITTED,
    notify::{Level, Notification},
    views::{VoteView, home_actions, home_stats, navigation, status_card},
    wallet::Session,
};

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);

    pb
}

fn finish(pending: &mut Option<ProgressBar>) {
    if let Some(pb) = pending.take() {
        pb.finish_and_clear();
    }
}

/// Prints notifications until every sender is gone.
pub fn spawn_printer(mut receiver: Receiver<Notification>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut pending = None;

        loop {
            let notification = match receiver.recv().await {
                Ok(notification) => notification,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };

            match notification.level {
                Level::Info if notification.message == SUBMITTED => {
                    finish(&mut pending);
                    pending = Some(spinner(notification.message));
                }
                Level::Info => println!("{}", notification.message),
                Level::Success => {
                    finish(&mut pending);
                    println!("[ok] {}", notification.message);
                }
                Level::Error => {
                    finish(&mut pending);
                    eprintln!("[error] {}", notification.message);
                }
            }
        }

        finish(&mut pending);
    })
}

pub fn print_status(session: Option<Session>, snapshot: &Snapshot) {
    let card = status_card(snapshot.status);
    println!("{}", card.title);
    println!("  {}", card.description);
    println!();

    let stats = home_stats(snapshot);
    println!(
        "Candidates: {}  Voters: {}  Total votes: {}",
        stats.candidates, stats.voters, stats.total_votes
    );
    println!();

    match session {
        Some(session) => {
            let role = if session.is_commission() {
                "election commission"
            } else {
                "participant"
            };
            println!("Connected as {} ({role})", session.account);
        }
        None => println!("Wallet not connected. Run `connect` to get started."),
    }

    println!("Pages: {}", navigation(session.map(|s| s.role)).join(" | "));

    let actions = home_actions(session.as_ref(), snapshot.status);
    if !actions.is_empty() {
        println!();
        for action in actions {
            println!("  {:<24} {}", action.title(), action.command());
        }
    }
}

pub fn print_voters(voters: &[Voter]) {
    if voters.is_empty() {
        println!("No voters registered yet.");
        return;
    }

    for voter in voters {
        let voted = if voter.has_voted() {
            format!("voted for #{}", voter.vote_candidate_id)
        } else {
            "not voted".to_string()
        };
        println!(
            "[{}] {:<20} {:>3} {:<14} {} {voted}",
            voter.voter_id, voter.name, voter.age, voter.gender, voter.voter_address
        );
    }
}

pub fn print_candidates(candidates: &[Candidate]) {
    if candidates.is_empty() {
        println!("No candidates registered yet.");
        return;
    }

    for candidate in candidates {
        println!(
            "[{}] {:<20} {:<16} {:>3} {:<14} {}",
            candidate.candidate_id,
            candidate.name,
            candidate.party,
            candidate.age,
            candidate.gender,
            candidate.candidate_address
        );
    }
}

pub fn print_vote_view(view: &VoteView) {
    print!("{view}");
    if !view.can_submit() {
        println!();
    }
}

/// Local wall-clock time at which a period of `duration_secs` started now ends.
pub fn closing_time(duration_secs: u64) -> Option<String> {
    let delta = TimeDelta::try_seconds(i64::try_from(duration_secs).ok()?)?;

    Local::now()
        .checked_add_signed(delta)
        .map(|end| end.format("%Y-%m-%d %H:%M:%S").to_string())
}
