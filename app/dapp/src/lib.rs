//! Terminal front end for a blockchain voting contract.
//!
//! All voting logic, eligibility checks, tallies and persistence live in the
//! deployed contract. This crate only renders its state and turns user input
//! into contract calls through an injected wallet.
//!
//!
//!
//! # Flow
//! - On load, silently restore a session if the wallet already granted an account
//! - Resolve the role once per connection: the election commission or an ordinary participant
//! - Fill the read model with all four contract reads
//! - Every mutating command goes through the dispatcher: submit, wait for confirmation, notify, refresh
//! - Only the read-model slots an action can touch are refreshed afterwards
//!
//!
//!
//! # Wallet
//!
//! Any endpoint speaking the EIP-1193 request surface over JSON-RPC works, a local node with
//! unlocked accounts or a wallet bridge.
//!
//! ```sh
//! export WALLET_RPC_URL=http://127.0.0.1:8545
//! export CONTRACT_ADDRESS=0xd48b917257B7Aa5b3e36Ef2C567fF12F7b09D0b6
//! ```
//!
//! Without `WALLET_RPC_URL` the wallet counts as absent and every command stays read-only and disconnected.
//!
//!
//!
//! # Commands
//!
//! Voter.
//! ```sh
//! votedapp register-voter Alice 30 --gender female
//! votedapp vote 7
//! ```
//!
//! Candidate.
//! ```sh
//! votedapp register-candidate Bob "Blue Party" 45 --gender male
//! ```
//!
//! Election commission.
//! ```sh
//! votedapp set-period 24
//! votedapp stop
//! votedapp announce
//! ```
//!
//! Everyone.
//! ```sh
//! votedapp status
//! votedapp disconnect
//! votedapp results --watch 10
//! ```
//!
//!
//!
//! # Logging
//!
//! Logs go to stderr and are filtered with `RUST_LOG`.
//! ```sh
//! RUST_LOG=dapp=debug,ballot=debug votedapp status
//! ```
use std::time::Duration;

use ballot::{Gender, HttpProvider};
use clap::Subcommand;
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{signal, time::sleep};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod forms;
pub mod notify;
pub mod state;
pub mod terminal;
pub mod utils;
pub mod views;
pub mod wallet;

#[cfg(test)]
mod testing;

use config::Config;
use error::AppError;
use forms::{CandidateForm, PeriodForm, VoterForm};
use state::State;
use views::{admin_view, results_view, vote_view};
use wallet::{InjectedWallet, Wallet};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Voting status, connection and available actions
    Status,
    /// Ask the wallet for account access
    Connect,
    /// Forget the restored session, the wallet keeps its grant
    Disconnect,
    /// Register the connected account as a voter
    RegisterVoter {
        name: String,
        age: String,
        #[arg(long, default_value = "unspecified")]
        gender: Gender,
    },
    /// Register the connected account as a candidate
    RegisterCandidate {
        name: String,
        party: String,
        age: String,
        #[arg(long, default_value = "unspecified")]
        gender: Gender,
    },
    /// Show the ballot, or cast a vote for a candidate id
    Vote { candidate_id: Option<u64> },
    /// Start voting for the given number of hours
    SetPeriod { hours: String },
    /// Announce the result once voting has ended
    Announce,
    /// Stop voting immediately
    Stop,
    /// List registered voters
    Voters,
    /// List registered candidates
    Candidates,
    /// Results dashboard
    Results {
        /// Refresh every N seconds until interrupted
        #[arg(long)]
        watch: Option<u64>,
    },
    /// Election commission panel
    Admin,
}

impl Command {
    pub fn needs_signer(&self) -> bool {
        matches!(
            self,
            Command::Connect
                | Command::RegisterVoter { .. }
                | Command::RegisterCandidate { .. }
                | Command::Vote {
                    candidate_id: Some(_)
                }
                | Command::SetPeriod { .. }
                | Command::Announce
                | Command::Stop
        )
    }
}

pub async fn start(command: Command) -> Result<(), AppError> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("Loading config...");
    let config = Config::load().map_err(|e| {
        eprintln!("[error] {e}");
        e
    })?;

    let provider = config.wallet_url.as_deref().map(HttpProvider::new);
    let wallet = InjectedWallet::new(provider, config.contract_address, config.receipt_poll);

    info!("Initializing state...");
    let state = State::new(wallet);
    let printer = terminal::spawn_printer(state.notifier.subscribe());

    state.restore().await;

    let result = run(&state, command).await;

    // Closing the last sender lets the printer drain and exit.
    drop(state);
    if let Err(e) = printer.await {
        warn!("Printer task failed: {e}");
    }

    result
}

async fn run<W: Wallet>(state: &State<W>, command: Command) -> Result<(), AppError> {
    if command.needs_signer() && !state.is_connected().await {
        state.connect().await?;
    }

    match command {
        Command::Status | Command::Connect => {
            terminal::print_status(state.session().await, &state.snapshot().await);
        }
        Command::Disconnect => {
            state.disconnect().await;
            terminal::print_status(state.session().await, &state.snapshot().await);
        }
        Command::RegisterVoter { name, age, gender } => {
            let form = VoterForm::parse(&name, &age, gender).map_err(|e| state.report(e))?;
            state.register_voter(form).await?;
        }
        Command::RegisterCandidate {
            name,
            party,
            age,
            gender,
        } => {
            let form =
                CandidateForm::parse(&name, &party, &age, gender).map_err(|e| state.report(e))?;
            state.register_candidate(form).await?;
        }
        Command::Vote { candidate_id } => match candidate_id {
            Some(candidate_id) => state.cast_vote(candidate_id).await?,
            None => {
                let view = vote_view(state.session().await.as_ref(), &state.snapshot().await);
                terminal::print_vote_view(&view);
            }
        },
        Command::SetPeriod { hours } => {
            let form = PeriodForm::parse(&hours).map_err(|e| state.report(e))?;
            state.set_voting_period(form).await?;

            if let Some(end) = terminal::closing_time(form.duration_secs()) {
                println!("Voting closes around {end}");
            }
        }
        Command::Announce => state.announce_result().await?,
        Command::Stop => state.emergency_stop().await?,
        Command::Voters => terminal::print_voters(&state.snapshot().await.voters),
        Command::Candidates => terminal::print_candidates(&state.snapshot().await.candidates),
        Command::Results { watch: None } => {
            print!("{}", results_view(&state.snapshot().await));
        }
        Command::Results {
            watch: Some(seconds),
        } => watch_results(state, Duration::from_secs(seconds.max(1))).await?,
        Command::Admin => {
            print!(
                "{}",
                admin_view(state.session().await.as_ref(), &state.snapshot().await)
            );
        }
    }

    Ok(())
}

async fn watch_results<W: Wallet>(state: &State<W>, every: Duration) -> Result<(), AppError> {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        state.refresh().await.map_err(|e| state.report(e))?;
        print!("{}", results_view(&state.snapshot().await));
        println!();

        tokio::select! {
            _ = &mut shutdown => break,
            _ = sleep(every) => {},
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, stopping"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, stopping");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
