use std::sync::Arc;

use alloy_primitives::Address;
use ballot::{Action, VotingContract};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    cache::{ReadModel, Snapshot},
    dispatch::Dispatcher,
    error::AppError,
    forms::{CandidateForm, PeriodForm, VoterForm},
    notify::Notifier,
    views::{self, VoteView},
    wallet::{Role, Session, Wallet},
};

struct Connection<C> {
    session: Session,
    contract: Arc<C>,
}

/// Owns the session, the contract handle and everything derived from them.
pub struct State<W: Wallet> {
    wallet: W,
    connection: RwLock<Option<Connection<W::Contract>>>,
    pub cache: ReadModel,
    pub dispatcher: Dispatcher,
    pub notifier: Notifier,
}

impl<W: Wallet> State<W> {
    pub fn new(wallet: W) -> Arc<Self> {
        Arc::new(Self {
            wallet,
            connection: RwLock::new(None),
            cache: ReadModel::new(),
            dispatcher: Dispatcher::new(),
            notifier: Notifier::new(),
        })
    }

    /// Silently reconnects when the wallet already granted an account.
    pub async fn restore(&self) {
        match self.wallet.accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(account) => {
                    info!("Restoring session for {account}");
                    let _ = self.establish(*account).await;
                }
                None => info!("No previously granted account"),
            },
            Err(e) => warn!("Error checking connection: {e}"),
        }
    }

    pub async fn connect(&self) -> Result<Session, AppError> {
        let accounts = match self.wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => return Err(self.connect_failed(e)),
        };

        let Some(account) = accounts.first() else {
            return Err(self.connect_failed(AppError::AccessDenied));
        };

        self.establish(*account).await
    }

    async fn establish(&self, account: Address) -> Result<Session, AppError> {
        let contract = match self.wallet.bind(account) {
            Ok(contract) => Arc::new(contract),
            Err(e) => return Err(self.connect_failed(e)),
        };

        let commission = match contract.election_commission().await {
            Ok(commission) => commission,
            Err(e) => return Err(self.connect_failed(e.into())),
        };

        let session = Session {
            account,
            role: Role::resolve(account, commission),
        };

        *self.connection.write().await = Some(Connection {
            session,
            contract: contract.clone(),
        });

        info!("Connected {account} as {:?}", session.role);
        self.notifier.success("Wallet connected successfully!");

        self.cache.refresh_all(&*contract).await;

        Ok(session)
    }

    fn connect_failed(&self, e: AppError) -> AppError {
        warn!("Error connecting wallet: {e}");

        let message = match &e {
            AppError::WalletMissing | AppError::AccessDenied => e.to_string(),
            _ => "Failed to connect wallet".to_string(),
        };
        self.notifier.error(message);

        e
    }

    /// Forgets the local session; the wallet's own grant is untouched.
    pub async fn disconnect(&self) {
        *self.connection.write().await = None;
        self.cache.clear().await;

        self.notifier.info("Wallet disconnected");
    }

    pub async fn session(&self) -> Option<Session> {
        self.connection.read().await.as_ref().map(|c| c.session)
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.cache.snapshot().await
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let contract = self.contract().await?;
        self.cache.refresh_all(&*contract).await;

        Ok(())
    }

    async fn contract(&self) -> Result<Arc<W::Contract>, AppError> {
        self.connection
            .read()
            .await
            .as_ref()
            .map(|c| c.contract.clone())
            .ok_or(AppError::NotConnected)
    }

    pub async fn dispatch(&self, action: Action) -> Result<(), AppError> {
        let contract = match self.contract().await {
            Ok(contract) => contract,
            Err(e) => return Err(self.report(e)),
        };

        self.dispatcher
            .execute(&*contract, action, &self.cache, &self.notifier)
            .await
    }

    // Advisory pre-checks below only catch obvious duplicates, the contract decides.

    pub async fn register_voter(&self, form: VoterForm) -> Result<(), AppError> {
        let account = self.account().await?;
        if views::is_registered_voter(&self.snapshot().await.voters, account) {
            return Err(self.report(AppError::AlreadyRegistered("voter")));
        }

        self.dispatch(form.into_action()).await
    }

    pub async fn register_candidate(&self, form: CandidateForm) -> Result<(), AppError> {
        let account = self.account().await?;
        if views::is_registered_candidate(&self.snapshot().await.candidates, account) {
            return Err(self.report(AppError::AlreadyRegistered("candidate")));
        }

        self.dispatch(form.into_action()).await
    }

    pub async fn cast_vote(&self, candidate_id: u64) -> Result<(), AppError> {
        let session = self.session().await;
        let snapshot = self.snapshot().await;

        match views::vote_view(session.as_ref(), &snapshot) {
            VoteView::Ballot { voter_id, .. } => {
                self.dispatch(Action::CastVote {
                    voter_id,
                    candidate_id,
                })
                .await
            }
            VoteView::NotConnected => Err(self.report(AppError::NotConnected)),
            other => Err(self.report(AppError::InvalidInput(other.to_string()))),
        }
    }

    pub async fn set_voting_period(&self, form: PeriodForm) -> Result<(), AppError> {
        self.dispatch(form.into_action()).await
    }

    pub async fn announce_result(&self) -> Result<(), AppError> {
        self.dispatch(Action::AnnounceResult).await
    }

    pub async fn emergency_stop(&self) -> Result<(), AppError> {
        self.dispatch(Action::EmergencyStop).await
    }

    async fn account(&self) -> Result<Address, AppError> {
        match self.session().await {
            Some(session) => Ok(session.account),
            None => Err(self.report(AppError::NotConnected)),
        }
    }

    /// Surfaces an error to the user and hands it back.
    pub fn report(&self, e: AppError) -> AppError {
        self.notifier.error(e.to_string());
        e
    }
}
