//! # Action Dispatcher
//!
//! Every mutating call goes through [`Dispatcher::execute`]:
//!
//! 1. Take the shared busy flag, refusing if another action is in flight
//! 2. Submit the call and announce that it is waiting for confirmation
//! 3. Wait for the network to include it
//! 4. Notify the outcome, using the contract's reason on rejection
//! 5. Refresh only the read-model slots the action can touch
//!
//! The busy flag is released by a guard, so every exit path resets it.
use std::sync::atomic::{AtomicBool, Ordering};

use ballot::{Action, VotingContract};
use tracing::{info, warn};

use crate::{cache::ReadModel, error::AppError, notify::Notifier};

pub const SUBMITTED: &str = "Transaction submitted. Waiting for confirmation...";

#[derive(Default)]
pub struct Dispatcher {
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, AppError> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| BusyGuard(&self.busy))
            .map_err(|_| AppError::Busy)
    }

    pub async fn execute<C: VotingContract>(
        &self,
        contract: &C,
        action: Action,
        cache: &ReadModel,
        notifier: &Notifier,
    ) -> Result<(), AppError> {
        let _guard = match self.acquire() {
            Ok(guard) => guard,
            Err(e) => {
                notifier.error(e.to_string());
                return Err(e);
            }
        };

        info!("Dispatching {}", action.name());

        if let Err(e) = submit_and_confirm(contract, &action, notifier).await {
            warn!("Error in {}: {e}", action.name());
            notifier.error(e.user_message(action.failure_message()));
            return Err(e);
        }

        notifier.success(action.success_message());
        cache.refresh(contract, action.refreshes()).await;

        Ok(())
    }
}

async fn submit_and_confirm<C: VotingContract>(
    contract: &C,
    action: &Action,
    notifier: &Notifier,
) -> Result<(), AppError> {
    let tx = contract.submit(action).await?;
    notifier.info(SUBMITTED);

    contract.confirm(tx).await?;

    Ok(())
}
