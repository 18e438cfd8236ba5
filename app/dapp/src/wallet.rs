//! # Wallet
//!
//! Binding between an injected wallet and the voting contract.
//!
//! ## Connection
//!
//! - `eth_accounts` lists already granted accounts without prompting, used to restore a session on load
//! - `eth_requestAccounts` prompts the user, used by an explicit connect
//! - The first account becomes the signer of the contract handle
//!
//! ## Failures
//!
//! - No provider configured: the wallet is absent
//! - Code 4001: the user rejected the prompt
//! - Anything else: transport or signing error
//!
//! Nothing here retries, the user has to connect again.
use std::{future::Future, sync::Arc, time::Duration};

use alloy_primitives::Address;
use ballot::{Provider, RemoteContract, RemoteError, VotingContract};
use serde_json::{Value, json};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    ElectionCommission,
    Participant,
}

impl Role {
    pub fn resolve(account: Address, commission: Address) -> Self {
        if account == commission {
            Role::ElectionCommission
        } else {
            Role::Participant
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account: Address,
    pub role: Role,
}

impl Session {
    pub fn is_commission(&self) -> bool {
        self.role == Role::ElectionCommission
    }
}

pub trait Wallet: Send + Sync {
    type Contract: VotingContract + 'static;

    /// Accounts the wallet already granted, never prompts.
    fn accounts(&self) -> impl Future<Output = Result<Vec<Address>, AppError>> + Send;

    /// Prompts the user for access.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, AppError>> + Send;

    fn bind(&self, signer: Address) -> Result<Self::Contract, AppError>;
}

pub struct InjectedWallet<P> {
    provider: Option<Arc<P>>,
    contract_address: Address,
    receipt_poll: Duration,
}

impl<P: Provider> InjectedWallet<P> {
    pub fn new(provider: Option<P>, contract_address: Address, receipt_poll: Duration) -> Self {
        Self {
            provider: provider.map(Arc::new),
            contract_address,
            receipt_poll,
        }
    }

    fn provider(&self) -> Result<&Arc<P>, AppError> {
        self.provider.as_ref().ok_or(AppError::WalletMissing)
    }

    async fn list(&self, method: &str) -> Result<Vec<Address>, AppError> {
        let value = self
            .provider()?
            .request(method, json!([]))
            .await
            .map_err(|e| match e {
                e if e.is_user_rejection() => AppError::AccessDenied,
                e => AppError::Remote(e),
            })?;

        parse_accounts(value)
    }
}

fn parse_accounts(value: Value) -> Result<Vec<Address>, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Remote(RemoteError::Malformed(format!("accounts: {e}"))))
}

impl<P: Provider + 'static> Wallet for InjectedWallet<P> {
    type Contract = RemoteContract<P>;

    async fn accounts(&self) -> Result<Vec<Address>, AppError> {
        self.list("eth_accounts").await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, AppError> {
        self.list("eth_requestAccounts").await
    }

    fn bind(&self, signer: Address) -> Result<Self::Contract, AppError> {
        Ok(RemoteContract::new(
            self.provider()?.clone(),
            self.contract_address,
            signer,
            self.receipt_poll,
        ))
    }
}
