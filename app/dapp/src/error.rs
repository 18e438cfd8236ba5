use ballot::RemoteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No wallet provider detected. Set WALLET_RPC_URL to a wallet endpoint.")]
    WalletMissing,

    #[error("Wallet access was rejected")]
    AccessDenied,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Another transaction is still in progress")]
    Busy,

    #[error("You are already registered as a {0}!")]
    AlreadyRegistered(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

impl AppError {
    /// Message shown to the user, preferring the contract's own rejection reason.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Remote(remote) => remote.reason().unwrap_or_else(|| fallback.to_string()),
            other => other.to_string(),
        }
    }
}
