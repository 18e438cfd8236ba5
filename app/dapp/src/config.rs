use std::{env, fmt::Display, str::FromStr, time::Duration};

use alloy_primitives::Address;
use ballot::CONTRACT_ADDRESS;
use tracing::{info, warn};

use crate::error::AppError;

pub struct Config {
    /// Unset means no wallet is injected.
    pub wallet_url: Option<String>,
    pub contract_address: Address,
    pub receipt_poll: Duration,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            wallet_url: var("WALLET_RPC_URL").ok(),
            contract_address: try_load("CONTRACT_ADDRESS", CONTRACT_ADDRESS)?,
            receipt_poll: Duration::from_millis(try_load("RECEIPT_POLL_MS", "1000")?),
        })
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    parse(
        key,
        var(key).unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }),
    )
}

fn parse<T: FromStr>(key: &str, raw: String) -> Result<T, AppError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        AppError::Config(format!("{key}={raw}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_contract_address() {
        let address: Address = parse("CONTRACT_ADDRESS", CONTRACT_ADDRESS.to_string()).unwrap();
        assert_eq!(
            address.to_string().to_lowercase(),
            CONTRACT_ADDRESS.to_lowercase()
        );
    }

    #[test]
    fn test_address_case_insensitive() {
        let lower: Address = parse("CONTRACT_ADDRESS", CONTRACT_ADDRESS.to_lowercase()).unwrap();
        let upper: Address = parse(
            "CONTRACT_ADDRESS",
            format!("0x{}", CONTRACT_ADDRESS[2..].to_uppercase()),
        )
        .unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse::<u64>("RECEIPT_POLL_MS", "soon".into()),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            parse::<Address>("CONTRACT_ADDRESS", "0x1234".into()),
            Err(AppError::Config(_))
        ));
    }
}
