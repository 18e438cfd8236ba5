use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
};

use alloy_primitives::{B256, hex};
use alloy_sol_types::{Revert, SolError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

/// EIP-1193 code for "user rejected the request".
pub const USER_REJECTED: i64 = 4001;

const REVERT_PREFIX: &str = "execution reverted";
const HARDHAT_PREFIX: &str = "reverted with reason string '";

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Transaction {tx} reverted")]
    Reverted { tx: B256 },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Value out of range for {0}")]
    OutOfRange(&'static str),
}

impl RemoteError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, RemoteError::Rpc { code, .. } if *code == USER_REJECTED)
    }

    /// Human-readable rejection reason supplied by the contract, if any.
    pub fn reason(&self) -> Option<String> {
        let RemoteError::Rpc { message, data, .. } = self else {
            return None;
        };

        if let Some(reason) = data
            .as_ref()
            .and_then(revert_data)
            .and_then(|bytes| Revert::abi_decode(&bytes, true).ok())
            .map(|revert| revert.reason)
        {
            return Some(reason);
        }

        if let Some((_, quoted)) = message.split_once(HARDHAT_PREFIX) {
            return quoted.split('\'').next().map(str::to_string);
        }

        message
            .strip_prefix(REVERT_PREFIX)
            .map(|rest| rest.trim_start_matches(':').trim().to_string())
            .filter(|reason| !reason.is_empty())
    }
}

// Nodes put revert bytes either directly in `data` or under `data.data`.
fn revert_data(data: &Value) -> Option<Vec<u8>> {
    let encoded = match data {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("data")?.as_str()?,
        _ => return None,
    };

    hex::decode(encoded).ok()
}

/// EIP-1193 request surface of an injected wallet.
pub trait Provider: Send + Sync {
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, RemoteError>> + Send;
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcFailure>,
}

#[derive(Deserialize)]
struct RpcFailure {
    code: i64,
    message: String,
    data: Option<Value>,
}

pub struct HttpProvider {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Provider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("-> {method} #{id}");

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let body: RpcResponse = response.json().await?;

        into_result(body)
    }
}

fn into_result(body: RpcResponse) -> Result<Value, RemoteError> {
    if let Some(failure) = body.error {
        return Err(RemoteError::Rpc {
            code: failure.code,
            message: failure.message,
            data: failure.data,
        });
    }

    Ok(body.result.unwrap_or(Value::Null))
}
