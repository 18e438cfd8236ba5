//! # Contract Handle
//!
//! Typed binding of the voting contract to a signer.
//!
//! Writes are two-phase:
//! 1. `submit` sends `eth_sendTransaction` and returns the pending hash
//! 2. `confirm` polls `eth_getTransactionReceipt` until the network includes it
//!
//! There is no timeout on confirmation, a hung node keeps the caller waiting.
use std::{future::Future, sync::Arc, time::Duration};

use alloy_primitives::{Address, B256, Bytes, U64};
use alloy_sol_types::SolCall;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    Action, Candidate, RemoteError, Voter, VotingStatus, abi::IVote, announced, remote::Provider,
};

pub type TxHash = B256;

/// Fixed function surface of the external voting contract.
pub trait VotingContract: Send + Sync {
    fn election_commission(&self) -> impl Future<Output = Result<Address, RemoteError>> + Send;

    fn voter_list(&self) -> impl Future<Output = Result<Vec<Voter>, RemoteError>> + Send;

    fn candidate_list(&self) -> impl Future<Output = Result<Vec<Candidate>, RemoteError>> + Send;

    fn voting_status(&self) -> impl Future<Output = Result<VotingStatus, RemoteError>> + Send;

    /// `None` until a result has been announced.
    fn winner(&self) -> impl Future<Output = Result<Option<Address>, RemoteError>> + Send;

    fn submit(&self, action: &Action) -> impl Future<Output = Result<TxHash, RemoteError>> + Send;

    fn confirm(&self, tx: TxHash) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

#[derive(Deserialize)]
struct Receipt {
    status: Option<U64>,
}

pub struct RemoteContract<P> {
    provider: Arc<P>,
    address: Address,
    signer: Address,
    poll_interval: Duration,
}

impl<P: Provider> RemoteContract<P> {
    pub fn new(
        provider: Arc<P>,
        address: Address,
        signer: Address,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            address,
            signer,
            poll_interval,
        }
    }

    async fn call<C: SolCall + Send>(&self, call: C) -> Result<C::Return, RemoteError> {
        let request = json!({
            "from": self.signer,
            "to": self.address,
            "data": Bytes::from(call.abi_encode()),
        });

        let value = self
            .provider
            .request("eth_call", json!([request, "latest"]))
            .await?;
        let output: Bytes = decode(value)?;

        Ok(C::abi_decode_returns(&output, true)?)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RemoteError> {
    serde_json::from_value(value).map_err(|e| RemoteError::Malformed(e.to_string()))
}

impl<P: Provider> VotingContract for RemoteContract<P> {
    async fn election_commission(&self) -> Result<Address, RemoteError> {
        Ok(self.call(IVote::electionCommissionCall {}).await?._0)
    }

    async fn voter_list(&self) -> Result<Vec<Voter>, RemoteError> {
        self.call(IVote::getVoterListCall {})
            .await?
            ._0
            .into_iter()
            .map(Voter::try_from)
            .collect()
    }

    async fn candidate_list(&self) -> Result<Vec<Candidate>, RemoteError> {
        self.call(IVote::getCandidateListCall {})
            .await?
            ._0
            .into_iter()
            .map(Candidate::try_from)
            .collect()
    }

    async fn voting_status(&self) -> Result<VotingStatus, RemoteError> {
        VotingStatus::try_from(self.call(IVote::getVotingStatusCall {}).await?._0)
    }

    async fn winner(&self) -> Result<Option<Address>, RemoteError> {
        Ok(announced(self.call(IVote::winnerCall {}).await?._0))
    }

    async fn submit(&self, action: &Action) -> Result<TxHash, RemoteError> {
        let request = json!({
            "from": self.signer,
            "to": self.address,
            "data": Bytes::from(action.calldata()),
        });

        let value = self
            .provider
            .request("eth_sendTransaction", json!([request]))
            .await?;
        let tx: TxHash = decode(value)?;

        info!("{} submitted as {tx}", action.name());

        Ok(tx)
    }

    async fn confirm(&self, tx: TxHash) -> Result<(), RemoteError> {
        loop {
            let value = self
                .provider
                .request("eth_getTransactionReceipt", json!([tx]))
                .await?;

            if value.is_null() {
                debug!("{tx} not yet included, polling again");
                sleep(self.poll_interval).await;
                continue;
            }

            let receipt: Receipt = decode(value)?;

            // Pre-Byzantium receipts carry no status field.
            return match receipt.status {
                Some(status) if status.is_zero() => Err(RemoteError::Reverted { tx }),
                _ => {
                    info!("{tx} confirmed");
                    Ok(())
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use alloy_primitives::{address, hex};

    use super::*;

    struct Scripted {
        responses: Mutex<VecDeque<Value>>,
        methods: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                methods: Mutex::new(Vec::new()),
            })
        }
    }

    impl Provider for Scripted {
        async fn request(&self, method: &str, _params: Value) -> Result<Value, RemoteError> {
            self.methods.lock().unwrap().push(method.to_string());
            Ok(self.responses.lock().unwrap().pop_front().unwrap_or(Value::Null))
        }
    }

    const CONTRACT: Address = address!("d48b917257b7aa5b3e36ef2c567ff12f7b09d0b6");
    const SIGNER: Address = address!("00000000000000000000000000000000000000aa");

    fn contract(provider: Arc<Scripted>) -> RemoteContract<Scripted> {
        RemoteContract::new(provider, CONTRACT, SIGNER, Duration::from_millis(1))
    }

    fn word(bytes: B256) -> Value {
        Value::String(hex::encode_prefixed(bytes))
    }

    #[tokio::test]
    async fn test_reads_decode() {
        let commission = address!("00000000000000000000000000000000000000cc");
        let provider = Scripted::new(vec![
            word(commission.into_word()),
            word(B256::with_last_byte(1)),
            word(B256::ZERO),
        ]);
        let handle = contract(provider.clone());

        assert_eq!(handle.election_commission().await.unwrap(), commission);
        assert_eq!(
            handle.voting_status().await.unwrap(),
            VotingStatus::InProgress
        );
        assert_eq!(handle.winner().await.unwrap(), None);
        assert_eq!(
            *provider.methods.lock().unwrap(),
            vec!["eth_call", "eth_call", "eth_call"]
        );
    }

    #[tokio::test]
    async fn test_unknown_status_is_malformed() {
        let provider = Scripted::new(vec![word(B256::with_last_byte(9))]);

        assert!(matches!(
            contract(provider).voting_status().await,
            Err(RemoteError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_then_confirm() {
        let tx = B256::with_last_byte(0x42);
        let provider = Scripted::new(vec![
            word(tx),
            Value::Null,
            Value::Null,
            json!({ "status": "0x1" }),
        ]);
        let handle = contract(provider.clone());

        let submitted = handle.submit(&Action::AnnounceResult).await.unwrap();
        assert_eq!(submitted, tx);
        handle.confirm(submitted).await.unwrap();

        assert_eq!(
            *provider.methods.lock().unwrap(),
            vec![
                "eth_sendTransaction",
                "eth_getTransactionReceipt",
                "eth_getTransactionReceipt",
                "eth_getTransactionReceipt",
            ]
        );
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let tx = B256::with_last_byte(7);
        let provider = Scripted::new(vec![json!({ "status": "0x0" })]);

        assert!(matches!(
            contract(provider).confirm(tx).await,
            Err(RemoteError::Reverted { tx: reverted }) if reverted == tx
        ));
    }
}
