use crate::core::connection::{ChainClient, ConnectionError, SimulationOutcome};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSimulateTransactionConfig;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use std::sync::Arc;

/// `ChainClient` backed by a JSON-RPC node.
#[derive(Clone)]
pub struct RpcChainClient {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl RpcChainClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::new_with_commitment(url, CommitmentConfig::confirmed())
    }

    pub fn new_with_commitment(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: Arc::new(RpcClient::new_with_commitment(url.into(), commitment)),
            commitment,
        }
    }

    pub fn from_client(client: Arc<RpcClient>) -> Self {
        let commitment = client.commitment();
        Self { client, commitment }
    }
}

fn boxed(e: solana_client::client_error::ClientError) -> ConnectionError {
    Box::new(e)
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ConnectionError> {
        let response = self
            .client
            .get_account_with_commitment(pubkey, self.commitment)
            .await
            .map_err(boxed)?;
        Ok(response.value)
    }

    async fn get_genesis_hash(&self) -> Result<Hash, ConnectionError> {
        self.client.get_genesis_hash().await.map_err(boxed)
    }

    async fn get_unix_timestamp(&self) -> Result<i64, ConnectionError> {
        let slot = self.client.get_slot().await.map_err(boxed)?;
        self.client.get_block_time(slot).await.map_err(boxed)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ConnectionError> {
        self.client.get_latest_blockhash().await.map_err(boxed)
    }

    async fn simulate_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<SimulationOutcome, ConnectionError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.commitment),
            ..RpcSimulateTransactionConfig::default()
        };
        let result = self
            .client
            .simulate_transaction_with_config(tx, config)
            .await
            .map_err(boxed)?
            .value;

        Ok(SimulationOutcome {
            units_consumed: result.units_consumed,
            err: result.err,
            logs: result.logs.unwrap_or_default(),
        })
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ConnectionError> {
        self.client.send_transaction(tx).await.map_err(boxed)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, ConnectionError> {
        self.client
            .get_signature_status_with_commitment(signature, self.commitment)
            .await
            .map_err(boxed)
    }
}
