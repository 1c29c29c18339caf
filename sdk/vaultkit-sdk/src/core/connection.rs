use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use std::error::Error;

pub type ConnectionError = Box<dyn Error + Send + Sync>;

/// Result of a preflight simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationOutcome {
    /// Compute units the transaction consumed, when the node reports it
    pub units_consumed: Option<u64>,
    /// Set when the transaction would fail
    pub err: Option<TransactionError>,
    pub logs: Vec<String>,
}

/// Chain read/write capability injected into every component.
///
/// Implementations: `RpcChainClient` for a live cluster, in-memory mocks in tests.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ConnectionError>;

    /// Genesis hash of the cluster, used as the network identity.
    async fn get_genesis_hash(&self) -> Result<Hash, ConnectionError>;

    /// Cluster unix timestamp, in seconds.
    async fn get_unix_timestamp(&self) -> Result<i64, ConnectionError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, ConnectionError>;

    /// Simulate without signature verification.
    async fn simulate_transaction(&self, tx: &Transaction)
        -> Result<SimulationOutcome, ConnectionError>;

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ConnectionError>;

    /// `None` while the transaction is not yet observed as included.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, ConnectionError>;
}
