use crate::basic::account::AccountResolver;
use crate::basic::builder::BatchBuilder;
use crate::basic::executor::BatchExecutor;
use crate::basic::position::PositionReader;
use crate::basic::status::StatusTracker;
use crate::config::VaultKitConfig;
use crate::core::connection::ChainClient;
use crate::core::signer::OwnerSigner;
use crate::error::{Result, VaultKitError};
use crate::types::{
    Intent, OperationPlan, SaltNonce, SmartAccount, TransactionHandle, VaultPosition,
};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{info, instrument};

/// One owner's session against one vault.
///
/// Holds the salt for its whole lifetime, so the resolved account stays put
/// until the owner or the cluster changes.
pub struct VaultSession {
    config: Arc<VaultKitConfig>,
    salt: SaltNonce,
    resolver: AccountResolver,
    builder: BatchBuilder,
    executor: BatchExecutor,
    positions: PositionReader,
}

impl VaultSession {
    pub fn new(
        client: Arc<dyn ChainClient>,
        config: VaultKitConfig,
        salt: SaltNonce,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let tracker = Arc::new(StatusTracker::new());
        Ok(Self {
            resolver: AccountResolver::new(client.clone(), config.wallet_program_id),
            builder: BatchBuilder::new(client.clone(), config.clone())?,
            executor: BatchExecutor::new(client.clone(), config.clone(), tracker)?,
            positions: PositionReader::new(client, config.clone()),
            config,
            salt,
        })
    }

    pub fn config(&self) -> &VaultKitConfig {
        &self.config
    }

    pub fn salt(&self) -> SaltNonce {
        self.salt
    }

    pub fn tracker(&self) -> &Arc<StatusTracker> {
        self.executor.tracker()
    }

    /// Resolve the smart account of `owner` on `network`.
    /// Call again whenever the connected owner or cluster changes.
    #[instrument(skip(self, owner), fields(owner = ?owner))]
    pub async fn connect(&self, owner: Option<Pubkey>, network: Hash) -> Result<SmartAccount> {
        self.resolver.resolve(owner, network, self.salt).await
    }

    pub async fn disconnect(&self) {
        self.resolver.invalidate().await;
    }

    /// The account resolved by the last `connect`.
    pub async fn account(&self) -> Result<SmartAccount> {
        self.resolver.current().await.ok_or_else(|| {
            VaultKitError::Precondition("no smart account resolved, connect first".to_string())
        })
    }

    /// Build the plan for `intent` without submitting anything.
    pub async fn plan(&self, intent: &Intent) -> Result<OperationPlan> {
        let account = self.account().await?;
        self.builder.build(intent, &account).await
    }

    /// Build, sign and submit `intent`, returning once it is included.
    #[instrument(skip(self, intent, signer), fields(intent = ?intent.kind()))]
    pub async fn submit(
        &self,
        intent: Intent,
        signer: &dyn OwnerSigner,
    ) -> Result<TransactionHandle> {
        let account = self.account().await?;
        if self.executor.is_busy(&account.address) {
            return Err(VaultKitError::Precondition(format!(
                "an operation for {} is already in flight",
                account.address
            )));
        }

        let plan = self.builder.build(&intent, &account).await?;
        let handle = self.executor.execute(&plan, &account, signer).await?;
        if handle.deployed_account {
            self.resolver.mark_deployed(&account.address).await;
            info!(account = %account.address, "Smart account deployed");
        }
        Ok(handle)
    }

    pub async fn position(&self) -> Result<VaultPosition> {
        let account = self.account().await?;
        self.positions.fetch(&account).await
    }

    pub async fn supply(
        &self,
        amount: u64,
        wrap_native: bool,
        signer: &dyn OwnerSigner,
    ) -> Result<TransactionHandle> {
        self.submit(
            Intent::Supply {
                amount,
                wrap_native,
            },
            signer,
        )
        .await
    }

    pub async fn exit(&self, amount: u64, signer: &dyn OwnerSigner) -> Result<TransactionHandle> {
        self.submit(Intent::Exit { amount }, signer).await
    }

    pub async fn vault_deposit(
        &self,
        amount: u64,
        signer: &dyn OwnerSigner,
    ) -> Result<TransactionHandle> {
        self.submit(Intent::VaultDeposit { amount }, signer).await
    }

    pub async fn vault_withdraw(
        &self,
        amount: u64,
        signer: &dyn OwnerSigner,
    ) -> Result<TransactionHandle> {
        self.submit(Intent::VaultWithdraw { amount }, signer).await
    }

    pub async fn redeem(&self, shares: u64, signer: &dyn OwnerSigner) -> Result<TransactionHandle> {
        self.submit(Intent::Redeem { shares }, signer).await
    }

    pub async fn cancel_deposit(&self, signer: &dyn OwnerSigner) -> Result<TransactionHandle> {
        self.submit(Intent::CancelDeposit, signer).await
    }
}
