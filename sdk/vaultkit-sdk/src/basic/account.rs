use crate::core::connection::ChainClient;
use crate::error::{Result, VaultKitError};
use crate::types::{SaltNonce, SmartAccount};
use crate::utils::{self, derive_account_pda, derive_config_pda};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use vaultkit_interface::WalletConfig;

/// Resolves the deterministic smart account of an owner and whether it exists.
pub struct AccountResolver {
    client: Arc<dyn ChainClient>,
    wallet_program_id: Pubkey,
    last: Mutex<Option<SmartAccount>>,
}

impl AccountResolver {
    pub fn new(client: Arc<dyn ChainClient>, wallet_program_id: Pubkey) -> Self {
        Self {
            client,
            wallet_program_id,
            last: Mutex::new(None),
        }
    }

    /// Pure address derivation; the same inputs always give the same account.
    /// `is_deployed` is left `false`.
    pub fn derive(&self, owner: &Pubkey, network: Hash, salt: SaltNonce) -> SmartAccount {
        let (config, config_bump) = derive_config_pda(&self.wallet_program_id, owner, salt);
        let (address, account_bump) = derive_account_pda(&self.wallet_program_id, &config);
        SmartAccount {
            owner: *owner,
            address,
            config,
            config_bump,
            account_bump,
            salt,
            network,
            is_deployed: false,
        }
    }

    /// Resolve the account for `owner` on `network`.
    ///
    /// The deployment flag is read from chain on every call. A previous
    /// resolution is only reused when owner, network and salt all match.
    #[instrument(skip(self, salt), fields(salt = salt.0))]
    pub async fn resolve(
        &self,
        owner: Option<Pubkey>,
        network: Hash,
        salt: SaltNonce,
    ) -> Result<SmartAccount> {
        let owner = owner.ok_or(VaultKitError::OwnerMissing)?;

        let connected = self
            .client
            .get_genesis_hash()
            .await
            .map_err(VaultKitError::connectivity)?;
        if connected != network {
            return Err(VaultKitError::Precondition(format!(
                "client is connected to cluster {}, account requested on {}",
                connected, network
            )));
        }

        let mut last = self.last.lock().await;
        let mut account = match last.as_ref() {
            Some(prev) if prev.matches(&owner, &network, salt) => prev.clone(),
            Some(prev) => {
                info!(
                    previous_owner = %prev.owner,
                    previous_salt = prev.salt.0,
                    %owner,
                    "Owner, network or salt changed, re-deriving smart account"
                );
                self.derive(&owner, network, salt)
            },
            None => self.derive(&owner, network, salt),
        };

        account.is_deployed = self.is_deployed(&account).await?;
        debug!(
            address = %account.address,
            deployed = account.is_deployed,
            "Resolved smart account"
        );

        *last = Some(account.clone());
        Ok(account)
    }

    /// Last resolved account, if any.
    pub async fn current(&self) -> Option<SmartAccount> {
        self.last.lock().await.clone()
    }

    /// Record that `address` was created by a confirmed deployment envelope.
    pub async fn mark_deployed(&self, address: &Pubkey) {
        if let Some(account) = self.last.lock().await.as_mut() {
            if account.address == *address {
                account.is_deployed = true;
            }
        }
    }

    /// Forget the last resolution, e.g. on disconnect.
    pub async fn invalidate(&self) {
        self.last.lock().await.take();
    }

    async fn is_deployed(&self, account: &SmartAccount) -> Result<bool> {
        let config: Option<WalletConfig> =
            utils::fetch_decoded(self.client.as_ref(), &account.config, &self.wallet_program_id)
                .await?;
        match config {
            None => Ok(false),
            Some(config) if config.owner == account.owner.to_bytes() => Ok(true),
            Some(config) => Err(VaultKitError::InvalidAccountData {
                address: account.config,
                reason: format!(
                    "deployed for owner {}, expected {}",
                    Pubkey::new_from_array(config.owner),
                    account.owner
                ),
            }),
        }
    }
}
