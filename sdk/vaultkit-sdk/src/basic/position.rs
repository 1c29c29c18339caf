use crate::config::VaultKitConfig;
use crate::core::connection::ChainClient;
use crate::error::{Result, VaultKitError};
use crate::types::{SmartAccount, VaultPosition};
use crate::utils::{self, derive_deposit_request_pda, derive_redeem_request_pda};
use std::sync::Arc;
use tracing::{debug, warn};
use vaultkit_interface::{DepositRequest, RedeemRequest};

/// Reads the request state a smart account holds in the vault.
pub struct PositionReader {
    client: Arc<dyn ChainClient>,
    config: Arc<VaultKitConfig>,
}

impl PositionReader {
    pub fn new(client: Arc<dyn ChainClient>, config: Arc<VaultKitConfig>) -> Self {
        Self { client, config }
    }

    /// Pending and claimable amounts for `account`. A request that was never
    /// opened reads as zero.
    ///
    /// With `simulation_mode` on, an unreachable chain yields
    /// `VaultPosition::simulated()` instead of an error.
    pub async fn fetch(&self, account: &SmartAccount) -> Result<VaultPosition> {
        match self.read(account).await {
            Err(VaultKitError::Connectivity(reason)) if self.config.simulation_mode => {
                warn!(
                    account = %account.address,
                    %reason,
                    "Chain unreachable, serving simulated position"
                );
                Ok(VaultPosition::simulated())
            },
            other => other,
        }
    }

    async fn read(&self, account: &SmartAccount) -> Result<VaultPosition> {
        let program_id = &self.config.vault_program_id;
        let deposit_address =
            derive_deposit_request_pda(program_id, &self.config.vault, &account.address);
        let redeem_address =
            derive_redeem_request_pda(program_id, &self.config.vault, &account.address);

        let deposit: Option<DepositRequest> =
            utils::fetch_decoded(self.client.as_ref(), &deposit_address, program_id).await?;
        let redeem: Option<RedeemRequest> =
            utils::fetch_decoded(self.client.as_ref(), &redeem_address, program_id).await?;

        let mut position = VaultPosition::default();
        if let Some(deposit) = deposit {
            position.pending_deposit = deposit.pending_assets;
            position.claimable_deposit = deposit.claimable_assets;
            position.claimable_shares = deposit.claimable_shares;
        }
        if let Some(redeem) = redeem {
            position.pending_redeem = redeem.pending_shares;
            position.claimable_assets = redeem.claimable_assets;
        }

        debug!(account = %account.address, ?position, "Read vault position");
        Ok(position)
    }
}
