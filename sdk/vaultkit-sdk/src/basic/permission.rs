use crate::core::connection::ChainClient;
use crate::error::{Result, VaultKitError};
use crate::types::PermissionState;
use crate::utils::{self, derive_allowance_pda};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;
use vaultkit_interface::Allowance;

/// Decides whether a meta-approval must precede a transfer.
///
/// Nothing is cached: a concurrent transaction elsewhere may have spent or
/// replaced the allowance since the last check.
pub struct PermissionPlanner {
    client: Arc<dyn ChainClient>,
    permit_program_id: Pubkey,
}

impl PermissionPlanner {
    pub fn new(client: Arc<dyn ChainClient>, permit_program_id: Pubkey) -> Self {
        Self {
            client,
            permit_program_id,
        }
    }

    /// Current allowance of `spender` over `owner`'s `mint` tokens.
    ///
    /// `granted` holds only if the allowance covers `required` and has not
    /// expired; an expired allowance counts as no allowance.
    pub async fn check_permission(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        spender: &Pubkey,
        required: u64,
    ) -> Result<PermissionState> {
        let now = self.now().await?;
        self.check_permission_at(owner, mint, spender, required, now)
            .await
    }

    /// Same as `check_permission` against a chain time the caller already read.
    pub async fn check_permission_at(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        spender: &Pubkey,
        required: u64,
        now: i64,
    ) -> Result<PermissionState> {
        let address = derive_allowance_pda(&self.permit_program_id, owner, mint, spender);
        let allowance: Allowance =
            utils::fetch_decoded(self.client.as_ref(), &address, &self.permit_program_id)
                .await?
                .unwrap_or_default();

        let state = PermissionState {
            granted: allowance.amount >= required && allowance.is_live(now),
            amount: allowance.amount,
            expiry: allowance.expiration,
        };
        debug!(
            %owner,
            %spender,
            required,
            allowance = state.amount,
            expiry = state.expiry,
            now,
            granted = state.granted,
            "Checked permit allowance"
        );
        Ok(state)
    }

    /// Chain time, used both for expiry checks and for new permit deadlines.
    pub async fn now(&self) -> Result<i64> {
        self.client
            .get_unix_timestamp()
            .await
            .map_err(VaultKitError::connectivity)
    }
}
