use crate::advanced::instructions;
use crate::basic::permission::PermissionPlanner;
use crate::config::VaultKitConfig;
use crate::core::connection::ChainClient;
use crate::core::constants::BPS_DENOMINATOR;
use crate::error::{Result, VaultKitError};
use crate::types::{CallDescriptor, Intent, IntentKind, OperationPlan, SmartAccount};
use crate::utils::{derive_config_pda, token_account};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Fee taken from a supply and the part that reaches the vault.
/// `fee + depositable == amount` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: u64,
    pub depositable: u64,
}

/// Split `amount` at `rate_bps`, rounding the fee down so that no more than
/// the authorized amount is ever moved. Rates above 100% are rejected.
pub fn split_fee(amount: u64, rate_bps: u16) -> Result<FeeSplit> {
    if rate_bps as u128 > BPS_DENOMINATOR {
        return Err(VaultKitError::Config(format!(
            "fee rate {} bps exceeds {}",
            rate_bps, BPS_DENOMINATOR
        )));
    }
    // rate <= denominator, so fee <= amount
    let fee = (amount as u128 * rate_bps as u128 / BPS_DENOMINATOR) as u64;
    Ok(FeeSplit {
        fee,
        depositable: amount - fee,
    })
}

/// Turns an intent into the ordered calls it needs against current chain state.
///
/// Only reads the chain; never submits. Building the same intent twice
/// without an intervening state change yields the same plan.
pub struct BatchBuilder {
    client: Arc<dyn ChainClient>,
    config: Arc<VaultKitConfig>,
    planner: PermissionPlanner,
}

impl BatchBuilder {
    /// Fails with `Config` when `config` does not validate.
    pub fn new(client: Arc<dyn ChainClient>, config: Arc<VaultKitConfig>) -> Result<Self> {
        config.validate()?;
        let planner = PermissionPlanner::new(client.clone(), config.permit_program_id);
        Ok(Self {
            client,
            config,
            planner,
        })
    }

    pub fn config(&self) -> &VaultKitConfig {
        &self.config
    }

    pub async fn build(&self, intent: &Intent, account: &SmartAccount) -> Result<OperationPlan> {
        match *intent {
            Intent::Supply {
                amount,
                wrap_native,
            } => self.supply(account, amount, wrap_native).await,
            Intent::Exit { amount } => self.exit(account, amount),
            Intent::VaultDeposit { amount } => self.vault_deposit(account, amount),
            Intent::VaultWithdraw { amount } => self.vault_withdraw(account, amount),
            Intent::Redeem { shares } => self.redeem(account, shares),
            Intent::CancelDeposit => self.cancel_deposit(account),
        }
    }

    /// `[create_wrapped?] [wrap?] [approve?] transfer_from [fee?] request_deposit`
    ///
    /// `create_wrapped` only appears when wrapping for an owner that has no
    /// wrapped-native token account yet.
    pub async fn supply(
        &self,
        account: &SmartAccount,
        amount: u64,
        wrap_native: bool,
    ) -> Result<OperationPlan> {
        ensure_amount(amount, "supply")?;
        self.ensure_account(account)?;
        if wrap_native && self.config.asset_mint != spl_token::native_mint::id() {
            return Err(VaultKitError::Precondition(format!(
                "cannot wrap native currency into {}",
                self.config.asset_mint
            )));
        }

        let split = split_fee(amount, self.config.fee_rate_bps())?;
        if split.depositable == 0 {
            return Err(VaultKitError::InvalidAmount(format!(
                "nothing left to deposit from {} after a fee of {}",
                amount, split.fee
            )));
        }

        let now = self.planner.now().await?;
        let permission = self
            .planner
            .check_permission_at(
                &account.owner,
                &self.config.asset_mint,
                &account.address,
                amount,
                now,
            )
            .await?;

        let create_wrapped = wrap_native && !self.has_wrapped_account(&account.owner).await?;

        let mut calls = Vec::with_capacity(6);
        if create_wrapped {
            calls.push(instructions::create_wrapped_account(&account.owner));
        }
        if wrap_native {
            calls.push(instructions::wrap_native(&account.owner, amount)?);
        }
        if !permission.granted {
            let expiration = now.saturating_add(self.config.permit_ttl_secs);
            calls.push(instructions::approve(
                &self.config,
                account,
                amount,
                expiration,
            )?);
        }
        calls.push(instructions::transfer_from(&self.config, account, amount)?);
        if let Some(fee) = self.config.fee.filter(|_| split.fee > 0) {
            calls.push(instructions::fee_transfer(
                &self.config,
                account,
                &fee.recipient,
                split.fee,
            )?);
        }
        calls.push(instructions::request_deposit(
            &self.config,
            account,
            split.depositable,
        )?);

        debug!(
            account = %account.address,
            amount,
            fee = split.fee,
            wrap_native,
            create_wrapped,
            approval = !permission.granted,
            steps = calls.len(),
            "Planned supply"
        );
        Ok(OperationPlan::new(IntentKind::Supply, calls))
    }

    /// Withdraw claimable assets and forward them to the owner.
    pub fn exit(&self, account: &SmartAccount, amount: u64) -> Result<OperationPlan> {
        ensure_amount(amount, "exit")?;
        self.ensure_account(account)?;
        let calls = vec![
            instructions::withdraw(&self.config, account, amount)?,
            instructions::forward_to_owner(&self.config, account, amount)?,
        ];
        Ok(self.single_intent(IntentKind::Exit, account, calls))
    }

    /// Claim shares of a settled deposit request.
    pub fn vault_deposit(&self, account: &SmartAccount, amount: u64) -> Result<OperationPlan> {
        ensure_amount(amount, "vault deposit")?;
        self.ensure_account(account)?;
        let calls = vec![instructions::claim_shares(&self.config, account, amount)?];
        Ok(self.single_intent(IntentKind::VaultDeposit, account, calls))
    }

    /// Withdraw claimable assets, keeping them in the smart account.
    pub fn vault_withdraw(&self, account: &SmartAccount, amount: u64) -> Result<OperationPlan> {
        ensure_amount(amount, "vault withdraw")?;
        self.ensure_account(account)?;
        let calls = vec![instructions::withdraw(&self.config, account, amount)?];
        Ok(self.single_intent(IntentKind::VaultWithdraw, account, calls))
    }

    pub fn redeem(&self, account: &SmartAccount, shares: u64) -> Result<OperationPlan> {
        ensure_amount(shares, "redeem")?;
        self.ensure_account(account)?;
        let calls = vec![instructions::request_redeem(&self.config, account, shares)?];
        Ok(self.single_intent(IntentKind::Redeem, account, calls))
    }

    pub fn cancel_deposit(&self, account: &SmartAccount) -> Result<OperationPlan> {
        self.ensure_account(account)?;
        let calls = vec![instructions::cancel_deposit_request(&self.config, account)?];
        Ok(self.single_intent(IntentKind::CancelDeposit, account, calls))
    }

    fn single_intent(
        &self,
        intent: IntentKind,
        account: &SmartAccount,
        calls: Vec<CallDescriptor>,
    ) -> OperationPlan {
        debug!(account = %account.address, ?intent, steps = calls.len(), "Planned operation");
        OperationPlan::new(intent, calls)
    }

    async fn has_wrapped_account(&self, owner: &Pubkey) -> Result<bool> {
        let wrapped = token_account(owner, &spl_token::native_mint::id());
        let account = self
            .client
            .get_account(&wrapped)
            .await
            .map_err(VaultKitError::connectivity)?;
        Ok(account.is_some())
    }

    /// The account must belong to a real owner and match its own derivation.
    fn ensure_account(&self, account: &SmartAccount) -> Result<()> {
        if account.owner == Pubkey::default() {
            return Err(VaultKitError::Precondition(
                "smart account has no owner".to_string(),
            ));
        }
        let (config, _) =
            derive_config_pda(&self.config.wallet_program_id, &account.owner, account.salt);
        if config != account.config {
            return Err(VaultKitError::Precondition(format!(
                "smart account {} was not resolved for owner {}",
                account.address, account.owner
            )));
        }
        Ok(())
    }
}

fn ensure_amount(amount: u64, what: &str) -> Result<()> {
    if amount == 0 {
        return Err(VaultKitError::InvalidAmount(format!(
            "{} amount must be greater than zero",
            what
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_is_floor_truncated() {
        let split = split_fee(1_000_000, 25).unwrap();
        assert_eq!(split.fee, 2_500);
        assert_eq!(split.depositable, 997_500);
        assert_eq!(split.fee + split.depositable, 1_000_000);
    }

    #[test]
    fn fee_rounds_down_on_small_amounts() {
        // 399 * 25 / 10000 = 0.9975
        let split = split_fee(399, 25).unwrap();
        assert_eq!(split.fee, 0);
        assert_eq!(split.depositable, 399);

        let split = split_fee(401, 25).unwrap();
        assert_eq!(split.fee, 1);
        assert_eq!(split.depositable, 400);
    }

    #[test]
    fn fee_does_not_overflow_at_max_amount() {
        let split = split_fee(u64::MAX, 10_000).unwrap();
        assert_eq!(split.fee, u64::MAX);
        assert_eq!(split.depositable, 0);

        let split = split_fee(u64::MAX, 9_999).unwrap();
        assert_eq!(split.fee + split.depositable, u64::MAX);
    }

    #[test]
    fn rate_above_full_amount_is_rejected() {
        assert!(matches!(
            split_fee(10_000, 10_001),
            Err(VaultKitError::Config(_))
        ));
        assert!(matches!(
            split_fee(u64::MAX, u16::MAX),
            Err(VaultKitError::Config(_))
        ));
        // Nothing to split, but the rate is still out of range
        assert!(split_fee(0, 10_001).is_err());
    }

    #[test]
    fn zero_rate_takes_nothing() {
        assert_eq!(
            split_fee(50, 0).unwrap(),
            FeeSplit {
                fee: 0,
                depositable: 50
            }
        );
    }
}
