use crate::advanced::instructions;
use crate::basic::status::StatusTracker;
use crate::config::VaultKitConfig;
use crate::core::connection::ChainClient;
use crate::core::constants::MAX_COMPUTE_UNIT_LIMIT;
use crate::core::signer::OwnerSigner;
use crate::error::{Result, VaultKitError};
use crate::types::{ExecutionPhase, IntentKind, OperationPlan, SmartAccount, TransactionHandle, TxStatus};
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Compute-unit limit for `units` plus `buffer_pct` percent, capped at the
/// runtime maximum.
pub fn buffered_unit_limit(units: u64, buffer_pct: u8) -> u32 {
    let limit = units as u128 * (100 + buffer_pct as u128) / 100;
    limit.min(MAX_COMPUTE_UNIT_LIMIT as u128) as u32
}

/// Drives an `OperationPlan` from construction to observed inclusion.
///
/// The whole plan is sent as one transaction under one owner signature.
/// When the account is not deployed yet, the deployment envelope travels in
/// the same transaction, so creation and the first operation settle together.
pub struct BatchExecutor {
    client: Arc<dyn ChainClient>,
    config: Arc<VaultKitConfig>,
    tracker: Arc<StatusTracker>,
    in_flight: Mutex<HashSet<Pubkey>>,
}

impl BatchExecutor {
    /// Fails with `Config` when `config` does not validate.
    pub fn new(
        client: Arc<dyn ChainClient>,
        config: Arc<VaultKitConfig>,
        tracker: Arc<StatusTracker>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            tracker,
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    pub fn tracker(&self) -> &Arc<StatusTracker> {
        &self.tracker
    }

    /// Whether an operation for `account` is currently between build and a
    /// terminal phase.
    pub fn is_busy(&self, account: &Pubkey) -> bool {
        self.lock_in_flight().contains(account)
    }

    /// Sign, submit and wait for `plan`.
    ///
    /// Returns only once inclusion has been observed. A second call for the
    /// same account while one is running fails with `Precondition`; nothing
    /// is queued.
    #[instrument(
        skip_all,
        fields(account = %account.address, intent = ?plan.intent(), steps = plan.len())
    )]
    pub async fn execute(
        &self,
        plan: &OperationPlan,
        account: &SmartAccount,
        signer: &dyn OwnerSigner,
    ) -> Result<TransactionHandle> {
        let _guard = self.acquire(&account.address)?;

        self.tracker
            .show(title(plan.intent()), "Preparing transaction");
        match self.run(plan, account, signer).await {
            Ok(handle) => {
                self.enter(handle.phase, format!("Confirmed {}", handle.signature));
                Ok(handle)
            },
            Err(e) => {
                let phase = e.terminal_phase();
                warn!(error = %e, ?phase, "Batch failed");
                self.enter(phase, e.to_string());
                Err(e)
            },
        }
    }

    /// Publish a phase transition to the status tracker.
    fn enter(&self, phase: ExecutionPhase, message: String) {
        let status = match phase {
            ExecutionPhase::Confirmed => TxStatus::Success,
            _ if phase.is_terminal() => TxStatus::Error,
            _ => TxStatus::Pending,
        };
        self.tracker.update(status, Some(message));
    }

    async fn run(
        &self,
        plan: &OperationPlan,
        account: &SmartAccount,
        signer: &dyn OwnerSigner,
    ) -> Result<TransactionHandle> {
        if plan.is_empty() {
            return Err(VaultKitError::Precondition(
                "refusing to submit an empty plan".to_string(),
            ));
        }
        if signer.pubkey() != account.owner {
            return Err(VaultKitError::Authorization(format!(
                "signer {} is not the owner {} of the account",
                signer.pubkey(),
                account.owner
            )));
        }

        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(VaultKitError::connectivity)?;
        let compute_unit_limit = self.estimate_unit_limit(plan, account, blockhash).await?;
        let message = Message::new_with_blockhash(
            &self.instructions(plan, account, compute_unit_limit)?,
            Some(&account.owner),
            &blockhash,
        );
        debug!(
            phase = ?ExecutionPhase::Built,
            compute_unit_limit,
            deploy = !account.is_deployed,
            value = plan.total_value(),
            "Batch built"
        );

        self.enter(
            ExecutionPhase::AwaitingSignature,
            "Waiting for signature".to_string(),
        );
        let signature = signer
            .sign_message(&message.serialize())
            .await
            .map_err(VaultKitError::Authorization)?;
        let tx = Transaction {
            signatures: vec![signature],
            message,
        };

        // Signed: even a failed send may still land
        let signature = self
            .client
            .send_transaction(&tx)
            .await
            .map_err(|e| VaultKitError::SubmissionFailed {
                signature,
                reason: e.to_string(),
            })?;
        info!(%signature, phase = ?ExecutionPhase::Submitted, "Batch submitted");
        self.enter(
            ExecutionPhase::Submitted,
            format!("Submitted {}, waiting for confirmation", signature),
        );

        self.confirm(&signature).await?;
        info!(%signature, phase = ?ExecutionPhase::Confirmed, "Batch confirmed");

        Ok(TransactionHandle {
            signature,
            phase: ExecutionPhase::Confirmed,
            deployed_account: !account.is_deployed,
            compute_unit_limit,
        })
    }

    /// `[set_compute_unit_limit, CreateWallet?, ExecuteBatch]`
    fn instructions(
        &self,
        plan: &OperationPlan,
        account: &SmartAccount,
        compute_unit_limit: u32,
    ) -> Result<Vec<Instruction>> {
        let mut ixs = Vec::with_capacity(3);
        ixs.push(ComputeBudgetInstruction::set_compute_unit_limit(
            compute_unit_limit,
        ));
        if !account.is_deployed {
            ixs.push(instructions::create_wallet(
                &self.config.wallet_program_id,
                account,
            )?);
        }
        ixs.push(instructions::execute_batch(
            &self.config.wallet_program_id,
            account,
            plan,
        )?);
        Ok(ixs)
    }

    /// Simulate at the maximum limit and add the configured buffer to the
    /// units consumed. A failing simulation means the batch would revert.
    async fn estimate_unit_limit(
        &self,
        plan: &OperationPlan,
        account: &SmartAccount,
        blockhash: Hash,
    ) -> Result<u32> {
        let message = Message::new_with_blockhash(
            &self.instructions(plan, account, MAX_COMPUTE_UNIT_LIMIT)?,
            Some(&account.owner),
            &blockhash,
        );
        let outcome = self
            .client
            .simulate_transaction(&Transaction::new_unsigned(message))
            .await
            .map_err(VaultKitError::connectivity)?;

        if let Some(err) = outcome.err {
            debug!(logs = ?outcome.logs, "Simulation failed");
            return Err(VaultKitError::Reverted {
                signature: None,
                reason: format!("simulation failed: {}", err),
            });
        }

        let limit = match outcome.units_consumed {
            Some(units) => buffered_unit_limit(units, self.config.gas_buffer_pct),
            None => MAX_COMPUTE_UNIT_LIMIT,
        };
        debug!(
            units = outcome.units_consumed,
            buffer_pct = self.config.gas_buffer_pct,
            limit,
            "Simulated batch"
        );
        Ok(limit)
    }

    async fn confirm(&self, signature: &Signature) -> Result<()> {
        let timeout = self.config.confirmation_timeout();
        match tokio::time::timeout(timeout, self.await_inclusion(signature)).await {
            Ok(result) => result,
            Err(_) => Err(VaultKitError::Timeout {
                signature: *signature,
                waited_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn await_inclusion(&self, signature: &Signature) -> Result<()> {
        let interval = self.config.poll_interval();
        loop {
            match self.client.get_signature_status(signature).await {
                Ok(Some(Ok(()))) => return Ok(()),
                Ok(Some(Err(err))) => {
                    return Err(VaultKitError::Reverted {
                        signature: Some(*signature),
                        reason: err.to_string(),
                    });
                },
                Ok(None) => {},
                // Already submitted: keep polling until the deadline
                Err(e) => warn!(%signature, error = %e, "Status poll failed"),
            }
            tokio::time::sleep(interval).await;
        }
    }

    fn acquire(&self, account: &Pubkey) -> Result<InFlightGuard<'_>> {
        if !self.lock_in_flight().insert(*account) {
            return Err(VaultKitError::Precondition(format!(
                "an operation for {} is already in flight",
                account
            )));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            account: *account,
        })
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<Pubkey>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Marks an account busy until dropped, on every exit path including a
/// dropped future.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Pubkey>>,
    account: Pubkey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self
            .set
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.account);
    }
}

fn title(intent: IntentKind) -> &'static str {
    match intent {
        IntentKind::Supply => "Supply",
        IntentKind::Exit => "Exit",
        IntentKind::VaultDeposit => "Claim shares",
        IntentKind::VaultWithdraw => "Withdraw",
        IntentKind::Redeem => "Redeem",
        IntentKind::CancelDeposit => "Cancel deposit",
    }
}
