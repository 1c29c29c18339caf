#![allow(dead_code)]

use async_trait::async_trait;
use borsh::BorshSerialize;
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vaultkit_sdk::{
    core::connection::{ChainClient, ConnectionError, SimulationOutcome},
    interface::{Allowance, DepositRequest, RedeemRequest, WalletConfig},
    utils::{derive_allowance_pda, derive_deposit_request_pda, derive_redeem_request_pda},
    OwnerSigner, SaltNonce, SmartAccount, VaultKitConfig,
};

pub const NOW: i64 = 1_700_000_000;
pub const SALT: SaltNonce = SaltNonce(42);

/// Network identity reported by the mock cluster.
pub fn genesis() -> Hash {
    Hash::new_from_array([7u8; 32])
}

/// What `get_signature_status` reports for submitted transactions.
#[derive(Debug, Clone)]
pub enum StatusScript {
    /// Confirmed after `polls` pending answers
    Confirm { polls: usize },
    Fail(TransactionError),
    /// Never observed as included
    Pending,
}

//=============================================================================
// In-memory chain
//=============================================================================

pub struct MockChainClient {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    now: AtomicI64,
    calls: AtomicUsize,
    offline: AtomicBool,
    send_unacknowledged: AtomicBool,
    simulation: Mutex<SimulationOutcome>,
    status: Mutex<StatusScript>,
    status_polls: AtomicUsize,
    simulated: Mutex<Vec<Transaction>>,
    sent: Mutex<Vec<Transaction>>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainClient {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            now: AtomicI64::new(NOW),
            calls: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
            send_unacknowledged: AtomicBool::new(false),
            simulation: Mutex::new(SimulationOutcome {
                units_consumed: Some(100_000),
                err: None,
                logs: vec![],
            }),
            status: Mutex::new(StatusScript::Confirm { polls: 0 }),
            status_polls: AtomicUsize::new(0),
            simulated: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Total number of calls made against the chain, reads and writes.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Sends still reach the cluster but the node answers with an error.
    pub fn set_send_unacknowledged(&self, unacknowledged: bool) {
        self.send_unacknowledged.store(unacknowledged, Ordering::SeqCst);
    }

    pub fn set_now(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn set_simulation(&self, outcome: SimulationOutcome) {
        *self.simulation.lock().unwrap() = outcome;
    }

    pub fn set_status(&self, script: StatusScript) {
        *self.status.lock().unwrap() = script;
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn simulated(&self) -> Vec<Transaction> {
        self.simulated.lock().unwrap().clone()
    }

    pub fn put_account(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        let account = Account {
            lamports: 1_000_000,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        };
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn put_borsh<T: BorshSerialize>(&self, address: Pubkey, owner: Pubkey, value: &T) {
        self.put_account(address, owner, borsh::to_vec(value).unwrap());
    }

    /// Mark `account` as deployed by writing its wallet config.
    pub fn deploy(&self, config: &VaultKitConfig, account: &SmartAccount) {
        let wallet = WalletConfig {
            owner: account.owner.to_bytes(),
            salt: account.salt.0,
            bump: account.config_bump,
            account_bump: account.account_bump,
            nonce: 0,
        };
        self.put_borsh(account.config, config.wallet_program_id, &wallet);
    }

    /// Give `owner` an (empty) wrapped-SOL token account.
    pub fn put_wrapped_account(&self, owner: &Pubkey) {
        let address = spl_associated_token_account::get_associated_token_address(
            owner,
            &spl_token::native_mint::id(),
        );
        self.put_account(address, spl_token::id(), vec![0u8; 165]);
    }

    /// Permit allowance of `account.address` over the owner's asset.
    pub fn grant_allowance(
        &self,
        config: &VaultKitConfig,
        account: &SmartAccount,
        amount: u64,
        expiration: i64,
    ) {
        let address = derive_allowance_pda(
            &config.permit_program_id,
            &account.owner,
            &config.asset_mint,
            &account.address,
        );
        let allowance = Allowance {
            amount,
            expiration,
            nonce: 0,
        };
        self.put_borsh(address, config.permit_program_id, &allowance);
    }

    pub fn put_deposit_request(
        &self,
        config: &VaultKitConfig,
        account: &SmartAccount,
        request: DepositRequest,
    ) {
        let address =
            derive_deposit_request_pda(&config.vault_program_id, &config.vault, &account.address);
        self.put_borsh(address, config.vault_program_id, &request);
    }

    pub fn put_redeem_request(
        &self,
        config: &VaultKitConfig,
        account: &SmartAccount,
        request: RedeemRequest,
    ) {
        let address =
            derive_redeem_request_pda(&config.vault_program_id, &config.vault, &account.address);
        self.put_borsh(address, config.vault_program_id, &request);
    }

    fn touch(&self) -> Result<(), ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err("connection refused".into());
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ConnectionError> {
        self.touch()?;
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_genesis_hash(&self) -> Result<Hash, ConnectionError> {
        self.touch()?;
        Ok(genesis())
    }

    async fn get_unix_timestamp(&self) -> Result<i64, ConnectionError> {
        self.touch()?;
        Ok(self.now.load(Ordering::SeqCst))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ConnectionError> {
        self.touch()?;
        Ok(Hash::new_from_array([9u8; 32]))
    }

    async fn simulate_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<SimulationOutcome, ConnectionError> {
        self.touch()?;
        self.simulated.lock().unwrap().push(tx.clone());
        Ok(self.simulation.lock().unwrap().clone())
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ConnectionError> {
        self.touch()?;
        let signature = *tx.signatures.first().ok_or("No signature")?;
        self.sent.lock().unwrap().push(tx.clone());
        if self.send_unacknowledged.load(Ordering::SeqCst) {
            return Err("send_transaction: request timed out".into());
        }
        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, ConnectionError> {
        self.touch()?;
        let polls = self.status_polls.fetch_add(1, Ordering::SeqCst);
        match &*self.status.lock().unwrap() {
            StatusScript::Confirm { polls: pending } if polls < *pending => Ok(None),
            StatusScript::Confirm { .. } => Ok(Some(Ok(()))),
            StatusScript::Fail(err) => Ok(Some(Err(err.clone()))),
            StatusScript::Pending => Ok(None),
        }
    }
}

//=============================================================================
// Fixtures
//=============================================================================

/// Config for a wrapped-SOL vault with fast confirmation polling.
pub fn test_config() -> VaultKitConfig {
    let mut config = VaultKitConfig::new(
        Pubkey::new_unique(),
        spl_token::native_mint::id(),
        Pubkey::new_unique(),
        9,
    );
    config.confirmation_timeout_ms = 2_000;
    config.poll_interval_ms = 5;
    config
}

/// Config whose asset is a plain SPL token, not wrapped SOL.
pub fn token_config() -> VaultKitConfig {
    let mut config = test_config();
    config.asset_mint = Pubkey::new_unique();
    config.asset_decimals = 6;
    config
}

/// Signer that always declines, like a user closing the wallet prompt.
pub struct RejectingSigner {
    pub key: Pubkey,
}

#[async_trait]
impl OwnerSigner for RejectingSigner {
    fn pubkey(&self) -> Pubkey {
        self.key
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Signature, String> {
        Err("user rejected the request".to_string())
    }
}
