use crate::core::connection::ChainClient;
use crate::error::{Result, VaultKitError};
use crate::types::SaltNonce;
use borsh::BorshDeserialize;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use vaultkit_interface::permit::ALLOWANCE_SEED;
use vaultkit_interface::vault::{DEPOSIT_REQUEST_SEED, REDEEM_REQUEST_SEED};
use vaultkit_interface::wallet::{ACCOUNT_SEED, CONFIG_SEED};
use vaultkit_interface::IMPLEMENTATION_VERSION;

//=============================================================================
// PDA Derivation Helpers
//=============================================================================

/// Derive the Config PDA from the owner, implementation version and salt
pub fn derive_config_pda(program_id: &Pubkey, owner: &Pubkey, salt: SaltNonce) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            CONFIG_SEED,
            owner.as_ref(),
            IMPLEMENTATION_VERSION.as_bytes(),
            &salt.to_le_bytes(),
        ],
        program_id,
    )
}

/// Derive the account PDA (the address that holds funds) from the config PDA
pub fn derive_account_pda(program_id: &Pubkey, config_pda: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ACCOUNT_SEED, config_pda.as_ref()], program_id)
}

pub fn derive_allowance_pda(
    permit_program_id: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    spender: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            ALLOWANCE_SEED,
            owner.as_ref(),
            mint.as_ref(),
            spender.as_ref(),
        ],
        permit_program_id,
    )
    .0
}

pub fn derive_deposit_request_pda(
    vault_program_id: &Pubkey,
    vault: &Pubkey,
    controller: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[DEPOSIT_REQUEST_SEED, vault.as_ref(), controller.as_ref()],
        vault_program_id,
    )
    .0
}

pub fn derive_redeem_request_pda(
    vault_program_id: &Pubkey,
    vault: &Pubkey,
    controller: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[REDEEM_REQUEST_SEED, vault.as_ref(), controller.as_ref()],
        vault_program_id,
    )
    .0
}

/// Associated token account of `wallet` for `mint`. Works for PDAs too.
pub fn token_account(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(wallet, mint)
}

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

/// Fetch an account, mapping RPC failures to `Connectivity`
pub async fn fetch_account(
    client: &(impl ChainClient + ?Sized),
    address: &Pubkey,
) -> Result<Option<Account>> {
    client
        .get_account(address)
        .await
        .map_err(VaultKitError::connectivity)
}

/// Fetch an account owned by `program_id` and decode its borsh data.
/// Returns `None` when the account does not exist.
pub async fn fetch_decoded<T: BorshDeserialize>(
    client: &(impl ChainClient + ?Sized),
    address: &Pubkey,
    program_id: &Pubkey,
) -> Result<Option<T>> {
    match fetch_account(client, address).await? {
        None => Ok(None),
        Some(account) => decode_account(address, &account, program_id).map(Some),
    }
}

/// Decode account data written by `program_id`. Trailing bytes are allowed
/// since programs may over-allocate.
pub fn decode_account<T: BorshDeserialize>(
    address: &Pubkey,
    account: &Account,
    program_id: &Pubkey,
) -> Result<T> {
    if account.owner != *program_id {
        return Err(VaultKitError::InvalidAccountData {
            address: *address,
            reason: format!("owned by {}, expected {}", account.owner, program_id),
        });
    }
    let mut data = account.data.as_slice();
    T::deserialize(&mut data).map_err(|e| VaultKitError::InvalidAccountData {
        address: *address,
        reason: e.to_string(),
    })
}
