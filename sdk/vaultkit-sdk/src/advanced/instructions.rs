//! Low-level call and instruction constructors.
//!
//! Each function encodes exactly one call; ordering and dependency decisions
//! belong to `BatchBuilder`.

use crate::config::VaultKitConfig;
use crate::error::Result;
use crate::types::{CallDescriptor, CallKind, OperationPlan, SmartAccount};
use crate::utils::{
    derive_allowance_pda, derive_deposit_request_pda, derive_redeem_request_pda, token_account,
};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use vaultkit_interface::{
    CompactCall, CompactCalls, PermitInstruction, VaultInstruction, WalletInstruction,
};

//=============================================================================
// Token calls
//=============================================================================

/// Create the owner's wrapped-native token account if it does not exist yet.
/// The owner pays rent.
pub fn create_wrapped_account(owner: &Pubkey) -> CallDescriptor {
    let ix =
        spl_associated_token_account::instruction::create_associated_token_account_idempotent(
            owner,
            owner,
            &spl_token::native_mint::id(),
            &spl_token::id(),
        );
    CallDescriptor::from_instruction(CallKind::CreateWrappedAccount, ix, 0)
}

/// Fund the owner's wrapped-native account with `amount` lamports and sync it.
pub fn wrap_native(owner: &Pubkey, amount: u64) -> Result<CallDescriptor> {
    let wrapped = token_account(owner, &spl_token::native_mint::id());
    let ix = spl_token::instruction::sync_native(&spl_token::id(), &wrapped)?;
    Ok(CallDescriptor::from_instruction(CallKind::WrapNative, ix, amount))
}

/// Pay the protocol fee from the smart account's asset balance.
pub fn fee_transfer(
    config: &VaultKitConfig,
    account: &SmartAccount,
    recipient: &Pubkey,
    fee: u64,
) -> Result<CallDescriptor> {
    let ix = spl_token::instruction::transfer_checked(
        &spl_token::id(),
        &token_account(&account.address, &config.asset_mint),
        &config.asset_mint,
        recipient,
        &account.address,
        &[],
        fee,
        config.asset_decimals,
    )?;
    Ok(CallDescriptor::from_instruction(CallKind::FeeTransfer, ix, 0))
}

/// Move assets held by the smart account back to the owner's token account.
pub fn forward_to_owner(
    config: &VaultKitConfig,
    account: &SmartAccount,
    amount: u64,
) -> Result<CallDescriptor> {
    let ix = spl_token::instruction::transfer_checked(
        &spl_token::id(),
        &token_account(&account.address, &config.asset_mint),
        &config.asset_mint,
        &token_account(&account.owner, &config.asset_mint),
        &account.address,
        &[],
        amount,
        config.asset_decimals,
    )?;
    Ok(CallDescriptor::from_instruction(CallKind::ForwardToOwner, ix, 0))
}

//=============================================================================
// Permit calls
//=============================================================================

/// Meta-approval letting the smart account pull `amount` of the owner's asset.
pub fn approve(
    config: &VaultKitConfig,
    account: &SmartAccount,
    amount: u64,
    expiration: i64,
) -> Result<CallDescriptor> {
    let allowance = derive_allowance_pda(
        &config.permit_program_id,
        &account.owner,
        &config.asset_mint,
        &account.address,
    );
    let data = PermitInstruction::Approve { amount, expiration }.pack()?;
    let accounts = vec![
        AccountMeta::new(allowance, false),
        AccountMeta::new(account.owner, true),
        AccountMeta::new_readonly(config.asset_mint, false),
        AccountMeta::new_readonly(account.address, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    Ok(CallDescriptor::new(
        CallKind::Approve,
        config.permit_program_id,
        0,
        accounts,
        data,
    ))
}

/// Pull `amount` from the owner into the smart account, spending allowance.
pub fn transfer_from(
    config: &VaultKitConfig,
    account: &SmartAccount,
    amount: u64,
) -> Result<CallDescriptor> {
    let allowance = derive_allowance_pda(
        &config.permit_program_id,
        &account.owner,
        &config.asset_mint,
        &account.address,
    );
    let data = PermitInstruction::TransferFrom { amount }.pack()?;
    let accounts = vec![
        AccountMeta::new(allowance, false),
        AccountMeta::new(account.owner, true),
        AccountMeta::new_readonly(account.address, true),
        AccountMeta::new(token_account(&account.owner, &config.asset_mint), false),
        AccountMeta::new(token_account(&account.address, &config.asset_mint), false),
        AccountMeta::new_readonly(config.asset_mint, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    Ok(CallDescriptor::new(
        CallKind::TransferFrom,
        config.permit_program_id,
        0,
        accounts,
        data,
    ))
}

//=============================================================================
// Vault calls
//=============================================================================

/// Deposit request with the smart account as controller.
pub fn request_deposit(
    config: &VaultKitConfig,
    account: &SmartAccount,
    assets: u64,
) -> Result<CallDescriptor> {
    let data = VaultInstruction::RequestDeposit {
        assets,
        controller: account.address.to_bytes(),
    }
    .pack()?;
    let accounts = vec![
        AccountMeta::new(config.vault, false),
        AccountMeta::new_readonly(account.address, true),
        AccountMeta::new(token_account(&account.address, &config.asset_mint), false),
        AccountMeta::new(token_account(&config.vault, &config.asset_mint), false),
        AccountMeta::new(
            derive_deposit_request_pda(&config.vault_program_id, &config.vault, &account.address),
            false,
        ),
        AccountMeta::new_readonly(config.asset_mint, false),
        AccountMeta::new(account.owner, true),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    Ok(CallDescriptor::new(
        CallKind::RequestDeposit,
        config.vault_program_id,
        0,
        accounts,
        data,
    ))
}

/// Claim shares of a settled deposit into the smart account.
pub fn claim_shares(
    config: &VaultKitConfig,
    account: &SmartAccount,
    assets: u64,
) -> Result<CallDescriptor> {
    let data = VaultInstruction::Deposit {
        assets,
        receiver: account.address.to_bytes(),
    }
    .pack()?;
    let accounts = vec![
        AccountMeta::new(config.vault, false),
        AccountMeta::new_readonly(account.address, true),
        AccountMeta::new(
            derive_deposit_request_pda(&config.vault_program_id, &config.vault, &account.address),
            false,
        ),
        AccountMeta::new(config.share_mint, false),
        AccountMeta::new(token_account(&account.address, &config.share_mint), false),
        AccountMeta::new(account.owner, true),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    Ok(CallDescriptor::new(
        CallKind::ClaimShares,
        config.vault_program_id,
        0,
        accounts,
        data,
    ))
}

pub fn request_redeem(
    config: &VaultKitConfig,
    account: &SmartAccount,
    shares: u64,
) -> Result<CallDescriptor> {
    let data = VaultInstruction::RequestRedeem {
        shares,
        controller: account.address.to_bytes(),
    }
    .pack()?;
    let accounts = vec![
        AccountMeta::new(config.vault, false),
        AccountMeta::new_readonly(account.address, true),
        AccountMeta::new(token_account(&account.address, &config.share_mint), false),
        AccountMeta::new(config.share_mint, false),
        AccountMeta::new(
            derive_redeem_request_pda(&config.vault_program_id, &config.vault, &account.address),
            false,
        ),
        AccountMeta::new(account.owner, true),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    Ok(CallDescriptor::new(
        CallKind::RequestRedeem,
        config.vault_program_id,
        0,
        accounts,
        data,
    ))
}

/// Withdraw settled assets into the smart account's asset account.
pub fn withdraw(
    config: &VaultKitConfig,
    account: &SmartAccount,
    assets: u64,
) -> Result<CallDescriptor> {
    let data = VaultInstruction::Withdraw {
        assets,
        receiver: account.address.to_bytes(),
    }
    .pack()?;
    let accounts = vec![
        AccountMeta::new(config.vault, false),
        AccountMeta::new_readonly(account.address, true),
        AccountMeta::new(
            derive_redeem_request_pda(&config.vault_program_id, &config.vault, &account.address),
            false,
        ),
        AccountMeta::new(token_account(&config.vault, &config.asset_mint), false),
        AccountMeta::new(token_account(&account.address, &config.asset_mint), false),
        AccountMeta::new_readonly(config.asset_mint, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];
    Ok(CallDescriptor::new(
        CallKind::Withdraw,
        config.vault_program_id,
        0,
        accounts,
        data,
    ))
}

pub fn cancel_deposit_request(
    config: &VaultKitConfig,
    account: &SmartAccount,
) -> Result<CallDescriptor> {
    let data = VaultInstruction::CancelDepositRequest.pack()?;
    let accounts = vec![
        AccountMeta::new(config.vault, false),
        AccountMeta::new_readonly(account.address, true),
        AccountMeta::new(
            derive_deposit_request_pda(&config.vault_program_id, &config.vault, &account.address),
            false,
        ),
        AccountMeta::new(token_account(&config.vault, &config.asset_mint), false),
        AccountMeta::new(token_account(&account.address, &config.asset_mint), false),
        AccountMeta::new_readonly(config.asset_mint, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];
    Ok(CallDescriptor::new(
        CallKind::CancelDeposit,
        config.vault_program_id,
        0,
        accounts,
        data,
    ))
}

//=============================================================================
// Wallet instructions
//=============================================================================

/// Deployment envelope: creates the config and account PDAs.
pub fn create_wallet(wallet_program_id: &Pubkey, account: &SmartAccount) -> Result<Instruction> {
    let data = WalletInstruction::CreateWallet {
        salt: account.salt.0,
        bump: account.config_bump,
        account_bump: account.account_bump,
    }
    .pack()?;

    let accounts = vec![
        AccountMeta::new(account.config, false),
        AccountMeta::new(account.owner, true),
        AccountMeta::new(account.address, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *wallet_program_id,
        accounts,
        data,
    })
}

/// Wrap every call of `plan`, in order, into one `ExecuteBatch` instruction.
pub fn execute_batch(
    wallet_program_id: &Pubkey,
    account: &SmartAccount,
    plan: &OperationPlan,
) -> Result<Instruction> {
    let mut accounts = AccountList::new(vec![
        AccountMeta::new(account.config, false),
        AccountMeta::new(account.address, false),
        AccountMeta::new(account.owner, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ]);

    let mut inner_calls = Vec::with_capacity(plan.len());
    for call in plan.calls() {
        let program_id_index = accounts.index_of(&AccountMeta::new_readonly(*call.target(), false))?;
        let mut indexes = Vec::with_capacity(call.accounts().len());
        for meta in call.accounts() {
            let mut meta = meta.clone();
            if meta.pubkey == account.address {
                // The wallet program signs for the account PDA
                meta.is_signer = false;
            }
            indexes.push(accounts.index_of(&meta)?);
        }
        inner_calls.push(CompactCall {
            program_id_index,
            value: call.value(),
            accounts: indexes,
            data: call.data().to_vec(),
        });
    }

    let data = WalletInstruction::ExecuteBatch {
        calls: CompactCalls { inner_calls }.into_bytes()?,
    }
    .pack()?;

    Ok(Instruction {
        program_id: *wallet_program_id,
        accounts: accounts.into_metas(),
        data,
    })
}

/// Deduplicated account list; privileges of repeated keys are merged.
struct AccountList {
    metas: Vec<AccountMeta>,
}

impl AccountList {
    fn new(metas: Vec<AccountMeta>) -> Self {
        Self { metas }
    }

    fn index_of(&mut self, meta: &AccountMeta) -> Result<u8> {
        let index = match self.metas.iter().position(|m| m.pubkey == meta.pubkey) {
            Some(i) => {
                let existing = &mut self.metas[i];
                existing.is_writable |= meta.is_writable;
                existing.is_signer |= meta.is_signer;
                i
            },
            None => {
                self.metas.push(meta.clone());
                self.metas.len() - 1
            },
        };
        u8::try_from(index).map_err(|_| {
            vaultkit_interface::CompactError::TooManyAccounts(self.metas.len()).into()
        })
    }

    fn into_metas(self) -> Vec<AccountMeta> {
        self.metas
    }
}
