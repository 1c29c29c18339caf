use borsh::{BorshDeserialize, BorshSerialize};

/// Seed prefix of a controller's deposit request: `["deposit-request", vault, controller]`
pub const DEPOSIT_REQUEST_SEED: &[u8] = b"deposit-request";

/// Seed prefix of a controller's redeem request: `["redeem-request", vault, controller]`
pub const REDEEM_REQUEST_SEED: &[u8] = b"redeem-request";

/// Request-based vault. Deposits and redemptions are requested, settled by
/// the vault operator, then claimed by the controller.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum VaultInstruction {
    /// Escrow `assets` into the vault reserve as a pending deposit for
    /// `controller`.
    ///
    /// Accounts:
    /// 0. `[writable]` Vault state
    /// 1. `[signer]` Asset owner
    /// 2. `[writable]` Source asset token account
    /// 3. `[writable]` Vault asset reserve
    /// 4. `[writable]` Deposit request PDA
    /// 5. `[]` Asset mint
    /// 6. `[writable, signer]` Payer
    /// 7. `[]` Token program
    /// 8. `[]` System program
    RequestDeposit { assets: u64, controller: [u8; 32] },

    /// Claim shares for `assets` of a settled deposit request.
    ///
    /// Accounts:
    /// 0. `[writable]` Vault state
    /// 1. `[signer]` Controller
    /// 2. `[writable]` Deposit request PDA
    /// 3. `[writable]` Share mint
    /// 4. `[writable]` Receiver share token account (created when absent)
    /// 5. `[writable, signer]` Payer
    /// 6. `[]` Token program
    /// 7. `[]` Associated token program
    /// 8. `[]` System program
    Deposit { assets: u64, receiver: [u8; 32] },

    /// Lock `shares` as a pending redemption for `controller`.
    ///
    /// Accounts:
    /// 0. `[writable]` Vault state
    /// 1. `[signer]` Share owner
    /// 2. `[writable]` Source share token account
    /// 3. `[writable]` Share mint
    /// 4. `[writable]` Redeem request PDA
    /// 5. `[writable, signer]` Payer
    /// 6. `[]` Token program
    /// 7. `[]` System program
    RequestRedeem { shares: u64, controller: [u8; 32] },

    /// Claim `assets` of a settled redeem request.
    ///
    /// Accounts:
    /// 0. `[writable]` Vault state
    /// 1. `[signer]` Controller
    /// 2. `[writable]` Redeem request PDA
    /// 3. `[writable]` Vault asset reserve
    /// 4. `[writable]` Receiver asset token account
    /// 5. `[]` Asset mint
    /// 6. `[]` Token program
    Withdraw { assets: u64, receiver: [u8; 32] },

    /// Return the still-pending part of the controller's deposit request.
    ///
    /// Accounts:
    /// 0. `[writable]` Vault state
    /// 1. `[signer]` Controller
    /// 2. `[writable]` Deposit request PDA
    /// 3. `[writable]` Vault asset reserve
    /// 4. `[writable]` Controller asset token account
    /// 5. `[]` Asset mint
    /// 6. `[]` Token program
    CancelDepositRequest,
}

impl VaultInstruction {
    pub fn pack(&self) -> std::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepositRequest {
    pub controller: [u8; 32],
    /// Assets escrowed and not yet settled
    pub pending_assets: u64,
    /// Settled assets whose shares can be claimed
    pub claimable_assets: u64,
    pub claimable_shares: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedeemRequest {
    pub controller: [u8; 32],
    pub pending_shares: u64,
    pub claimable_shares: u64,
    /// Settled assets ready for withdrawal
    pub claimable_assets: u64,
}
