use borsh::{BorshDeserialize, BorshSerialize};

/// Seed prefix of the config PDA: `["vaultkit", owner, version, salt_le]`
pub const CONFIG_SEED: &[u8] = b"vaultkit";

/// Seed prefix of the account PDA: `["vaultkit-account", config]`
pub const ACCOUNT_SEED: &[u8] = b"vaultkit-account";

/// Instruction discriminators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InstructionDiscriminator {
    CreateWallet = 0,
    ExecuteBatch = 1,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum WalletInstruction {
    /// Create the smart account for an owner.
    ///
    /// Accounts:
    /// 0. `[writable]` Config PDA
    /// 1. `[writable, signer]` Owner (payer)
    /// 2. `[writable]` Account PDA
    /// 3. `[]` System program
    CreateWallet {
        /// Salt nonce mixed into the config PDA
        salt: u64,
        /// PDA bump seed for Config
        bump: u8,
        /// PDA bump seed for the account
        account_bump: u8,
    },

    /// Execute an ordered batch of calls signed by the account PDA.
    /// Any failing call reverts the whole instruction.
    ///
    /// Accounts:
    /// 0. `[writable]` Config PDA
    /// 1. `[writable]` Account PDA
    /// 2. `[writable, signer]` Owner
    /// 3. `[]` System program
    /// 4+ `[]` Programs and accounts referenced by the compact calls
    ExecuteBatch {
        /// `CompactCalls::into_bytes` output; indexes point into this
        /// instruction's account list
        calls: Vec<u8>,
    },
}

impl WalletInstruction {
    pub fn pack(&self) -> std::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    pub fn unpack(input: &[u8]) -> std::io::Result<Self> {
        Self::try_from_slice(input)
    }
}

/// Data stored in the config PDA once the account is deployed.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletConfig {
    pub owner: [u8; 32],
    pub salt: u64,
    pub bump: u8,
    pub account_bump: u8,
    /// Number of batches executed so far
    pub nonce: u64,
}

impl WalletConfig {
    pub const LEN: usize = 32 + 8 + 1 + 1 + 8;
}
