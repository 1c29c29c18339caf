use borsh::{BorshDeserialize, BorshSerialize};

/// Seed prefix of the allowance PDA: `["allowance", owner, mint, spender]`
pub const ALLOWANCE_SEED: &[u8] = b"allowance";

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum PermitInstruction {
    /// Grant `spender` the right to move up to `amount` of the owner's
    /// tokens until `expiration` (unix seconds). Overwrites any previous
    /// allowance for the same triple.
    ///
    /// Accounts:
    /// 0. `[writable]` Allowance PDA
    /// 1. `[writable, signer]` Owner
    /// 2. `[]` Mint
    /// 3. `[]` Spender
    /// 4. `[]` System program
    Approve { amount: u64, expiration: i64 },

    /// Move `amount` from the owner's token account to the spender's token
    /// account, consuming allowance. The destination associated token account
    /// is created when absent, paid by the owner.
    ///
    /// Accounts:
    /// 0. `[writable]` Allowance PDA
    /// 1. `[writable, signer]` Owner
    /// 2. `[signer]` Spender
    /// 3. `[writable]` Source token account (owner's)
    /// 4. `[writable]` Destination token account (spender's associated account)
    /// 5. `[]` Mint
    /// 6. `[]` Token program
    /// 7. `[]` Associated token program
    /// 8. `[]` System program
    TransferFrom { amount: u64 },
}

impl PermitInstruction {
    pub fn pack(&self) -> std::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }
}

/// Allowance record stored in the allowance PDA.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Allowance {
    pub amount: u64,
    /// Unix timestamp after which the allowance is void
    pub expiration: i64,
    pub nonce: u64,
}

impl Allowance {
    pub const LEN: usize = 8 + 8 + 8;

    pub fn is_live(&self, now: i64) -> bool {
        self.expiration > now
    }
}
