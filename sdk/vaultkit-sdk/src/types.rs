use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

/// Salt mixed into the smart-account address. Chosen once per owner session
/// and kept stable, otherwise the resolved address moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaltNonce(pub u64);

impl SaltNonce {
    pub fn random() -> Self {
        Self(rand::random())
    }

    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

/// The account-abstraction wallet bound to an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartAccount {
    /// External key that controls the account
    pub owner: Pubkey,
    /// Account PDA: holds funds and signs batched calls
    pub address: Pubkey,
    /// Config PDA created by the deployment envelope
    pub config: Pubkey,
    pub config_bump: u8,
    pub account_bump: u8,
    pub salt: SaltNonce,
    /// Genesis hash of the cluster the account was resolved against
    pub network: Hash,
    /// Whether the config PDA exists, as of resolution
    pub is_deployed: bool,
}

impl SmartAccount {
    pub fn matches(&self, owner: &Pubkey, network: &Hash, salt: SaltNonce) -> bool {
        self.owner == *owner && self.network == *network && self.salt == salt
    }
}

/// Step a call represents inside a plan. Metadata only, not sent on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    CreateWrappedAccount,
    WrapNative,
    Approve,
    TransferFrom,
    FeeTransfer,
    RequestDeposit,
    ClaimShares,
    RequestRedeem,
    Withdraw,
    ForwardToOwner,
    CancelDeposit,
}

/// One atomic call destined for a batch. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    kind: CallKind,
    target: Pubkey,
    value: u64,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
}

impl CallDescriptor {
    pub fn new(
        kind: CallKind,
        target: Pubkey,
        value: u64,
        accounts: Vec<AccountMeta>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            kind,
            target,
            value,
            accounts,
            data,
        }
    }

    pub fn from_instruction(kind: CallKind, ix: Instruction, value: u64) -> Self {
        Self::new(kind, ix.program_id, value, ix.accounts, ix.data)
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    pub fn target(&self) -> &Pubkey {
        &self.target
    }

    /// Lamports funded into the first writable account before the call runs
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Supply,
    Exit,
    VaultDeposit,
    VaultWithdraw,
    Redeem,
    CancelDeposit,
}

/// A user intent the batch builder knows how to plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Move `amount` of the asset from the owner into a vault deposit request
    Supply { amount: u64, wrap_native: bool },
    /// Withdraw claimable assets and forward them to the owner
    Exit { amount: u64 },
    /// Claim shares of a settled deposit request
    VaultDeposit { amount: u64 },
    /// Withdraw claimable assets into the smart account
    VaultWithdraw { amount: u64 },
    /// Request redemption of `shares`
    Redeem { shares: u64 },
    /// Cancel the pending deposit request
    CancelDeposit,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Supply { .. } => IntentKind::Supply,
            Intent::Exit { .. } => IntentKind::Exit,
            Intent::VaultDeposit { .. } => IntentKind::VaultDeposit,
            Intent::VaultWithdraw { .. } => IntentKind::VaultWithdraw,
            Intent::Redeem { .. } => IntentKind::Redeem,
            Intent::CancelDeposit => IntentKind::CancelDeposit,
        }
    }

    /// Amount the intent moves, `None` for intents without one.
    pub fn amount(&self) -> Option<u64> {
        match *self {
            Intent::Supply { amount, .. }
            | Intent::Exit { amount }
            | Intent::VaultDeposit { amount }
            | Intent::VaultWithdraw { amount } => Some(amount),
            Intent::Redeem { shares } => Some(shares),
            Intent::CancelDeposit => None,
        }
    }
}

/// Ordered calls produced for one intent. Order is preserved end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPlan {
    intent: IntentKind,
    calls: Vec<CallDescriptor>,
}

impl OperationPlan {
    pub fn new(intent: IntentKind, calls: Vec<CallDescriptor>) -> Self {
        Self { intent, calls }
    }

    pub fn intent(&self) -> IntentKind {
        self.intent
    }

    pub fn calls(&self) -> &[CallDescriptor] {
        &self.calls
    }

    pub fn kinds(&self) -> Vec<CallKind> {
        self.calls.iter().map(CallDescriptor::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn contains_approval(&self) -> bool {
        self.calls.iter().any(|c| c.kind() == CallKind::Approve)
    }

    /// Total lamports attached across all calls
    pub fn total_value(&self) -> u64 {
        self.calls
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.value()))
    }
}

/// Allowance state for an (owner, mint, spender) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionState {
    pub granted: bool,
    pub amount: u64,
    /// Unix timestamp; 0 when no allowance exists
    pub expiry: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    #[default]
    Pending,
    Success,
    Error,
}

/// What the UI shows about the current operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionState {
    pub visible: bool,
    pub title: String,
    pub message: String,
    pub status: TxStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    Built,
    AwaitingSignature,
    Submitted,
    Confirmed,
    Reverted,
    Failed,
}

impl ExecutionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionPhase::Confirmed | ExecutionPhase::Reverted | ExecutionPhase::Failed
        )
    }
}

/// Result of a confirmed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHandle {
    pub signature: Signature,
    pub phase: ExecutionPhase,
    /// Whether the transaction carried the deployment envelope
    pub deployed_account: bool,
    pub compute_unit_limit: u32,
}

/// Request state of a smart account in the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaultPosition {
    pub pending_deposit: u64,
    pub claimable_deposit: u64,
    pub claimable_shares: u64,
    pub pending_redeem: u64,
    pub claimable_assets: u64,
    /// True when the values are synthetic (simulation mode fallback)
    pub simulated: bool,
}

impl VaultPosition {
    /// Empty position flagged as synthetic, served when the chain cannot be read.
    pub fn simulated() -> Self {
        Self {
            simulated: true,
            ..Self::default()
        }
    }
}
