use crate::types::ExecutionPhase;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

/// SDK-specific error types for VaultKit operations
#[derive(Debug, Error)]
pub enum VaultKitError {
    /// Chain unreachable or RPC failure. Retryable.
    #[error("Connection error: {0}")]
    Connectivity(String),

    /// No owner key is available to resolve or sign for a smart account
    #[error("No owner key available")]
    OwnerMissing,

    /// Caller misuse: unresolved account, wrong cluster, operation in flight
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Local validation of an amount, never reaches the chain
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The owner declined or signing failed; nothing was submitted
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The batch reverted atomically; no call in it took effect
    #[error("Transaction reverted: {reason}")]
    Reverted {
        signature: Option<Signature>,
        reason: String,
    },

    /// The node did not acknowledge the signed transaction. It may still have
    /// been forwarded and may still land.
    #[error("Submission of {signature} failed: {reason}")]
    SubmissionFailed { signature: Signature, reason: String },

    /// Inclusion was not observed in time. The transaction may still land.
    #[error("Timed out waiting for {signature} after {waited_ms}ms")]
    Timeout { signature: Signature, waited_ms: u64 },

    /// Invalid account data or deserialization error
    #[error("Invalid account data for {address}: {reason}")]
    InvalidAccountData { address: Pubkey, reason: String },

    /// Borsh serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] std::io::Error),

    /// Token program instruction could not be built
    #[error("Program error: {0}")]
    ProgramError(#[from] solana_sdk::program_error::ProgramError),

    /// Batch does not fit the compact call encoding
    #[error("Batch encoding error: {0}")]
    Encoding(#[from] vaultkit_interface::CompactError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VaultKitError {
    /// Whether the same call may be retried as-is.
    ///
    /// `Timeout` and `SubmissionFailed` are not retryable: the caller must
    /// re-check chain state first or risk submitting twice.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VaultKitError::Connectivity(_)
                | VaultKitError::Authorization(_)
                | VaultKitError::Reverted { .. }
        )
    }

    /// Phase an execution ends in when it fails with this error.
    pub fn terminal_phase(&self) -> ExecutionPhase {
        match self {
            VaultKitError::Reverted { .. } => ExecutionPhase::Reverted,
            _ => ExecutionPhase::Failed,
        }
    }

    pub(crate) fn connectivity(e: impl std::fmt::Display) -> Self {
        VaultKitError::Connectivity(e.to_string())
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, VaultKitError>;
