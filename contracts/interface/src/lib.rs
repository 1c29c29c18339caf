//! VaultKit Program Interface
//!
//! Client-side ABI of the programs the orchestrator drives: the smart wallet,
//! the permit (allowance) program and the request-based vault. Every
//! instruction is borsh encoded; account layouts are documented per variant.

pub mod compact;
pub mod permit;
pub mod vault;
pub mod wallet;

pub use compact::{CompactCall, CompactCalls, CompactError};
pub use permit::{Allowance, PermitInstruction};
pub use vault::{DepositRequest, RedeemRequest, VaultInstruction};
pub use wallet::{WalletConfig, WalletInstruction};

/// Implementation version mixed into the smart-account address derivation.
/// Bumping it moves every derived account.
pub const IMPLEMENTATION_VERSION: &str = "vaultkit-account-v1";
