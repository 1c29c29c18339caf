pub mod advanced;
pub mod basic;
pub mod config;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::basic::account::AccountResolver;
pub use crate::basic::builder::{split_fee, BatchBuilder, FeeSplit};
pub use crate::basic::executor::BatchExecutor;
pub use crate::basic::permission::PermissionPlanner;
pub use crate::basic::position::PositionReader;
pub use crate::basic::session::VaultSession;
pub use crate::basic::status::StatusTracker;
pub use crate::config::{FeeConfig, VaultKitConfig};
pub use crate::core::connection::{ChainClient, ConnectionError, SimulationOutcome};
pub use crate::core::rpc::RpcChainClient;
pub use crate::core::signer::OwnerSigner;
pub use crate::error::{Result, VaultKitError};
pub use crate::types::{
    CallDescriptor, CallKind, ExecutionPhase, Intent, IntentKind, OperationPlan,
    PermissionState, SaltNonce, SmartAccount, TransactionHandle, TransactionState, TxStatus,
    VaultPosition,
};

pub mod interface {
    pub use vaultkit_interface::{
        Allowance, CompactCall, CompactCalls, DepositRequest, PermitInstruction, RedeemRequest,
        VaultInstruction, WalletConfig, WalletInstruction, IMPLEMENTATION_VERSION,
    };
}
