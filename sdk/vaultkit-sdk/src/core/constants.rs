use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

// Default program IDs for Devnet/Testnet
pub const DEFAULT_WALLET_PROGRAM_ID: Pubkey =
    pubkey!("VKWa11et11111111111111111111111111111111111");
pub const DEFAULT_PERMIT_PROGRAM_ID: Pubkey =
    pubkey!("VKPermit11111111111111111111111111111111111");
pub const DEFAULT_VAULT_PROGRAM_ID: Pubkey =
    pubkey!("VKVau1t111111111111111111111111111111111111");

pub const BPS_DENOMINATOR: u128 = 10_000;

/// Percentage added on top of the simulated compute units
pub const DEFAULT_GAS_BUFFER_PCT: u8 = 20;

/// Runtime ceiling for a single transaction
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_PERMIT_TTL_SECS: i64 = 3_600;
