use crate::core::constants::{
    DEFAULT_CONFIRMATION_TIMEOUT_MS, DEFAULT_GAS_BUFFER_PCT, DEFAULT_PERMIT_PROGRAM_ID,
    DEFAULT_PERMIT_TTL_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_VAULT_PROGRAM_ID,
    DEFAULT_WALLET_PROGRAM_ID,
};
use crate::error::{Result, VaultKitError};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::time::Duration;

/// Protocol fee taken from each supply before it reaches the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee in basis points of the supplied amount
    pub rate_bps: u16,
    /// Token account credited with the fee
    #[serde(with = "pubkey_string")]
    pub recipient: Pubkey,
}

/// Orchestrator configuration, usually loaded from JSON.
///
/// ```json
/// {
///   "vault": "…",
///   "asset_mint": "So11111111111111111111111111111111111111112",
///   "share_mint": "…",
///   "asset_decimals": 9,
///   "fee": { "rate_bps": 25, "recipient": "…" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultKitConfig {
    #[serde(with = "pubkey_string", default = "default_wallet_program")]
    pub wallet_program_id: Pubkey,
    #[serde(with = "pubkey_string", default = "default_permit_program")]
    pub permit_program_id: Pubkey,
    #[serde(with = "pubkey_string", default = "default_vault_program")]
    pub vault_program_id: Pubkey,

    /// Vault state account
    #[serde(with = "pubkey_string")]
    pub vault: Pubkey,
    #[serde(with = "pubkey_string")]
    pub asset_mint: Pubkey,
    #[serde(with = "pubkey_string")]
    pub share_mint: Pubkey,
    pub asset_decimals: u8,

    #[serde(default)]
    pub fee: Option<FeeConfig>,

    #[serde(default = "default_gas_buffer_pct")]
    pub gas_buffer_pct: u8,
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Lifetime of a freshly granted permit
    #[serde(default = "default_permit_ttl_secs")]
    pub permit_ttl_secs: i64,

    /// Serve synthetic vault positions when the chain cannot be read.
    /// Development only.
    #[serde(default)]
    pub simulation_mode: bool,
}

fn default_wallet_program() -> Pubkey {
    DEFAULT_WALLET_PROGRAM_ID
}

fn default_permit_program() -> Pubkey {
    DEFAULT_PERMIT_PROGRAM_ID
}

fn default_vault_program() -> Pubkey {
    DEFAULT_VAULT_PROGRAM_ID
}

fn default_gas_buffer_pct() -> u8 {
    DEFAULT_GAS_BUFFER_PCT
}

fn default_confirmation_timeout_ms() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_permit_ttl_secs() -> i64 {
    DEFAULT_PERMIT_TTL_SECS
}

impl VaultKitConfig {
    /// Config with default programs and tunables for the given vault.
    pub fn new(vault: Pubkey, asset_mint: Pubkey, share_mint: Pubkey, asset_decimals: u8) -> Self {
        Self {
            wallet_program_id: DEFAULT_WALLET_PROGRAM_ID,
            permit_program_id: DEFAULT_PERMIT_PROGRAM_ID,
            vault_program_id: DEFAULT_VAULT_PROGRAM_ID,
            vault,
            asset_mint,
            share_mint,
            asset_decimals,
            fee: None,
            gas_buffer_pct: DEFAULT_GAS_BUFFER_PCT,
            confirmation_timeout_ms: DEFAULT_CONFIRMATION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            permit_ttl_secs: DEFAULT_PERMIT_TTL_SECS,
            simulation_mode: false,
        }
    }

    pub fn with_fee(mut self, rate_bps: u16, recipient: Pubkey) -> Self {
        self.fee = Some(FeeConfig {
            rate_bps,
            recipient,
        });
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| VaultKitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| VaultKitError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(fee) = &self.fee {
            if fee.rate_bps > 10_000 {
                return Err(VaultKitError::Config(format!(
                    "fee rate {} bps exceeds 10000",
                    fee.rate_bps
                )));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(VaultKitError::Config(
                "poll_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.poll_interval_ms >= self.confirmation_timeout_ms {
            return Err(VaultKitError::Config(
                "poll_interval_ms must be shorter than confirmation_timeout_ms".to_string(),
            ));
        }
        if self.permit_ttl_secs <= 0 {
            return Err(VaultKitError::Config(
                "permit_ttl_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fee_rate_bps(&self) -> u16 {
        self.fee.map(|f| f.rate_bps).unwrap_or(0)
    }
}

/// Pubkeys as base58 strings instead of byte arrays.
mod pubkey_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(de::Error::custom)
    }
}
