//! Configuration for the EVM wallet manager

pub mod rpc;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

// Re-export RPC config
pub use rpc::RpcConfig;

/// Default fee ceiling: 0.001 ETH
pub const DEFAULT_TRANSFER_MAX_FEE_WEI: u64 = 1_000_000_000_000_000;

/// Fee ceiling used by the testnet preset: 0.0005 ETH
const TESTNET_TRANSFER_MAX_FEE_WEI: u64 = 500_000_000_000_000;

fn default_transfer_max_fee() -> U256 {
    U256::from(DEFAULT_TRANSFER_MAX_FEE_WEI)
}

fn default_confirmations() -> u64 {
    1
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

/// Wallet configuration
///
/// Immutable once handed to a wallet manager. Every field has a default, so an
/// empty JSON object is a valid configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// JSON-RPC endpoint; `None` yields a wallet that can derive addresses and
    /// sign, but not query or broadcast
    #[serde(default)]
    pub provider: Option<String>,
    /// Maximum total fee (wei) any single submission may cost
    #[serde(default = "default_transfer_max_fee")]
    pub transfer_max_fee: U256,
    /// Blocks to wait for after inclusion; 0 returns right after broadcast
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Extra attempts after a transient RPC failure on reads and receipt polling
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Fixed delay between retry attempts (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Upper bound on confirmation waiting (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Delay between receipt polls (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            provider: None,
            transfer_max_fee: default_transfer_max_fee(),
            confirmations: default_confirmations(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl WalletConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the RPC endpoint
    pub fn with_provider(mut self, url: impl Into<String>) -> Self {
        self.provider = Some(url.into());
        self
    }

    /// Set the fee ceiling (wei)
    pub fn with_max_fee(mut self, max_fee: U256) -> Self {
        self.transfer_max_fee = max_fee;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(provider) = &self.provider {
            provider
                .parse::<url::Url>()
                .map_err(|e| Error::Config(format!("Invalid provider URL {}: {}", provider, e)))?;
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than zero".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy safe to print: the provider URL keeps only scheme, host and port
    pub fn redacted(&self) -> Self {
        Self {
            provider: self.provider.as_deref().map(rpc::redact_url),
            ..self.clone()
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// Provider URLs may embed an API key
impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("provider", &self.provider.as_deref().map(rpc::redact_url))
            .field("transfer_max_fee", &self.transfer_max_fee)
            .field("confirmations", &self.confirmations)
            .field("retries", &self.retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("timeout_ms", &self.timeout_ms)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

/// Preset for running against the Sepolia testnet.
///
/// The endpoint comes from [`RpcConfig::from_env`], so `SEPOLIA_RPC_URL` or a
/// provider API key is honoured before falling back to a public node.
pub fn testnet_config() -> WalletConfig {
    let rpc = RpcConfig::from_env();
    WalletConfig {
        provider: rpc.get(rpc::chains::SEPOLIA).map(str::to_string),
        transfer_max_fee: U256::from(TESTNET_TRANSFER_MAX_FEE_WEI),
        confirmations: 2,
        retries: 5,
        retry_delay_ms: 2_000,
        timeout_ms: 120_000,
        poll_interval_ms: 2_000,
    }
}
