//! Seed-backed account deriver

use std::sync::Arc;

use serde::Serialize;

use super::account::WalletAccountEvm;
use super::seed::SeedMaterial;
use crate::client::{AlloyClient, EvmClient};
use crate::config::WalletConfig;
use crate::tx::RetryPolicy;
use crate::{Error, Result};

/// BIP-44 prefix for Ethereum accounts
const BIP44_ETH_PREFIX: &str = "m/44'/60'";

/// Child numbers with this bit set are hardened
const HARDENED_BIT: u32 = 0x8000_0000;

/// Suggested max fee per gas, in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeRates {
    /// Current max fee per gas plus 10%
    pub normal: u128,
    /// Current max fee per gas doubled
    pub fast: u128,
}

impl FeeRates {
    fn from_max_fee_per_gas(max_fee_per_gas: u128) -> Self {
        Self {
            normal: max_fee_per_gas.saturating_mul(110) / 100,
            fast: max_fee_per_gas.saturating_mul(2),
        }
    }
}

/// Wallet manager for EVM chains.
///
/// Owns the seed and hands out accounts derived from it. The seed phrase is
/// checked when the manager is built, so an invalid phrase never reaches key
/// derivation.
pub struct WalletManagerEvm {
    seed: SeedMaterial,
    config: Arc<WalletConfig>,
    client: Option<Arc<dyn EvmClient>>,
}

impl WalletManagerEvm {
    /// Build a wallet, connecting to `config.provider` when one is set
    pub fn new(seed_phrase: &str, config: WalletConfig) -> Result<Self> {
        let seed = SeedMaterial::from_phrase(seed_phrase)?;
        config.validate()?;

        let client = match &config.provider {
            Some(url) => {
                let client: Arc<dyn EvmClient> = Arc::new(AlloyClient::connect_http(url)?);
                Some(client)
            }
            None => None,
        };

        tracing::debug!(connected = client.is_some(), "Wallet manager created");

        Ok(Self {
            seed,
            config: Arc::new(config),
            client,
        })
    }

    /// Build a wallet bound to an existing client
    pub fn with_client(
        seed_phrase: &str,
        config: WalletConfig,
        client: Arc<dyn EvmClient>,
    ) -> Result<Self> {
        let seed = SeedMaterial::from_phrase(seed_phrase)?;
        config.validate()?;

        Ok(Self {
            seed,
            config: Arc::new(config),
            client: Some(client),
        })
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Account at `m/44'/60'/0'/0/{index}`. `index` must be below 2^31;
    /// larger values would select a hardened child.
    pub fn get_account(&self, index: u32) -> Result<WalletAccountEvm> {
        if index & HARDENED_BIT != 0 {
            return Err(Error::InvalidArgument(format!(
                "Account index {} is out of range (must be below {})",
                index, HARDENED_BIT
            )));
        }
        self.derive(index, format!("{}/0'/0/{}", BIP44_ETH_PREFIX, index))
    }

    /// Account at `m/44'/60'/{path}`, e.g. `"1'/0/5"`. The last component
    /// (without its hardening mark) is reported as the index.
    pub fn get_account_by_path(&self, path: &str) -> Result<WalletAccountEvm> {
        let relative = path.trim().trim_start_matches('/');
        if relative.is_empty() {
            return Err(Error::InvalidArgument(
                "derivation path must not be empty".to_string(),
            ));
        }

        let invalid = || Error::InvalidArgument(format!("Invalid derivation path: {}", path));

        let mut index = None;
        for component in relative.split('/') {
            let number = component.strip_suffix('\'').unwrap_or(component);
            let value = number.parse::<u32>().map_err(|_| invalid())?;
            if value & HARDENED_BIT != 0 {
                return Err(invalid());
            }
            index = Some(value);
        }
        let index = index.ok_or_else(invalid)?;

        self.derive(index, format!("{}/{}", BIP44_ETH_PREFIX, relative))
    }

    fn derive(&self, index: u32, path: String) -> Result<WalletAccountEvm> {
        let signer = self.seed.derive_signer(&path)?;

        tracing::debug!(path = %path, address = %signer.address(), "Derived account");

        Ok(WalletAccountEvm::new(
            index,
            path,
            signer,
            Arc::clone(&self.config),
            self.client.clone(),
        ))
    }

    /// Suggested fee rates from the current fee market
    pub async fn get_fee_rates(&self) -> Result<FeeRates> {
        let client = self
            .client
            .as_deref()
            .ok_or(Error::NotConnected("get fee rates"))?;
        let fees = RetryPolicy::new(self.config.retries, self.config.retry_delay())
            .run("eth_feeHistory", || client.estimate_fees())
            .await?;
        Ok(FeeRates::from_max_fee_per_gas(fees.max_fee_per_gas))
    }
}

impl std::fmt::Debug for WalletManagerEvm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManagerEvm")
            .field("config", &self.config)
            .field("connected", &self.client.is_some())
            .finish_non_exhaustive()
    }
}
