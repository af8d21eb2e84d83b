//! RPC endpoint configuration
//!
//! Endpoints are resolved per chain following Ethereum ecosystem conventions:
//! 1. Per-chain env vars (ETH_RPC_URL, SEPOLIA_RPC_URL, etc.) - highest priority
//! 2. Provider API keys (ALCHEMY_API_KEY, INFURA_API_KEY) - builds URLs automatically
//! 3. Public RPC fallbacks - for testing only
//!
//! # Examples
//!
//! ```bash
//! # Option 1: Per-chain URLs (recommended for production)
//! export ETH_RPC_URL="https://eth-mainnet.g.alchemy.com/v2/YOUR_KEY"
//! export SEPOLIA_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//!
//! # Option 2: Single provider API key
//! export ALCHEMY_API_KEY="YOUR_KEY"
//!
//! # Option 3: No env vars - uses public RPCs (rate limited, for testing only)
//! ```

use std::collections::HashMap;

/// RPC configuration for multiple chains
#[derive(Clone)]
pub struct RpcConfig {
    /// RPC URLs indexed by chain ID
    urls: HashMap<u64, String>,
}

/// Chain ID constants
pub mod chains {
    pub const ETHEREUM: u64 = 1;
    pub const SEPOLIA: u64 = 11155111;
    pub const HOLESKY: u64 = 17000;
    /// Local development node (anvil / hardhat)
    pub const LOCAL: u64 = 31337;
}

/// Environment variable names
pub(crate) mod env_vars {
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";
    pub const HOLESKY_RPC_URL: &str = "HOLESKY_RPC_URL";
    pub const LOCAL_RPC_URL: &str = "LOCAL_RPC_URL";

    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

/// Public RPC endpoints (rate limited, for testing only)
mod public_rpcs {
    pub const ETHEREUM: &str = "https://eth.llamarpc.com";
    pub const SEPOLIA: &str = "https://ethereum-sepolia-rpc.publicnode.com";
    pub const HOLESKY: &str = "https://ethereum-holesky-rpc.publicnode.com";
    pub const LOCAL: &str = "http://127.0.0.1:8545";
}

impl RpcConfig {
    /// Create RPC config from environment variables
    ///
    /// Priority:
    /// 1. Per-chain env vars
    /// 2. ALCHEMY_API_KEY - builds URLs for all hosted chains
    /// 3. INFURA_API_KEY - builds URLs for all hosted chains
    /// 4. Public RPC fallbacks (for testing only)
    pub fn from_env() -> Self {
        let mut urls = HashMap::new();

        let per_chain = [
            (env_vars::ETH_RPC_URL, chains::ETHEREUM),
            (env_vars::SEPOLIA_RPC_URL, chains::SEPOLIA),
            (env_vars::HOLESKY_RPC_URL, chains::HOLESKY),
            (env_vars::LOCAL_RPC_URL, chains::LOCAL),
        ];
        for (var, chain_id) in per_chain {
            if let Ok(url) = std::env::var(var) {
                tracing::debug!(chain_id, "Using {} for chain", var);
                urls.insert(chain_id, url);
            }
        }

        let hosted = urls.keys().all(|id| *id == chains::LOCAL);

        if hosted {
            if let Ok(key) = std::env::var(env_vars::ALCHEMY_API_KEY) {
                tracing::info!("Building RPC URLs from ALCHEMY_API_KEY");
                urls.insert(
                    chains::ETHEREUM,
                    format!("https://eth-mainnet.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://eth-sepolia.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::HOLESKY,
                    format!("https://eth-holesky.g.alchemy.com/v2/{}", key),
                );
            } else if let Ok(key) = std::env::var(env_vars::INFURA_API_KEY) {
                tracing::info!("Building RPC URLs from INFURA_API_KEY");
                urls.insert(
                    chains::ETHEREUM,
                    format!("https://mainnet.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://sepolia.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::HOLESKY,
                    format!("https://holesky.infura.io/v3/{}", key),
                );
            }
        }

        if !urls.contains_key(&chains::SEPOLIA) {
            tracing::warn!("No RPC configured for Sepolia, using public RPC (rate limited)");
        }
        urls.entry(chains::ETHEREUM)
            .or_insert_with(|| public_rpcs::ETHEREUM.to_string());
        urls.entry(chains::SEPOLIA)
            .or_insert_with(|| public_rpcs::SEPOLIA.to_string());
        urls.entry(chains::HOLESKY)
            .or_insert_with(|| public_rpcs::HOLESKY.to_string());
        urls.entry(chains::LOCAL)
            .or_insert_with(|| public_rpcs::LOCAL.to_string());

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }

    /// Check if a chain is configured
    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }

    /// Resolve a network name (as accepted by the CLI) to its chain ID
    pub fn chain_id_for(network: &str) -> Option<u64> {
        match network.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Some(chains::ETHEREUM),
            "sepolia" => Some(chains::SEPOLIA),
            "holesky" => Some(chains::HOLESKY),
            "local" | "anvil" | "hardhat" => Some(chains::LOCAL),
            _ => None,
        }
    }
}

/// Strip everything after the host from an endpoint URL.
///
/// Hosted providers put the API key in the path (`/v2/{key}`) or query, and
/// endpoints may carry basic-auth credentials, so only the scheme, host and
/// port are kept for display.
pub fn redact_url(raw: &str) -> String {
    let Ok(url) = raw.parse::<url::Url>() else {
        return "<redacted>".to_string();
    };

    let host = url.host_str().unwrap_or_default();
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    let hidden = url.path() != "/"
        || url.query().is_some()
        || !url.username().is_empty()
        || url.password().is_some();

    if hidden {
        format!("{}://{}{}/<redacted>", url.scheme(), host, port)
    } else {
        format!("{}://{}{}", url.scheme(), host, port)
    }
}

impl std::fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let urls: HashMap<u64, String> = self
            .urls
            .iter()
            .map(|(chain_id, url)| (*chain_id, redact_url(url)))
            .collect();
        f.debug_struct("RpcConfig").field("urls", &urls).finish()
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
