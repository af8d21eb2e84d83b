//! Shared token registry
//!
//! Centralizes token metadata (addresses, decimals, symbols) per chain. The
//! wallet uses it to find the wrapped-native token for `wrap_native` /
//! `unwrap_native`, and the CLI uses it to format balances.

use alloy::primitives::{address, Address, U256};
use std::collections::HashMap;

use crate::config::rpc::chains;

/// Token metadata
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    /// Token symbol (e.g., "USDC", "WETH")
    pub symbol: &'static str,
    /// Number of decimals
    pub decimals: u8,
    /// Whether this is the chain's canonical wrapped native currency
    pub is_wrapped_native: bool,
}

impl TokenInfo {
    pub const fn token(symbol: &'static str, decimals: u8) -> Self {
        Self {
            symbol,
            decimals,
            is_wrapped_native: false,
        }
    }

    pub const fn wrapped_native(symbol: &'static str) -> Self {
        Self {
            symbol,
            decimals: 18,
            is_wrapped_native: true,
        }
    }
}

/// Well-known token addresses per chain
pub mod addresses {
    use super::*;

    // === Ethereum Mainnet ===
    pub const USDC_ETH: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    pub const USDT_ETH: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");
    pub const DAI_ETH: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    pub const WETH_ETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

    // === Sepolia ===
    pub const USDC_SEPOLIA: Address = address!("1c7d4b196cb0c7b01d743fbc6116a902379c7238");
    pub const WETH_SEPOLIA: Address = address!("fff9976782d46cc05630d1f6ebab18b2324d6b14");

    // === Holesky ===
    pub const WETH_HOLESKY: Address = address!("94373a4919b3240d86ea41593d5eba789fef3848");
}

/// Token registry providing token info lookups
pub struct TokenRegistry {
    tokens: HashMap<(u64, Address), TokenInfo>,
}

impl TokenRegistry {
    /// Create a new token registry with all known tokens
    pub fn new() -> Self {
        use addresses::*;

        let mut tokens = HashMap::new();

        tokens.insert((chains::ETHEREUM, USDC_ETH), TokenInfo::token("USDC", 6));
        tokens.insert((chains::ETHEREUM, USDT_ETH), TokenInfo::token("USDT", 6));
        tokens.insert((chains::ETHEREUM, DAI_ETH), TokenInfo::token("DAI", 18));
        tokens.insert((chains::ETHEREUM, WETH_ETH), TokenInfo::wrapped_native("WETH"));

        tokens.insert((chains::SEPOLIA, USDC_SEPOLIA), TokenInfo::token("USDC", 6));
        tokens.insert((chains::SEPOLIA, WETH_SEPOLIA), TokenInfo::wrapped_native("WETH"));

        tokens.insert((chains::HOLESKY, WETH_HOLESKY), TokenInfo::wrapped_native("WETH"));

        Self { tokens }
    }

    /// Get token info by chain and address
    pub fn get(&self, chain_id: u64, address: &Address) -> Option<&TokenInfo> {
        self.tokens.get(&(chain_id, *address))
    }

    /// Address of the wrapped native token (WETH) on a chain
    pub fn wrapped_native(&self, chain_id: u64) -> Option<Address> {
        self.tokens
            .iter()
            .find(|((id, _), info)| *id == chain_id && info.is_wrapped_native)
            .map(|((_, address), _)| *address)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global token registry (lazy initialized)
static REGISTRY: std::sync::OnceLock<TokenRegistry> = std::sync::OnceLock::new();

/// Get the global token registry
pub fn registry() -> &'static TokenRegistry {
    REGISTRY.get_or_init(TokenRegistry::new)
}

/// Format a raw token amount with the given number of decimals
pub fn format_units(value: U256, decimals: u32) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
