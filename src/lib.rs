//! EVM Wallet Manager
//!
//! Seed-derived EVM accounts with a fee-capped submission path:
//! - Deterministic BIP-44 account derivation from a mnemonic
//! - A fee guard that quotes every transaction and refuses anything above the
//!   configured ceiling before it is signed
//! - Native, ERC-20 and wrapped-native transfers that never adjust the
//!   requested amount
//! - Confirmation waiting with bounded retry of transient RPC failures
//!
//! # Security Model
//!
//! - The seed phrase is validated at construction and kept in a zeroizing
//!   secret container
//! - Private keys never leave the `wallet` module
//! - Nothing sensitive is reachable through `Debug` or `Serialize`

pub mod client;
pub mod config;
pub mod erc20;
pub mod guard;
pub mod tokens;
pub mod tx;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use client::{AlloyClient, EvmClient, Receipt};
pub use config::{testnet_config, RpcConfig, WalletConfig};
pub use error::{Error, ErrorKind, Result};
pub use guard::{FeeGuard, FeeQuote};
pub use tx::{TransactionDescriptor, TransactionResult, TransferRequest};
pub use wallet::{FeeRates, WalletAccountEvm, WalletManagerEvm};
