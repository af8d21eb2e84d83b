//! Seed handling, account derivation and signing
//!
//! The seed phrase and derived private keys never leave this module except
//! as signatures.

mod account;
mod manager;
mod seed;
mod signer;

pub use account::WalletAccountEvm;
pub use manager::{FeeRates, WalletManagerEvm};
pub use seed::SeedMaterial;
pub use signer::SecureSigner;
