//! Per-account signing capability
//!
//! SECURITY: this is the only place a derived private key exists.
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - No Serialize impl, and Debug prints the address only
//! - Keys are never logged

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};

use crate::client::SignedTransaction;
use crate::{Error, Result};

pub struct SecureSigner {
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet used to build signed envelopes
    wallet: EthereumWallet,
}

impl SecureSigner {
    pub(crate) fn new(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        let wallet = EthereumWallet::from(signer.clone());

        Self {
            signer,
            address,
            wallet,
        }
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a message with the EIP-191 personal-sign prefix
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        self.signer
            .sign_message_sync(message)
            .map_err(|e| Error::Wallet(format!("Signing failed: {}", e)))
    }

    /// Sign a fully populated request (nonce, gas, fees, chain id) into a
    /// broadcastable EIP-2718 envelope
    pub async fn sign_transaction(&self, request: TransactionRequest) -> Result<SignedTransaction> {
        let envelope = request
            .clone()
            .build(&self.wallet)
            .await
            .map_err(|e| Error::Wallet(format!("Failed to sign transaction: {}", e)))?;

        Ok(SignedTransaction {
            hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
            request,
        })
    }

    #[cfg(test)]
    pub(crate) fn private_key_bytes(&self) -> alloy::primitives::B256 {
        self.signer.to_bytes()
    }
}

// Only the address is printed
impl std::fmt::Debug for SecureSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
