//! RPC client seam
//!
//! Everything the wallet needs from a node goes through [`EvmClient`]. The
//! production implementation is [`AlloyClient`], a thin adapter over an alloy
//! provider; tests swap in an in-memory ledger.

#[cfg(test)]
pub(crate) mod mock;
mod provider;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use serde::Serialize;

use crate::Result;

pub use provider::AlloyClient;

/// A transaction signed by a wallet account, ready for broadcast
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Transaction hash
    pub hash: B256,
    /// EIP-2718 encoded signed envelope
    pub raw: Bytes,
    /// The request the envelope was built from
    pub request: TransactionRequest,
}

/// Current EIP-1559 fee market estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// The parts of a transaction receipt the wallet cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    /// Execution status; `false` means the transaction was mined but reverted
    pub success: bool,
}

impl Receipt {
    /// Fee actually paid, in wei
    pub fn fee(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}

#[async_trait]
pub trait EvmClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Execute a read-only call (`eth_call`)
    async fn call(&self, request: &TransactionRequest) -> Result<Bytes>;

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64>;

    async fn estimate_fees(&self) -> Result<FeeEstimate>;

    /// Nonce for the next transaction from `address`, counting pending ones
    async fn get_transaction_count(&self, address: Address) -> Result<u64>;

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<B256>;

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>>;

    async fn get_block_number(&self) -> Result<u64>;
}
