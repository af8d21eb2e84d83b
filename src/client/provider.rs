//! alloy-backed [`EvmClient`]
//!
//! RPC failures are folded into the crate's error taxonomy here, so the rest of
//! the wallet never inspects provider error strings.

use alloy::primitives::{hex, Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::decode_revert_reason;
use alloy::transports::TransportError;
use async_trait::async_trait;

use super::{EvmClient, FeeEstimate, Receipt, SignedTransaction};
use crate::{Error, Result};

/// [`EvmClient`] over any alloy provider
pub struct AlloyClient<P = DynProvider> {
    provider: P,
}

impl AlloyClient<DynProvider> {
    /// Connect to a JSON-RPC endpoint over HTTP
    pub fn connect_http(rpc_url: &str) -> Result<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self { provider })
    }
}

impl<P: Provider> AlloyClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider + 'static> EvmClient for AlloyClient<P> {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| classify("eth_chainId", e))
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| classify("eth_getBalance", e))
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        self.provider
            .call(request.clone())
            .await
            .map_err(|e| classify("eth_call", e))
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        self.provider
            .estimate_gas(request.clone())
            .await
            .map_err(|e| classify("eth_estimateGas", e))
    }

    async fn estimate_fees(&self) -> Result<FeeEstimate> {
        let estimate = self
            .provider
            .estimate_eip1559_fees()
            .await
            .map_err(|e| classify("eth_feeHistory", e))?;

        Ok(FeeEstimate {
            max_fee_per_gas: estimate.max_fee_per_gas,
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
        })
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| classify("eth_getTransactionCount", e))
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<B256> {
        let pending = self
            .provider
            .send_raw_transaction(&tx.raw)
            .await
            .map_err(|e| classify("eth_sendRawTransaction", e))?;

        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| classify("eth_getTransactionReceipt", e))?;

        // A receipt without a block number is still pending
        Ok(receipt.and_then(|r| {
            r.block_number.map(|block_number| Receipt {
                transaction_hash: r.transaction_hash,
                block_number,
                gas_used: r.gas_used,
                effective_gas_price: r.effective_gas_price,
                success: r.status(),
            })
        }))
    }

    async fn get_block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| classify("eth_blockNumber", e))
    }
}

/// Map a provider error onto the wallet's error kinds.
///
/// JSON-RPC error responses are node verdicts and are classified by message;
/// anything else (connection refused, timeouts, bad HTTP status) is a transport
/// failure and therefore retryable.
fn classify(method: &str, err: TransportError) -> Error {
    match err.as_error_resp() {
        Some(payload) => {
            let data = payload.data.as_ref().map(|d| d.get().trim_matches('"'));
            classify_rpc_message(&payload.message, data)
        }
        None => Error::Network(format!("{} failed: {}", method, err)),
    }
}

pub(crate) fn classify_rpc_message(message: &str, data: Option<&str>) -> Error {
    let lower = message.to_lowercase();

    if lower.contains("insufficient funds") {
        return Error::InsufficientFunds(message.to_string());
    }

    if lower.contains("revert") {
        let mut combined = message.to_string();
        if let Some(data) = data {
            combined.push(' ');
            combined.push_str(data);
        }
        return Error::Reverted(parse_revert_reason(&combined));
    }

    Error::Rpc(message.to_string())
}

/// Extract a human readable revert reason from an RPC error message
fn parse_revert_reason(error: &str) -> String {
    // "execution reverted: <reason>"
    if let Some(start) = error.find("reverted: ") {
        let reason = &error[start + 10..];
        let reason = reason.split(" 0x").next().unwrap_or(reason).trim();
        if !reason.is_empty() {
            return reason.trim_matches('"').to_string();
        }
    }

    // ABI-encoded Error(string) / Panic(uint256) payload
    if let Some(start) = error.find("0x") {
        let hex_data = &error[start..];
        let end = hex_data[2..]
            .find(|c: char| !c.is_ascii_hexdigit())
            .map(|i| i + 2)
            .unwrap_or(hex_data.len());
        let hex_str = &hex_data[..end];
        if let Ok(bytes) = hex::decode(hex_str) {
            if let Some(reason) = decode_revert_reason(&bytes) {
                return reason;
            }
        }
        return format!("reverted with data: {}", hex_str);
    }

    "execution reverted".to_string()
}
