//! Waiting for a broadcast transaction to be mined and confirmed

use alloy::primitives::B256;
use std::time::Duration;

use super::retry::RetryPolicy;
use crate::client::{EvmClient, Receipt};
use crate::config::WalletConfig;
use crate::{Error, Result};

pub struct ConfirmationWaiter<'a> {
    client: &'a dyn EvmClient,
    confirmations: u64,
    timeout: Duration,
    poll_interval: Duration,
    retry: RetryPolicy,
}

impl<'a> ConfirmationWaiter<'a> {
    pub fn new(client: &'a dyn EvmClient, config: &WalletConfig) -> Self {
        Self {
            client,
            confirmations: config.confirmations.max(1),
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
            retry: RetryPolicy::new(config.retries, config.retry_delay()),
        }
    }

    /// Wait until `hash` is buried under the configured number of blocks.
    ///
    /// A mined receipt with a failed status is returned as `Reverted`. On
    /// timeout the transaction may still land; only the wait is abandoned.
    pub async fn await_confirmation(&self, hash: B256) -> Result<Receipt> {
        match tokio::time::timeout(self.timeout, self.poll(hash)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "transaction {} not confirmed within {}ms",
                hash,
                self.timeout.as_millis()
            ))),
        }
    }

    async fn poll(&self, hash: B256) -> Result<Receipt> {
        loop {
            let receipt = self
                .retry
                .run("eth_getTransactionReceipt", || {
                    self.client.get_transaction_receipt(hash)
                })
                .await?;

            if let Some(receipt) = receipt {
                if !receipt.success {
                    return Err(Error::Reverted(format!(
                        "transaction {} failed in block {}",
                        hash, receipt.block_number
                    )));
                }

                let head = self
                    .retry
                    .run("eth_blockNumber", || self.client.get_block_number())
                    .await?;
                let depth = head.saturating_sub(receipt.block_number) + 1;

                if depth >= self.confirmations {
                    tracing::debug!(
                        tx_hash = %hash,
                        block = receipt.block_number,
                        depth,
                        "Transaction confirmed"
                    );
                    return Ok(receipt);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
