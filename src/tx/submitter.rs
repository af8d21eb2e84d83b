//! Fee-checked transaction submission
//!
//! Order of operations for every send:
//! 1. validate the descriptor
//! 2. quote the fee (gas estimate x current max fee per gas)
//! 3. enforce the fee ceiling; nothing is signed or broadcast on rejection
//! 4. fetch the pending nonce and chain id, sign
//! 5. broadcast
//! 6. wait for confirmation when `confirmations > 0`

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;

use super::confirm::ConfirmationWaiter;
use super::types::{TransactionDescriptor, TransactionResult, TransferRequest};
use crate::client::EvmClient;
use crate::config::WalletConfig;
use crate::guard::{FeeGuard, FeeQuote};
use crate::wallet::SecureSigner;
use crate::Result;

pub struct Submitter<'a> {
    client: &'a dyn EvmClient,
    signer: &'a SecureSigner,
    config: &'a WalletConfig,
    guard: FeeGuard,
}

impl<'a> Submitter<'a> {
    pub fn new(client: &'a dyn EvmClient, signer: &'a SecureSigner, config: &'a WalletConfig) -> Self {
        Self {
            client,
            signer,
            config,
            guard: FeeGuard::new(config.transfer_max_fee),
        }
    }

    fn build_request(&self, desc: &TransactionDescriptor) -> Result<TransactionRequest> {
        let to = desc.recipient()?;

        Ok(TransactionRequest::default()
            .with_from(self.signer.address())
            .with_to(to)
            .with_value(desc.value)
            .with_input(desc.data.clone()))
    }

    /// Quote a transaction without sending it
    pub async fn quote(&self, desc: &TransactionDescriptor) -> Result<FeeQuote> {
        let request = self.build_request(desc)?;
        self.guard.quote(self.client, &request).await
    }

    pub async fn quote_transfer(&self, request: &TransferRequest) -> Result<FeeQuote> {
        self.quote(&request.to_descriptor()?).await
    }

    pub async fn send(&self, desc: &TransactionDescriptor) -> Result<TransactionResult> {
        let request = self.build_request(desc)?;

        let quote = self.guard.quote(self.client, &request).await?;
        self.guard.enforce(&quote)?;

        let from = self.signer.address();
        let nonce = self.client.get_transaction_count(from).await?;
        let chain_id = self.client.chain_id().await?;

        let request = request
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_gas_limit(quote.gas_limit)
            .with_max_fee_per_gas(quote.max_fee_per_gas)
            .with_max_priority_fee_per_gas(quote.max_priority_fee_per_gas);

        let signed = self.signer.sign_transaction(request).await?;
        let hash = self.client.send_raw_transaction(&signed).await?;

        tracing::info!(
            tx_hash = %hash,
            from = %from,
            to = ?desc.to,
            nonce,
            quoted_fee = %quote.total_fee,
            "Transaction broadcast"
        );

        if self.config.confirmations == 0 {
            return Ok(TransactionResult {
                hash,
                fee: quote.total_fee,
                receipt: None,
            });
        }

        let receipt = ConfirmationWaiter::new(self.client, self.config)
            .await_confirmation(hash)
            .await?;

        tracing::info!(
            tx_hash = %hash,
            block = receipt.block_number,
            fee = %receipt.fee(),
            "Transaction confirmed"
        );

        Ok(TransactionResult {
            hash,
            fee: receipt.fee(),
            receipt: Some(receipt),
        })
    }

    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransactionResult> {
        let desc = request.to_descriptor()?;
        self.send(&desc).await
    }
}
