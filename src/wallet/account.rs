//! A single derived account and everything it can do on chain

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::Signature;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::signer::SecureSigner;
use crate::client::{EvmClient, Receipt};
use crate::config::WalletConfig;
use crate::guard::FeeQuote;
use crate::tx::{RetryPolicy, Submitter, TransactionDescriptor, TransactionResult, TransferRequest};
use crate::{erc20, tokens, Error, Result};

/// An account derived from the wallet seed.
///
/// The public view of an account is its index, derivation path and address.
/// `Serialize` and `Debug` emit exactly those three fields; the signer and
/// the client are never reachable through them.
pub struct WalletAccountEvm {
    index: u32,
    path: String,
    address: Address,
    signer: SecureSigner,
    config: Arc<WalletConfig>,
    client: Option<Arc<dyn EvmClient>>,
}

impl WalletAccountEvm {
    pub(crate) fn new(
        index: u32,
        path: String,
        signer: SecureSigner,
        config: Arc<WalletConfig>,
        client: Option<Arc<dyn EvmClient>>,
    ) -> Self {
        Self {
            index,
            path,
            address: signer.address(),
            signer,
            config,
            client,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn client(&self, action: &'static str) -> Result<&dyn EvmClient> {
        self.client.as_deref().ok_or(Error::NotConnected(action))
    }

    fn retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.retries, self.config.retry_delay())
    }

    fn submitter<'a>(&'a self, client: &'a dyn EvmClient) -> Submitter<'a> {
        Submitter::new(client, &self.signer, &self.config)
    }

    async fn read_uint(&self, token: Address, data: Bytes, action: &'static str) -> Result<U256> {
        let client = self.client(action)?;
        let request = TransactionRequest::default()
            .with_from(self.address)
            .with_to(token)
            .with_input(data);

        let output = self
            .retry()
            .run("eth_call", || client.call(&request))
            .await?;
        erc20::decode_uint256(&output)
    }

    /// Native balance in wei
    pub async fn get_balance(&self) -> Result<U256> {
        let client = self.client("retrieve the balance")?;
        self.retry()
            .run("eth_getBalance", || client.get_balance(self.address))
            .await
    }

    /// ERC-20 balance in the token's base units
    pub async fn get_token_balance(&self, token: Address) -> Result<U256> {
        self.read_uint(
            token,
            erc20::encode_balance_of(self.address),
            "retrieve the token balance",
        )
        .await
    }

    /// How much `spender` may move out of this account's `token` balance
    pub async fn get_allowance(&self, token: Address, spender: Address) -> Result<U256> {
        self.read_uint(
            token,
            erc20::encode_allowance(self.address, spender),
            "retrieve the allowance",
        )
        .await
    }

    pub async fn quote_send_transaction(&self, tx: &TransactionDescriptor) -> Result<FeeQuote> {
        let client = self.client("quote a transaction")?;
        self.submitter(client).quote(tx).await
    }

    pub async fn send_transaction(&self, tx: &TransactionDescriptor) -> Result<TransactionResult> {
        let client = self.client("send a transaction")?;
        self.submitter(client).send(tx).await
    }

    pub async fn quote_transfer(&self, request: &TransferRequest) -> Result<FeeQuote> {
        let client = self.client("quote a transfer")?;
        self.submitter(client).quote_transfer(request).await
    }

    /// Move native currency or tokens. The amount is never adjusted to fit the
    /// balance; a shortfall fails at estimation.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransactionResult> {
        let client = self.client("transfer tokens")?;
        self.submitter(client).transfer(request).await
    }

    pub async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TransactionResult> {
        let client = self.client("approve a spender")?;
        let tx = TransactionDescriptor::call(token, erc20::encode_approve(spender, amount));
        self.submitter(client).send(&tx).await
    }

    /// Spend `amount` of `owner`'s tokens under an allowance granted to this
    /// account
    pub async fn transfer_from(
        &self,
        token: Address,
        owner: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<TransactionResult> {
        let client = self.client("transfer tokens")?;
        if recipient == Address::ZERO {
            return Err(Error::InvalidArgument(
                "transfer recipient must not be the zero address".to_string(),
            ));
        }
        let tx = TransactionDescriptor::call(
            token,
            erc20::encode_transfer_from(owner, recipient, amount),
        );
        self.submitter(client).send(&tx).await
    }

    async fn wrapped_native(&self, client: &dyn EvmClient) -> Result<Address> {
        let chain_id = client.chain_id().await?;
        tokens::registry().wrapped_native(chain_id).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "no wrapped native token known for chain {}",
                chain_id
            ))
        })
    }

    /// Deposit native currency into the chain's wrapped-native token
    pub async fn wrap_native(&self, amount: U256) -> Result<TransactionResult> {
        let client = self.client("wrap native currency")?;
        let weth = self.wrapped_native(client).await?;
        let tx = TransactionDescriptor::call(weth, erc20::encode_deposit()).with_value(amount);
        self.submitter(client).send(&tx).await
    }

    /// Withdraw native currency from the chain's wrapped-native token
    pub async fn unwrap_native(&self, amount: U256) -> Result<TransactionResult> {
        let client = self.client("unwrap native currency")?;
        let weth = self.wrapped_native(client).await?;
        let tx = TransactionDescriptor::call(weth, erc20::encode_withdraw(amount));
        self.submitter(client).send(&tx).await
    }

    /// EIP-191 personal-sign
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        self.signer.sign_message(message)
    }

    /// True when `signature` over `message` was produced by this account
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        let recovered = signature
            .recover_address_from_msg(message)
            .map_err(|e| Error::InvalidArgument(format!("Invalid signature: {}", e)))?;
        Ok(recovered == self.address)
    }

    pub async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>> {
        let client = self.client("retrieve a transaction receipt")?;
        self.retry()
            .run("eth_getTransactionReceipt", || {
                client.get_transaction_receipt(hash)
            })
            .await
    }
}

impl Serialize for WalletAccountEvm {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("WalletAccountEvm", 3)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("address", &self.address)?;
        state.end()
    }
}

impl std::fmt::Debug for WalletAccountEvm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletAccountEvm")
            .field("index", &self.index)
            .field("path", &self.path)
            .field("address", &self.address)
            .finish()
    }
}
