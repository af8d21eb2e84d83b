//! Transaction descriptors and results

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::client::Receipt;
use crate::erc20;
use crate::{Error, Result};

/// What to send: recipient, native value, and calldata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDescriptor {
    pub to: Option<Address>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
}

impl TransactionDescriptor {
    /// Plain native-currency payment
    pub fn native(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            data: Bytes::new(),
        }
    }

    /// Contract call with no value attached
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to: Some(to),
            value: U256::ZERO,
            data,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Recipient, or an error when it is missing. Contract deployment is not
    /// supported.
    pub fn recipient(&self) -> Result<Address> {
        self.to
            .ok_or_else(|| Error::InvalidArgument("transaction recipient is required".to_string()))
    }
}

/// A token or native-currency movement. `token: None` means native currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub token: Option<Address>,
    pub recipient: Address,
    pub amount: U256,
}

impl TransferRequest {
    pub fn native(recipient: Address, amount: U256) -> Self {
        Self {
            token: None,
            recipient,
            amount,
        }
    }

    pub fn token(token: Address, recipient: Address, amount: U256) -> Self {
        Self {
            token: Some(token),
            recipient,
            amount,
        }
    }

    /// Build the transaction that performs this transfer.
    ///
    /// The amount is passed through untouched; if the sender cannot cover it
    /// the submission fails rather than sending less.
    pub fn to_descriptor(&self) -> Result<TransactionDescriptor> {
        if self.recipient == Address::ZERO {
            return Err(Error::InvalidArgument(
                "transfer recipient must not be the zero address".to_string(),
            ));
        }

        Ok(match self.token {
            None => TransactionDescriptor::native(self.recipient, self.amount),
            Some(token) => {
                if token == Address::ZERO {
                    return Err(Error::InvalidArgument(
                        "token address must not be the zero address".to_string(),
                    ));
                }
                TransactionDescriptor::call(token, erc20::encode_transfer(self.recipient, self.amount))
            }
        })
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    pub hash: B256,
    /// Fee in wei: the amount actually paid once confirmed, otherwise the
    /// pre-broadcast quote
    pub fee: U256,
    /// Present when the wallet waited for confirmation
    pub receipt: Option<Receipt>,
}
