//! Fee ceiling guard
//!
//! Quotes the total cost of a pending transaction and refuses anything above
//! the configured maximum. A refusal is a policy decision, not a fault, so it
//! is never retried.

use alloy::primitives::U256;
use alloy::rpc::types::TransactionRequest;
use serde::Serialize;

use crate::client::EvmClient;
use crate::{Error, Result};

/// Estimated cost of a pending transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    /// `gas_limit * max_fee_per_gas`, in wei
    pub total_fee: U256,
}

impl FeeQuote {
    pub fn new(gas_limit: u64, max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        Self {
            gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            total_fee: U256::from(gas_limit) * U256::from(max_fee_per_gas),
        }
    }
}

/// Guard that enforces a maximum fee per submission
#[derive(Debug, Clone, Copy)]
pub struct FeeGuard {
    /// Maximum total fee (wei)
    max_fee: U256,
}

impl FeeGuard {
    pub fn new(max_fee: U256) -> Self {
        Self { max_fee }
    }

    pub fn max_fee(&self) -> U256 {
        self.max_fee
    }

    /// Estimate gas for `request` and price it at the current max fee per gas.
    ///
    /// Estimation runs the transaction against current state, so a transfer
    /// that would revert or overdraw fails here, before anything is signed.
    pub async fn quote(
        &self,
        client: &dyn EvmClient,
        request: &TransactionRequest,
    ) -> Result<FeeQuote> {
        let gas_limit = client.estimate_gas(request).await?;
        let fees = client.estimate_fees().await?;

        let quote = FeeQuote::new(
            gas_limit,
            fees.max_fee_per_gas,
            fees.max_priority_fee_per_gas,
        );

        tracing::debug!(
            gas_limit = quote.gas_limit,
            max_fee_per_gas = quote.max_fee_per_gas,
            total_fee = %quote.total_fee,
            "Fee quote"
        );

        Ok(quote)
    }

    /// Reject a quote whose total fee is above the ceiling
    pub fn enforce(&self, quote: &FeeQuote) -> Result<()> {
        if quote.total_fee > self.max_fee {
            tracing::warn!(
                fee = %quote.total_fee,
                max_fee = %self.max_fee,
                "Fee guard blocked submission"
            );
            return Err(Error::FeeExceeded {
                fee: quote.total_fee,
                max_fee: self.max_fee,
            });
        }

        tracing::debug!(
            fee = %quote.total_fee,
            max_fee = %self.max_fee,
            "Fee check passed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;
    use crate::ErrorKind;
    use alloy::primitives::address;

    #[test]
    fn test_total_fee_is_gas_times_price() {
        let quote = FeeQuote::new(21_000, 30_000_000_000, 1_000_000_000);
        assert_eq!(quote.total_fee, U256::from(630_000_000_000_000u64));
    }

    #[test]
    fn test_allows_fee_at_ceiling() {
        let quote = FeeQuote::new(21_000, 10, 1);
        let guard = FeeGuard::new(U256::from(210_000u64));
        assert!(guard.enforce(&quote).is_ok());
    }

    #[test]
    fn test_blocks_fee_above_ceiling() {
        let quote = FeeQuote::new(21_000, 10, 1);
        let guard = FeeGuard::new(U256::from(209_999u64));

        let err = guard.enforce(&quote).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FeeExceeded);
        assert!(err.to_string().contains("max fee"));
    }

    #[test]
    fn test_ceiling_of_one_wei_blocks_any_real_transfer() {
        let quote = FeeQuote::new(21_000, 2, 1);
        let guard = FeeGuard::new(U256::from(1u64));
        assert!(matches!(
            guard.enforce(&quote),
            Err(Error::FeeExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_quote_uses_client_estimates() {
        let client = MockClient::new();
        let from = address!("1111111111111111111111111111111111111111");
        client.fund(from, U256::from(10u64).pow(U256::from(18u64)));

        let request = TransactionRequest::default()
            .from(from)
            .to(address!("2222222222222222222222222222222222222222"))
            .value(U256::from(1u64));

        let guard = FeeGuard::new(U256::MAX);
        let quote = guard.quote(&client, &request).await.unwrap();

        assert_eq!(quote.gas_limit, 21_000);
        assert_eq!(quote.max_fee_per_gas, client.max_fee_per_gas());
        assert_eq!(
            quote.total_fee,
            U256::from(21_000u64) * U256::from(client.max_fee_per_gas())
        );
    }
}
