//! Bounded sequential retry

use std::future::Future;
use std::time::Duration;

use crate::Result;

/// Attempt, wait a fixed delay on a retryable failure, try again.
///
/// `retries` counts attempts after the first, so `retries = 0` runs the
/// operation exactly once. Non-retryable errors are returned immediately;
/// once the budget is spent the last error is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation = what,
                        attempt,
                        max_retries = self.retries,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
