use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::account::AccountRef;
use crate::models::portfolio::RawPortfolio;
use crate::models::token::TokenHolding;
use crate::traits::data_provider::PortfolioDataProvider;

/// Bounded wait and exponential backoff applied at the fetch boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound for a single attempt
    pub timeout: Duration,
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero based): `base * 2^attempt`, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Wraps a provider with per-attempt timeouts and retries of transport errors
pub struct RetryingFetcher {
    inner: Arc<dyn PortfolioDataProvider>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(inner: Arc<dyn PortfolioDataProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn with_retry<T, F, Fut>(&self, account: &AccountRef, operation: &str, mut call: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.policy.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(self.policy.timeout)),
            };

            match result {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("{} for {} succeeded after {} retries", operation, account, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "{} for {} failed (attempt {}/{}): {}; retrying in {:?}",
                        operation,
                        account,
                        attempt + 1,
                        self.policy.max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl PortfolioDataProvider for RetryingFetcher {
    async fn fetch_native_balance(&self, account: &AccountRef) -> Result<u64, FetchError> {
        self.with_retry(account, "native balance fetch", || self.inner.fetch_native_balance(account))
            .await
    }

    async fn fetch_token_holdings(&self, account: &AccountRef) -> Result<Vec<TokenHolding>, FetchError> {
        self.with_retry(account, "token holdings fetch", || self.inner.fetch_token_holdings(account))
            .await
    }

    async fn fetch_portfolio(&self, account: &AccountRef) -> Result<RawPortfolio, FetchError> {
        self.with_retry(account, "portfolio fetch", || self.inner.fetch_portfolio(account))
            .await
    }
}
