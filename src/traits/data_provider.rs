use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::account::AccountRef;
use crate::models::portfolio::RawPortfolio;
use crate::models::token::TokenHolding;

/// Core trait for fetching raw portfolio data.
///
/// Implementations are stateless with respect to accounts and may be called
/// concurrently for different accounts.
#[async_trait]
pub trait PortfolioDataProvider: Send + Sync {
    /// Fetch the native balance in lamports
    async fn fetch_native_balance(&self, account: &AccountRef) -> Result<u64, FetchError>;

    /// Fetch all token holdings, in retrieval order
    async fn fetch_token_holdings(&self, account: &AccountRef) -> Result<Vec<TokenHolding>, FetchError>;

    /// Fetch both halves of the portfolio
    async fn fetch_portfolio(&self, account: &AccountRef) -> Result<RawPortfolio, FetchError> {
        let (native_balance_raw, holdings) = tokio::try_join!(
            self.fetch_native_balance(account),
            self.fetch_token_holdings(account),
        )?;
        Ok(RawPortfolio {
            native_balance_raw,
            holdings,
        })
    }
}
