use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::account::AccountRef;
use crate::models::state::PortfolioState;

/// Observer of the portfolio lifecycle
#[async_trait]
pub trait PortfolioEventHandler: Send + Sync {
    /// Called after every state transition
    async fn handle_state_change(&self, account: Option<&AccountRef>, state: &PortfolioState);

    /// Called with the full error of a failed, non-stale fetch
    async fn handle_error(&self, account: &AccountRef, error: &FetchError);
}
