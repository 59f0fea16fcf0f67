use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;
use crate::models::account::AccountRef;
use crate::models::token::TokenHolding;
use crate::providers::token_registry::{USDC_MINT, USDT_MINT};
use crate::traits::data_provider::PortfolioDataProvider;

/// Offline provider returning a fixed portfolio for every account:
/// 2.5 SOL, 1 USDC and 500 USDT.
#[derive(Debug, Clone, Default)]
pub struct DemoDataProvider;

impl DemoDataProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PortfolioDataProvider for DemoDataProvider {
    async fn fetch_native_balance(&self, account: &AccountRef) -> Result<u64, FetchError> {
        debug!("Serving demo native balance for {}", account);
        Ok(2_500_000_000)
    }

    async fn fetch_token_holdings(&self, account: &AccountRef) -> Result<Vec<TokenHolding>, FetchError> {
        debug!("Serving demo token holdings for {}", account);
        Ok(vec![
            TokenHolding::new(USDC_MINT, 1_000_000, 6, Some("USDC".to_string())),
            TokenHolding::new(USDT_MINT, 500_000_000, 6, Some("USDT".to_string())),
        ])
    }
}
