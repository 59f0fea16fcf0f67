use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::providers::token_registry;
use crate::traits::price_provider::PriceProvider;

/// Placeholder price feed backed by the known-token registry, with caching.
///
/// Unknown mints have no quote rather than a zero price, so the valuation
/// can report them as unpriced.
pub struct SimplePriceProvider {
    price_cache: Arc<DashMap<Pubkey, Decimal>>,
    native_price: Option<Decimal>,
}

impl SimplePriceProvider {
    /// Create a new simple price provider
    pub fn new() -> Self {
        Self {
            price_cache: Arc::new(DashMap::new()),
            native_price: Some(Decimal::ONE_HUNDRED),
        }
    }

    /// Override the SOL quote
    pub fn with_native_price(mut self, price: Option<Decimal>) -> Self {
        self.native_price = price;
        self
    }

    /// Pin a quote for a mint
    pub fn set_price(&self, mint: Pubkey, price: Decimal) {
        self.price_cache.insert(mint, price);
    }

    fn reference_price(&self, mint: &Pubkey) -> Option<Decimal> {
        let price = token_registry::lookup(mint).and_then(|token| token.reference_price);
        match price {
            Some(price) => debug!("Found known price for {}: ${}", mint, price),
            None => debug!("No price available for {}", mint),
        }
        price
    }
}

impl Default for SimplePriceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for SimplePriceProvider {
    async fn get_token_price(&self, mint: &Pubkey) -> Option<Decimal> {
        if let Some(price) = self.price_cache.get(mint) {
            return Some(*price);
        }

        let price = self.reference_price(mint)?;
        self.price_cache.insert(*mint, price);
        Some(price)
    }

    async fn get_native_price(&self) -> Option<Decimal> {
        self.native_price
    }
}
