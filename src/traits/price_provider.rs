use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

/// Trait for price feed providers
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Get price for a token in USD
    async fn get_token_price(&self, mint: &Pubkey) -> Option<Decimal>;

    /// Get SOL price in USD
    async fn get_native_price(&self) -> Option<Decimal>;

    /// Get prices for multiple tokens, same order as `mints`
    async fn get_batch_prices(&self, mints: &[Pubkey]) -> Vec<Option<Decimal>> {
        let mut prices = Vec::with_capacity(mints.len());
        for mint in mints {
            prices.push(self.get_token_price(mint).await);
        }
        prices
    }
}
