use std::collections::HashMap;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use super::token::{NormalizedHolding, TokenHolding};

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal places of the native currency
pub const NATIVE_DECIMALS: u32 = 9;

/// Unprocessed fetch result for one account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPortfolio {
    pub native_balance_raw: u64,
    /// Retrieval order is preserved through normalization
    pub holdings: Vec<TokenHolding>,
}

impl RawPortfolio {
    pub fn new(native_balance_raw: u64, holdings: Vec<TokenHolding>) -> Self {
        Self {
            native_balance_raw,
            holdings,
        }
    }
}

/// Aggregated, display-ready view of one fetch cycle.
///
/// Built only by normalization and never mutated afterwards; the next
/// successful fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub native_balance_raw: u64,
    pub native_balance: Decimal,
    pub holdings: Vec<NormalizedHolding>,
    /// Same-unit sum of every holding's display amount. Not a priced value.
    pub total_value: Decimal,
    /// Priced valuation, present only when a price feed was consulted
    pub valuation: Option<Valuation>,
}

impl PortfolioSnapshot {
    /// Check if snapshot is empty (no tokens)
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Number of tokens in portfolio
    pub fn token_count(&self) -> usize {
        self.holdings.len()
    }

    /// Attach a USD valuation computed from `quotes`.
    ///
    /// Holdings without a quote are counted as unpriced and contribute
    /// nothing to the total.
    pub fn with_valuation(mut self, quotes: &PriceQuotes) -> Self {
        let mut usd_total = Decimal::ZERO;
        let mut priced_holdings = 0;
        let mut unpriced_holdings = 0;

        for holding in &self.holdings {
            match quotes.tokens.get(holding.mint()) {
                Some(price) => {
                    usd_total += holding.display_amount * price;
                    priced_holdings += 1;
                }
                None => unpriced_holdings += 1,
            }
        }

        let native_usd = quotes.native.map(|price| self.native_balance * price);
        if let Some(value) = native_usd {
            usd_total += value;
        }

        self.valuation = Some(Valuation {
            usd_total,
            native_usd,
            priced_holdings,
            unpriced_holdings,
        });
        self
    }
}

/// USD prices gathered for one snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuotes {
    pub native: Option<Decimal>,
    pub tokens: HashMap<Pubkey, Decimal>,
}

/// Priced view of a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub usd_total: Decimal,
    pub native_usd: Option<Decimal>,
    pub priced_holdings: usize,
    pub unpriced_holdings: usize,
}

impl Valuation {
    /// True when every holding and the native balance had a quote
    pub fn is_complete(&self) -> bool {
        self.unpriced_holdings == 0 && self.native_usd.is_some()
    }
}
