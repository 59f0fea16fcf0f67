use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

/// Label used when a mint has no known ticker
pub const UNKNOWN_SYMBOL: &str = "Unknown";

/// Largest scale `Decimal` can represent
const MAX_DECIMAL_SCALE: u32 = 28;

/// One raw token balance as retrieved from the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHolding {
    pub mint: Pubkey,
    /// Amount in the token's smallest unit
    pub raw_amount: u64,
    pub decimals: u8,
    pub symbol: Option<String>,
}

impl TokenHolding {
    /// Create a new token holding
    pub fn new(mint: Pubkey, raw_amount: u64, decimals: u8, symbol: Option<String>) -> Self {
        Self {
            mint,
            raw_amount,
            decimals,
            symbol,
        }
    }

    /// `raw_amount / 10^decimals`, exact for every scale `Decimal` supports.
    ///
    /// Mints with more than 28 decimals are first truncated to 28 places.
    pub fn display_amount(&self) -> Decimal {
        let scale = u32::from(self.decimals);
        if scale <= MAX_DECIMAL_SCALE {
            return Decimal::from_i128_with_scale(i128::from(self.raw_amount), scale);
        }

        let excess = scale - MAX_DECIMAL_SCALE;
        let truncated = 10u64
            .checked_pow(excess)
            .map_or(0, |divisor| self.raw_amount / divisor);
        Decimal::from_i128_with_scale(i128::from(truncated), MAX_DECIMAL_SCALE)
    }

    /// Ticker, or the "Unknown" label
    pub fn symbol_label(&self) -> &str {
        self.symbol.as_deref().unwrap_or(UNKNOWN_SYMBOL)
    }
}

/// A holding together with its human-scaled amount
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHolding {
    pub holding: TokenHolding,
    pub display_amount: Decimal,
}

impl NormalizedHolding {
    pub fn mint(&self) -> &Pubkey {
        &self.holding.mint
    }

    pub fn symbol_label(&self) -> &str {
        self.holding.symbol_label()
    }
}

impl From<TokenHolding> for NormalizedHolding {
    fn from(holding: TokenHolding) -> Self {
        let display_amount = holding.display_amount();
        Self {
            holding,
            display_amount,
        }
    }
}
