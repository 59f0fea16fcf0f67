//! Pure conversion from raw fetch results to display-ready snapshots.

use rust_decimal::Decimal;

use crate::models::portfolio::{PortfolioSnapshot, RawPortfolio, NATIVE_DECIMALS};
use crate::models::token::NormalizedHolding;

/// Lamports as SOL, exact
pub fn native_display_amount(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), NATIVE_DECIMALS)
}

/// Same-unit sum of display amounts; zero for no holdings
pub fn total_value(holdings: &[NormalizedHolding]) -> Decimal {
    holdings.iter().map(|h| h.display_amount).sum()
}

/// Build a snapshot from one raw fetch result. Holdings keep retrieval order.
pub fn normalize(raw: &RawPortfolio) -> PortfolioSnapshot {
    let holdings: Vec<NormalizedHolding> = raw
        .holdings
        .iter()
        .cloned()
        .map(NormalizedHolding::from)
        .collect();
    let total_value = total_value(&holdings);

    PortfolioSnapshot {
        native_balance_raw: raw.native_balance_raw,
        native_balance: native_display_amount(raw.native_balance_raw),
        holdings,
        total_value,
        valuation: None,
    }
}
