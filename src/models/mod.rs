//! Data models for the portfolio dashboard

pub mod account;
pub mod portfolio;
pub mod state;
pub mod token;

// Re-export for convenience
pub use account::{AccountRef, Network};
pub use portfolio::{PortfolioSnapshot, PriceQuotes, RawPortfolio, Valuation};
pub use state::PortfolioState;
pub use token::{NormalizedHolding, TokenHolding};
