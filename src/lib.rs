//! Portfolio Dashboard Library
//!
//! Fetches a connected Solana wallet's native and token balances, normalizes
//! them into display-ready values and exposes a disconnected / loading /
//! ready / error lifecycle to whatever renders it.

// Public modules - these are the API surface
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod tracker;
pub mod traits;
pub mod utils;

// Re-export commonly used items for easier access
pub use config::{DashboardConfig, DataSource};
pub use error::{ErrorKind, FetchError};
pub use handlers::{CompositeEventHandler, ConsoleEventHandler};
pub use models::{
    account::{AccountRef, Network},
    portfolio::{PortfolioSnapshot, PriceQuotes, RawPortfolio, Valuation},
    state::PortfolioState,
    token::{NormalizedHolding, TokenHolding},
};
pub use providers::{DemoDataProvider, RetryPolicy, RetryingFetcher, RpcDataProvider, SimplePriceProvider};
pub use tracker::{normalize, AccountContext, PortfolioHandle, PortfolioTracker};
pub use traits::{PortfolioDataProvider, PortfolioEventHandler, PriceProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, anyhow::Error>;
