//! Core traits for the portfolio dashboard

pub mod data_provider;
pub mod event_handler;
pub mod price_provider;

// Re-export for convenience
pub use data_provider::PortfolioDataProvider;
pub use event_handler::PortfolioEventHandler;
pub use price_provider::PriceProvider;
