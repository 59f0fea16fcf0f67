//! Data providers for fetching portfolio information

pub mod demo_provider;
pub mod price_provider;
pub mod retry;
pub mod rpc_provider;
pub mod token_registry;

// Re-export for convenience
pub use demo_provider::DemoDataProvider;
pub use price_provider::SimplePriceProvider;
pub use retry::{RetryPolicy, RetryingFetcher};
pub use rpc_provider::RpcDataProvider;
