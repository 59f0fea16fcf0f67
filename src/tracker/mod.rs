//! Portfolio lifecycle: normalization, state machine and the async driver

pub mod account_context;
pub mod normalizer;
pub mod portfolio_tracker;
pub mod state_machine;

pub use account_context::AccountContext;
pub use normalizer::normalize;
pub use portfolio_tracker::{PortfolioHandle, PortfolioTracker};
pub use state_machine::{FetchTicket, PortfolioStateMachine};
