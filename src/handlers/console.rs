use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::models::account::AccountRef;
use crate::models::portfolio::PortfolioSnapshot;
use crate::models::state::PortfolioState;
use crate::traits::event_handler::PortfolioEventHandler;
use crate::utils::format::{format_native_balance, format_token_amount, format_total_value, format_usd};
use crate::utils::helper::format_pubkey;

/// Console logging event handler
pub struct ConsoleEventHandler;

impl ConsoleEventHandler {
    /// Create a new console event handler
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Text rendering of a snapshot, one entry per output line
pub fn snapshot_lines(snapshot: &PortfolioSnapshot, network_label: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshot.token_count() + 6);

    lines.push(format!("SOL Balance: {} SOL", format_native_balance(snapshot.native_balance_raw)));
    lines.push(format!("Network: {}", network_label));

    if snapshot.is_empty() {
        lines.push("No tokens found".to_string());
    } else {
        lines.push("Token Holdings:".to_string());
        for holding in &snapshot.holdings {
            lines.push(format!(
                "  {:<8} {:>24}  {}",
                holding.symbol_label(),
                format_token_amount(holding.display_amount),
                format_pubkey(holding.mint())
            ));
        }
    }

    lines.push(format!("Total Value: {}", format_total_value(snapshot.total_value)));
    if let Some(valuation) = &snapshot.valuation {
        let suffix = if valuation.unpriced_holdings > 0 {
            format!(" ({} unpriced)", valuation.unpriced_holdings)
        } else {
            String::new()
        };
        lines.push(format!("USD Value: {}{}", format_usd(valuation.usd_total), suffix));
    }
    lines
}

fn log_snapshot(snapshot: &PortfolioSnapshot, network_label: &str) {
    for line in snapshot_lines(snapshot, network_label) {
        info!("{}", line);
    }
}

#[async_trait]
impl PortfolioEventHandler for ConsoleEventHandler {
    async fn handle_state_change(&self, account: Option<&AccountRef>, state: &PortfolioState) {
        let network_label = account.map_or("-", |a| a.network.label());

        match (state, account) {
            (PortfolioState::Disconnected, _) | (_, None) => {
                info!("Please connect your Solana wallet to view your portfolio");
            }
            (PortfolioState::Loading { previous }, Some(account)) => {
                info!("Loading portfolio for {}...", format_pubkey(&account.address));
                if previous.is_some() {
                    info!("Showing last known portfolio until the refresh completes");
                }
            }
            (PortfolioState::Ready { snapshot }, Some(account)) => {
                info!("{}", "=".repeat(80));
                info!(
                    "Portfolio for {} at {}",
                    account.address,
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
                );
                info!("{}", "-".repeat(80));
                log_snapshot(snapshot, network_label);
                info!("{}", "=".repeat(80));
            }
            (PortfolioState::Error { message, previous }, Some(_)) => {
                warn!("{}", message);
                if let Some(snapshot) = previous {
                    info!("Last known portfolio:");
                    log_snapshot(snapshot, network_label);
                }
            }
        }
    }

    async fn handle_error(&self, account: &AccountRef, error: &FetchError) {
        info!("Portfolio tracker error for {}: {}", account, error);
    }
}
