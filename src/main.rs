use std::sync::Arc;

use anyhow::Context;
use solana_sdk::pubkey::Pubkey;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use portfolio_dashboard::utils::helper::parse_pubkey;
use portfolio_dashboard::{
  AccountContext, ConsoleEventHandler, DashboardConfig, DataSource, DemoDataProvider, Network,
  PortfolioDataProvider, PortfolioHandle, PortfolioTracker, RetryingFetcher, RpcDataProvider,
  SimplePriceProvider,
};

#[derive(Debug, PartialEq, Eq)]
enum Command {
  Refresh,
  Connect(Pubkey, Option<Network>),
  Disconnect,
  SwitchNetwork(Network),
  Status,
  Help,
  Quit,
}

fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
  let mut parts = line.split_whitespace();
  let Some(verb) = parts.next() else {
    return Ok(None);
  };

  let command = match verb.to_ascii_lowercase().as_str() {
    "r" | "refresh" => Command::Refresh,
    "connect" => {
      let address = parts.next().context("usage: connect <address> [network]")?;
      let network = parts.next().map(str::parse).transpose()?;
      Command::Connect(parse_pubkey(address)?, network)
    }
    "disconnect" => Command::Disconnect,
    "network" => {
      let name = parts.next().context("usage: network <mainnet-beta|devnet|testnet|localnet>")?;
      Command::SwitchNetwork(name.parse()?)
    }
    "status" => Command::Status,
    "help" | "?" => Command::Help,
    "q" | "quit" | "exit" => Command::Quit,
    other => anyhow::bail!("Unknown command: {} (try help)", other),
  };
  Ok(Some(command))
}

fn print_help() {
  info!("Commands: refresh | connect <address> [network] | disconnect | network <name> | status | quit");
}

fn apply_command(command: Command, context: &AccountContext, handle: &PortfolioHandle) {
  match command {
    Command::Refresh => {
      if !handle.refresh() {
        warn!("Tracker is no longer running");
      }
    }
    Command::Connect(address, Some(network)) => context.connect_on(address, network),
    Command::Connect(address, None) => context.connect(address),
    Command::Disconnect => context.disconnect(),
    Command::SwitchNetwork(network) => context.switch_network(network),
    Command::Status => {
      let state = handle.state();
      info!("State: {} | Network: {}", state.name(), context.network_label());
      if let Some(account) = context.current() {
        info!("Wallet: {}", account.address);
      }
      if let Some(message) = state.error_message() {
        info!("Last error: {}", message);
      }
    }
    Command::Help => print_help(),
    Command::Quit => {}
  }
}

fn build_data_provider(config: &DashboardConfig) -> Arc<dyn PortfolioDataProvider> {
  let inner: Arc<dyn PortfolioDataProvider> = match config.source {
    DataSource::Rpc => {
      info!("RPC URL: {}", config.rpc_url(config.network));
      Arc::new(RpcDataProvider::new(config.rpc_urls.clone()))
    }
    DataSource::Demo => {
      info!("Using demo portfolio data");
      Arc::new(DemoDataProvider::new())
    }
  };
  Arc::new(RetryingFetcher::new(inner, config.retry))
}

async fn run(config: DashboardConfig) -> anyhow::Result<()> {
  info!("Initializing portfolio dashboard v{}...", portfolio_dashboard::VERSION);
  info!("Network: {}", config.network.label());

  let context = AccountContext::new(config.network);
  match config.wallet_address {
    Some(address) => context.connect(address),
    None => info!("No WALLET_ADDRESS set, starting disconnected"),
  }

  let mut tracker = PortfolioTracker::new(
    build_data_provider(&config),
    context.subscribe(),
    Arc::new(ConsoleEventHandler::new()),
  );
  if config.price_feed {
    tracker = tracker.with_price_provider(Arc::new(SimplePriceProvider::new()));
  }
  if let Some(interval) = config.refresh_interval {
    tracker = tracker.with_refresh_interval(interval);
  }

  let handle = tracker.handle();
  let tracker_task = tokio::spawn(tracker.run());

  info!("Portfolio dashboard is running. Press Ctrl+C to stop.");
  print_help();

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut stdin_open = true;

  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => {
        info!("Received Ctrl+C");
        break;
      }
      line = lines.next_line(), if stdin_open => {
        match line.context("Failed to read stdin")? {
          Some(line) => match parse_command(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => apply_command(command, &context, &handle),
            Ok(None) => {}
            Err(e) => warn!("{:#}", e),
          },
          None => {
            info!("stdin closed; running until Ctrl+C");
            stdin_open = false;
          }
        }
      }
    }
  }

  info!("Shutting down...");

  // Dropping the context closes the account channel, which stops the tracker
  drop(context);
  tracker_task.await.context("Tracker task panicked")??;

  Ok(())
}

fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  let config = DashboardConfig::from_env().context("Failed to load configuration")?;

  // Initialize logging
  tracing_subscriber::fmt()
    .with_level(true)
    .with_target(false)
    .with_max_level(config.log_level)
    .with_file(true)
    .with_line_number(true)
    .init();

  tokio::runtime::Runtime::new()?.block_on(run(config))
}
