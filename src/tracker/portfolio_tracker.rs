use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinSet};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::FetchError;
use crate::models::account::AccountRef;
use crate::models::portfolio::{PortfolioSnapshot, PriceQuotes};
use crate::models::state::PortfolioState;
use crate::tracker::normalizer::normalize;
use crate::tracker::state_machine::{FetchTicket, PortfolioStateMachine};
use crate::traits::{
    data_provider::PortfolioDataProvider,
    event_handler::PortfolioEventHandler,
    price_provider::PriceProvider,
};

type FetchOutcome = Result<PortfolioSnapshot, FetchError>;

/// Fetch tasks in flight, each tied to the ticket it was issued for
#[derive(Default)]
struct InFlight {
    tasks: JoinSet<FetchOutcome>,
    tickets: HashMap<task::Id, FetchTicket>,
}

impl InFlight {
    fn spawn<F>(&mut self, ticket: FetchTicket, fetch: F)
    where
        F: Future<Output = FetchOutcome> + Send + 'static,
    {
        let id = self.tasks.spawn(fetch).id();
        self.tickets.insert(id, ticket);
    }

    /// Next finished fetch. A task that panicked settles its ticket as
    /// [`FetchError::Internal`].
    async fn next(&mut self) -> Option<(FetchTicket, FetchOutcome)> {
        loop {
            let (id, outcome) = match self.tasks.join_next_with_id().await? {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => {
                    error!("Fetch task failed: {}", e);
                    (e.id(), Err(FetchError::Internal(e.to_string())))
                }
            };
            if let Some(ticket) = self.tickets.remove(&id) {
                return Some((ticket, outcome));
            }
        }
    }

    fn abort_all(&mut self) {
        self.tasks.abort_all();
        self.tickets.clear();
    }
}

/// Drives the portfolio state machine from account changes, refresh
/// requests and fetch completions, all on a single task.
pub struct PortfolioTracker {
    data_provider: Arc<dyn PortfolioDataProvider>,
    price_provider: Option<Arc<dyn PriceProvider>>,
    event_handler: Arc<dyn PortfolioEventHandler>,
    accounts: watch::Receiver<Option<AccountRef>>,
    refresh_interval: Option<Duration>,
    state_tx: watch::Sender<PortfolioState>,
    refresh_tx: mpsc::UnboundedSender<()>,
    refresh_rx: mpsc::UnboundedReceiver<()>,
}

/// Read side handed to the presentation layer
#[derive(Clone)]
pub struct PortfolioHandle {
    state: watch::Receiver<PortfolioState>,
    refresh_tx: mpsc::UnboundedSender<()>,
}

impl PortfolioHandle {
    /// Current state
    pub fn state(&self) -> PortfolioState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<PortfolioState> {
        self.state.clone()
    }

    /// Ask for a new fetch cycle for the current account.
    ///
    /// Ignored while disconnected. Returns `false` once the tracker stopped.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.send(()).is_ok()
    }
}

impl PortfolioTracker {
    /// Create a new portfolio tracker
    pub fn new(
        data_provider: Arc<dyn PortfolioDataProvider>,
        accounts: watch::Receiver<Option<AccountRef>>,
        event_handler: Arc<dyn PortfolioEventHandler>,
    ) -> Self {
        let (state_tx, _) = watch::channel(PortfolioState::Disconnected);
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        Self {
            data_provider,
            price_provider: None,
            event_handler,
            accounts,
            refresh_interval: None,
            state_tx,
            refresh_tx,
            refresh_rx,
        }
    }

    /// Attach a price feed used to value each snapshot
    pub fn with_price_provider(mut self, price_provider: Arc<dyn PriceProvider>) -> Self {
        self.price_provider = Some(price_provider);
        self
    }

    /// Refresh automatically every `interval` while connected
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn handle(&self) -> PortfolioHandle {
        PortfolioHandle {
            state: self.state_tx.subscribe(),
            refresh_tx: self.refresh_tx.clone(),
        }
    }

    /// Run until the account context is dropped
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting portfolio tracker");

        let mut machine = PortfolioStateMachine::new();
        let mut fetches = InFlight::default();
        let mut ticker = self.refresh_interval.map(|period| {
            info!("Automatic refresh every {:?}", period);
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        let initial = *self.accounts.borrow_and_update();
        self.apply_account(&mut machine, &mut fetches, initial).await;

        loop {
            tokio::select! {
                biased;

                changed = self.accounts.changed() => {
                    if changed.is_err() {
                        info!("Account context closed, stopping tracker");
                        break;
                    }
                    let account = *self.accounts.borrow_and_update();
                    self.apply_account(&mut machine, &mut fetches, account).await;
                }
                Some((ticket, outcome)) = fetches.next() => {
                    // An account change that raced this result is applied first
                    if self.accounts.has_changed().unwrap_or(false) {
                        let account = *self.accounts.borrow_and_update();
                        self.apply_account(&mut machine, &mut fetches, account).await;
                    }
                    self.settle(&mut machine, ticket, outcome).await;
                }
                Some(()) = self.refresh_rx.recv() => {
                    self.refresh(&mut machine, &mut fetches, "manual").await;
                }
                _ = next_tick(&mut ticker) => {
                    // Ticks never supersede a fetch that is still running
                    match machine.pending() {
                        Some(pending) => {
                            debug!("Skipping scheduled refresh, fetch {} still running", pending.generation)
                        }
                        None => self.refresh(&mut machine, &mut fetches, "scheduled").await,
                    }
                }
            }
        }

        fetches.abort_all();
        Ok(())
    }

    async fn apply_account(
        &self,
        machine: &mut PortfolioStateMachine,
        fetches: &mut InFlight,
        account: Option<AccountRef>,
    ) {
        if machine.account() == account.as_ref() {
            return;
        }
        match account {
            Some(account) => info!("Tracking {}", account),
            None => info!("No wallet connected"),
        }

        if let Some(ticket) = machine.set_account(account) {
            self.spawn_fetch(fetches, ticket);
        }
        self.publish(machine).await;
    }

    async fn refresh(&self, machine: &mut PortfolioStateMachine, fetches: &mut InFlight, reason: &str) {
        match machine.refresh() {
            Some(ticket) => {
                debug!("{} refresh for {}", reason, ticket.account);
                self.spawn_fetch(fetches, ticket);
                self.publish(machine).await;
            }
            None => debug!("Ignoring {} refresh while disconnected", reason),
        }
    }

    async fn settle(
        &self,
        machine: &mut PortfolioStateMachine,
        ticket: FetchTicket,
        outcome: FetchOutcome,
    ) {
        let failure = outcome.as_ref().err().cloned();
        if !machine.settle(&ticket, outcome) {
            debug!("Discarded stale result of fetch {} for {}", ticket.generation, ticket.account);
            return;
        }

        if let Some(error) = failure {
            warn!("Portfolio fetch for {} failed: {}", ticket.account, error);
            self.event_handler.handle_error(&ticket.account, &error).await;
        }
        self.publish(machine).await;
    }

    fn spawn_fetch(&self, fetches: &mut InFlight, ticket: FetchTicket) {
        let data_provider = self.data_provider.clone();
        let price_provider = self.price_provider.clone();
        let account = ticket.account;

        fetches.spawn(ticket, async move {
            let raw = match data_provider.fetch_portfolio(&account).await {
                Ok(raw) => raw,
                Err(e) => return Err(e),
            };
            let snapshot = normalize(&raw);
            Ok(match price_provider {
                Some(prices) => price_snapshot(snapshot, prices.as_ref()).await,
                None => snapshot,
            })
        });
    }

    async fn publish(&self, machine: &PortfolioStateMachine) {
        let state = machine.state().clone();
        debug!("Portfolio state: {}", state.name());
        self.state_tx.send_replace(state.clone());
        self.event_handler.handle_state_change(machine.account(), &state).await;
    }
}

/// Attach a USD valuation from `prices`. Missing quotes never fail the cycle.
pub async fn price_snapshot(snapshot: PortfolioSnapshot, prices: &dyn PriceProvider) -> PortfolioSnapshot {
    let mints: Vec<Pubkey> = snapshot.holdings.iter().map(|h| *h.mint()).collect();
    let token_prices = prices.get_batch_prices(&mints).await;

    let quotes = PriceQuotes {
        native: prices.get_native_price().await,
        tokens: mints
            .into_iter()
            .zip(token_prices)
            .filter_map(|(mint, price)| price.map(|price| (mint, price)))
            .collect(),
    };
    snapshot.with_valuation(&quotes)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
