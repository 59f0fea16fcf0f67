//! End-to-end lifecycle tests: a scripted provider lets each test decide
//! when, and with what, every fetch settles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::{mpsc, oneshot, watch, Mutex};

use portfolio_dashboard::providers::token_registry::USDC_MINT;
use portfolio_dashboard::{
    AccountContext, AccountRef, FetchError, Network, PortfolioDataProvider, PortfolioEventHandler,
    PortfolioHandle, PortfolioState, PortfolioTracker, RawPortfolio, SimplePriceProvider, TokenHolding,
};

type Reply = oneshot::Sender<Result<RawPortfolio, FetchError>>;

/// Every fetch is announced on a channel and blocks until the test replies
struct ScriptedProvider {
    requests: mpsc::UnboundedSender<(AccountRef, Reply)>,
}

#[async_trait]
impl PortfolioDataProvider for ScriptedProvider {
    async fn fetch_native_balance(&self, account: &AccountRef) -> Result<u64, FetchError> {
        Ok(self.fetch_portfolio(account).await?.native_balance_raw)
    }

    async fn fetch_token_holdings(&self, account: &AccountRef) -> Result<Vec<TokenHolding>, FetchError> {
        Ok(self.fetch_portfolio(account).await?.holdings)
    }

    async fn fetch_portfolio(&self, account: &AccountRef) -> Result<RawPortfolio, FetchError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send((*account, reply))
            .map_err(|_| FetchError::Transport("test harness gone".into()))?;
        response
            .await
            .map_err(|_| FetchError::Transport("reply dropped".into()))?
    }
}

/// Blows up inside the fetch task
struct PanickingProvider;

#[async_trait]
impl PortfolioDataProvider for PanickingProvider {
    async fn fetch_native_balance(&self, _account: &AccountRef) -> Result<u64, FetchError> {
        panic!("balance decoder bug");
    }

    async fn fetch_token_holdings(&self, _account: &AccountRef) -> Result<Vec<TokenHolding>, FetchError> {
        Ok(vec![])
    }
}

#[derive(Default)]
struct ErrorCounter {
    errors: AtomicUsize,
}

#[async_trait]
impl PortfolioEventHandler for ErrorCounter {
    async fn handle_state_change(&self, _account: Option<&AccountRef>, _state: &PortfolioState) {}

    async fn handle_error(&self, _account: &AccountRef, _error: &FetchError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    context: AccountContext,
    handle: PortfolioHandle,
    requests: Mutex<mpsc::UnboundedReceiver<(AccountRef, Reply)>>,
    errors: Arc<ErrorCounter>,
}

impl Harness {
    fn start(configure: impl FnOnce(PortfolioTracker) -> PortfolioTracker) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let context = AccountContext::new(Network::Devnet);
        let errors = Arc::new(ErrorCounter::default());

        let tracker = configure(PortfolioTracker::new(
            Arc::new(ScriptedProvider { requests: tx }),
            context.subscribe(),
            errors.clone(),
        ));
        let handle = tracker.handle();
        tokio::spawn(tracker.run());

        Self {
            context,
            handle,
            requests: Mutex::new(rx),
            errors,
        }
    }

    async fn next_request(&self) -> (AccountRef, Reply) {
        tokio::time::timeout(Duration::from_secs(5), self.requests.lock().await.recv())
            .await
            .expect("no fetch was issued")
            .expect("provider dropped")
    }

    async fn wait_for(&self, what: &str, check: impl FnMut(&PortfolioState) -> bool) -> PortfolioState {
        let mut rx: watch::Receiver<PortfolioState> = self.handle.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(check))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {}", what))
            .expect("tracker stopped");
        state.clone()
    }

    /// Give the tracker a chance to process anything already queued
    async fn settle_time(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

fn raw(lamports: u64) -> RawPortfolio {
    RawPortfolio::new(lamports, vec![])
}

fn native_raw(state: &PortfolioState) -> Option<u64> {
    state.snapshot().map(|s| s.native_balance_raw)
}

#[tokio::test]
async fn starts_disconnected_and_loads_on_connect() {
    let harness = Harness::start(|t| t);
    assert_eq!(harness.handle.state(), PortfolioState::Disconnected);

    let wallet = Pubkey::new_unique();
    harness.context.connect(wallet);

    let (account, reply) = harness.next_request().await;
    assert_eq!(account, AccountRef::new(wallet, Network::Devnet));
    harness
        .wait_for("loading", |s| *s == PortfolioState::Loading { previous: None })
        .await;

    reply
        .send(Ok(RawPortfolio::new(
            2_500_000_000,
            vec![TokenHolding::new(USDC_MINT, 1_000_000, 6, Some("USDC".into()))],
        )))
        .unwrap();

    let state = harness.wait_for("ready", |s| matches!(s, PortfolioState::Ready { .. })).await;
    let snapshot = state.snapshot().unwrap();
    assert_eq!(snapshot.native_balance, dec!(2.5));
    assert_eq!(snapshot.holdings[0].display_amount, dec!(1));
    assert_eq!(snapshot.total_value, dec!(1));
    assert!(snapshot.valuation.is_none());
}

#[tokio::test]
async fn stale_response_never_overwrites_current_account() {
    let harness = Harness::start(|t| t);
    let wallet_a = Pubkey::new_unique();
    let wallet_b = Pubkey::new_unique();

    harness.context.connect(wallet_a);
    let (account_a, reply_a) = harness.next_request().await;
    assert_eq!(account_a.address, wallet_a);

    harness.context.connect(wallet_b);
    let (account_b, reply_b) = harness.next_request().await;
    assert_eq!(account_b.address, wallet_b);

    reply_a.send(Ok(raw(111))).unwrap();
    harness.settle_time().await;
    assert!(harness.handle.state().is_loading());
    assert_eq!(native_raw(&harness.handle.state()), None);

    reply_b.send(Ok(raw(222))).unwrap();
    let state = harness.wait_for("ready", |s| matches!(s, PortfolioState::Ready { .. })).await;
    assert_eq!(native_raw(&state), Some(222));
}

#[tokio::test]
async fn late_result_after_switch_is_dropped() {
    let harness = Harness::start(|t| t);
    harness.context.connect(Pubkey::new_unique());
    let (_, reply_a) = harness.next_request().await;

    harness.context.switch_network(Network::MainnetBeta);
    let (account_b, reply_b) = harness.next_request().await;
    assert_eq!(account_b.network, Network::MainnetBeta);

    reply_b.send(Ok(raw(7))).unwrap();
    harness.wait_for("ready", |s| native_raw(s) == Some(7)).await;

    reply_a.send(Ok(raw(6))).unwrap();
    harness.settle_time().await;
    assert_eq!(native_raw(&harness.handle.state()), Some(7));
}

#[tokio::test]
async fn fetch_failure_surfaces_sanitized_error() {
    let harness = Harness::start(|t| t);
    harness.context.connect(Pubkey::new_unique());

    let (_, reply) = harness.next_request().await;
    reply
        .send(Err(FetchError::Transport("dns error: api.devnet.solana.com".into())))
        .unwrap();

    let state = harness.wait_for("error", |s| matches!(s, PortfolioState::Error { .. })).await;
    match state {
        PortfolioState::Error { message, previous } => {
            assert!(!message.is_empty());
            assert!(!message.contains("dns error"));
            assert!(previous.is_none());
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert_eq!(harness.errors.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disconnect_during_loading_wins() {
    let harness = Harness::start(|t| t);
    harness.context.connect(Pubkey::new_unique());
    let (_, reply) = harness.next_request().await;

    harness.context.disconnect();
    harness
        .wait_for("disconnected", |s| *s == PortfolioState::Disconnected)
        .await;

    let _ = reply.send(Ok(raw(5)));
    harness.settle_time().await;
    assert_eq!(harness.handle.state(), PortfolioState::Disconnected);
}

#[tokio::test]
async fn refresh_keeps_stale_snapshot_visible() {
    let harness = Harness::start(|t| t);
    harness.context.connect(Pubkey::new_unique());

    let (_, reply) = harness.next_request().await;
    reply.send(Ok(raw(1))).unwrap();
    harness.wait_for("ready", |s| matches!(s, PortfolioState::Ready { .. })).await;

    assert!(harness.handle.refresh());
    let (_, reply) = harness.next_request().await;
    let loading = harness.wait_for("loading", |s| s.is_loading()).await;
    assert_eq!(native_raw(&loading), Some(1));

    reply.send(Err(FetchError::Timeout(Duration::from_secs(10)))).unwrap();
    let failed = harness.wait_for("error", |s| s.error_message().is_some()).await;
    assert_eq!(native_raw(&failed), Some(1));

    assert!(harness.handle.refresh());
    let (_, reply) = harness.next_request().await;
    reply.send(Ok(raw(2))).unwrap();
    harness.wait_for("recovered", |s| native_raw(s) == Some(2) && !s.is_loading()).await;
}

#[tokio::test]
async fn refresh_while_disconnected_does_nothing() {
    let harness = Harness::start(|t| t);
    assert!(harness.handle.refresh());
    harness.settle_time().await;

    assert_eq!(harness.handle.state(), PortfolioState::Disconnected);
    assert!(harness.requests.lock().await.try_recv().is_err());
}

#[tokio::test]
async fn price_feed_attaches_valuation() {
    let harness = Harness::start(|t| t.with_price_provider(Arc::new(SimplePriceProvider::new())));
    harness.context.connect(Pubkey::new_unique());

    let (_, reply) = harness.next_request().await;
    reply
        .send(Ok(RawPortfolio::new(
            1_000_000_000,
            vec![
                TokenHolding::new(USDC_MINT, 2_000_000, 6, Some("USDC".into())),
                TokenHolding::new(Pubkey::new_unique(), 10, 0, None),
            ],
        )))
        .unwrap();

    let state = harness.wait_for("ready", |s| matches!(s, PortfolioState::Ready { .. })).await;
    let snapshot = state.snapshot().unwrap();
    assert_eq!(snapshot.total_value, dec!(12));

    let valuation = snapshot.valuation.as_ref().unwrap();
    assert_eq!(valuation.usd_total, dec!(102));
    assert_eq!(valuation.priced_holdings, 1);
    assert_eq!(valuation.unpriced_holdings, 1);
}

#[tokio::test(start_paused = true)]
async fn scheduled_refresh_refetches() {
    let harness = Harness::start(|t| t.with_refresh_interval(Duration::from_secs(30)));
    harness.context.connect(Pubkey::new_unique());

    let (_, reply) = harness.next_request().await;
    reply.send(Ok(raw(1))).unwrap();
    harness.wait_for("ready", |s| native_raw(s) == Some(1)).await;

    tokio::time::advance(Duration::from_secs(31)).await;
    let (_, reply) = harness.next_request().await;
    reply.send(Ok(raw(2))).unwrap();
    harness.wait_for("refreshed", |s| native_raw(s) == Some(2) && !s.is_loading()).await;
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_outlives_scheduled_ticks() {
    let harness = Harness::start(|t| t.with_refresh_interval(Duration::from_secs(1)));
    harness.context.connect(Pubkey::new_unique());
    let (_, reply) = harness.next_request().await;

    // Two intervals pass while the first fetch is still running
    tokio::time::advance(Duration::from_millis(2_100)).await;
    harness.settle_time().await;
    assert!(harness.requests.lock().await.try_recv().is_err());
    assert!(harness.handle.state().is_loading());

    reply.send(Ok(raw(1))).unwrap();
    harness
        .wait_for("ready", |s| matches!(s, PortfolioState::Ready { .. }))
        .await;
    assert_eq!(native_raw(&harness.handle.state()), Some(1));
}

#[tokio::test]
async fn crashed_fetch_task_surfaces_error() {
    let context = AccountContext::new(Network::Devnet);
    let errors = Arc::new(ErrorCounter::default());
    let tracker = PortfolioTracker::new(Arc::new(PanickingProvider), context.subscribe(), errors.clone());
    let handle = tracker.handle();
    tokio::spawn(tracker.run());

    context.connect(Pubkey::new_unique());

    let mut rx = handle.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.error_message().is_some()))
        .await
        .expect("fetch never settled")
        .expect("tracker stopped")
        .clone();
    match state {
        PortfolioState::Error { message, previous } => {
            assert!(!message.contains("decoder bug"));
            assert!(previous.is_none());
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert_eq!(errors.errors.load(Ordering::SeqCst), 1);

    // The tracker keeps serving refreshes after the crash
    assert!(handle.refresh());
    tokio::time::timeout(Duration::from_secs(5), async {
        while errors.errors.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("refresh never settled");
    assert!(handle.state().error_message().is_some());
}
