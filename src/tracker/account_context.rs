use solana_sdk::pubkey::Pubkey;
use tokio::sync::watch;
use tracing::info;

use crate::models::account::{AccountRef, Network};

/// Observable wallet connection: the connected account and selected network.
///
/// Subscribers are notified only when the `(address, network)` pair actually
/// changes. The selected network is remembered while disconnected.
pub struct AccountContext {
    sender: watch::Sender<Option<AccountRef>>,
    network: watch::Sender<Network>,
}

impl AccountContext {
    pub fn new(network: Network) -> Self {
        let (sender, _) = watch::channel(None);
        let (network, _) = watch::channel(network);
        Self { sender, network }
    }

    pub fn current(&self) -> Option<AccountRef> {
        *self.sender.borrow()
    }

    pub fn network(&self) -> Network {
        *self.network.borrow()
    }

    pub fn network_label(&self) -> &'static str {
        self.network().label()
    }

    /// Receiver handed to the tracker
    pub fn subscribe(&self) -> watch::Receiver<Option<AccountRef>> {
        self.sender.subscribe()
    }

    /// Connect `address` on the selected network
    pub fn connect(&self, address: Pubkey) {
        self.connect_on(address, self.network());
    }

    /// Select `network` and connect `address` on it as a single change
    pub fn connect_on(&self, address: Pubkey, network: Network) {
        self.network.send_replace(network);
        let account = AccountRef::new(address, network);
        info!("Wallet connected: {}", account);
        self.publish(Some(account));
    }

    pub fn disconnect(&self) {
        info!("Wallet disconnected");
        self.publish(None);
    }

    /// Select a network; a connected wallet is re-scoped to it
    pub fn switch_network(&self, network: Network) {
        self.network.send_replace(network);
        if let Some(account) = self.current() {
            info!("Switching {} to {}", account.address, network);
            self.publish(Some(AccountRef::new(account.address, network)));
        }
    }

    fn publish(&self, account: Option<AccountRef>) {
        self.sender.send_if_modified(|current| {
            if *current == account {
                return false;
            }
            *current = account;
            true
        });
    }
}
