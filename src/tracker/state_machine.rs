//! Portfolio lifecycle: disconnected, loading, ready and error.
//!
//! The machine is synchronous and does no I/O. Every transition that needs
//! data hands back a [`FetchTicket`]; the caller runs the fetch and reports
//! the outcome with [`PortfolioStateMachine::settle`]. Each ticket carries a
//! generation number, and only the ticket of the current generation for the
//! current account may change the state. Anything else is a stale response
//! and is dropped.

use tracing::debug;

use crate::error::FetchError;
use crate::models::account::AccountRef;
use crate::models::portfolio::PortfolioSnapshot;
use crate::models::state::PortfolioState;

/// Identifies one fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub account: AccountRef,
}

#[derive(Debug, Default)]
pub struct PortfolioStateMachine {
    state: PortfolioState,
    account: Option<AccountRef>,
    generation: u64,
    pending: Option<FetchTicket>,
}

impl PortfolioStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn account(&self) -> Option<&AccountRef> {
        self.account.as_ref()
    }

    /// Ticket of the outstanding fetch, if any
    pub fn pending(&self) -> Option<&FetchTicket> {
        self.pending.as_ref()
    }

    /// Apply an account context change.
    ///
    /// Returns a ticket when a new fetch must start. Setting the current
    /// account again is a no-op.
    pub fn set_account(&mut self, account: Option<AccountRef>) -> Option<FetchTicket> {
        if account == self.account {
            return None;
        }
        self.account = account;

        match account {
            None => {
                // Invalidate whatever is still in flight for the old account
                self.generation += 1;
                self.pending = None;
                self.state = PortfolioState::Disconnected;
                debug!("Account disconnected; generation {}", self.generation);
                None
            }
            Some(account) => Some(self.begin_fetch(account)),
        }
    }

    /// Request a new fetch cycle for the current account.
    ///
    /// Does nothing while disconnected. An outstanding fetch is superseded.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let account = self.account?;
        Some(self.begin_fetch(account))
    }

    /// Apply the outcome of a fetch.
    ///
    /// Returns `false` when the ticket is stale and the outcome was dropped.
    pub fn settle(&mut self, ticket: &FetchTicket, outcome: Result<PortfolioSnapshot, FetchError>) -> bool {
        if self.pending.as_ref() != Some(ticket) || self.account != Some(ticket.account) {
            debug!(
                "Dropping stale response for {} (generation {}, current {})",
                ticket.account, ticket.generation, self.generation
            );
            return false;
        }
        self.pending = None;

        let previous = self.take_snapshot();
        self.state = match outcome {
            Ok(snapshot) => PortfolioState::Ready { snapshot },
            Err(error) => PortfolioState::Error {
                message: error.user_message().to_string(),
                previous,
            },
        };
        true
    }

    fn begin_fetch(&mut self, account: AccountRef) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            account,
        };
        let previous = self.take_snapshot();
        self.state = PortfolioState::Loading { previous };
        self.pending = Some(ticket);
        debug!("Fetch {} started for {}", ticket.generation, account);
        ticket
    }

    /// Move the snapshot out of the current state, leaving it disconnected
    fn take_snapshot(&mut self) -> Option<PortfolioSnapshot> {
        match std::mem::take(&mut self.state) {
            PortfolioState::Disconnected => None,
            PortfolioState::Loading { previous } => previous,
            PortfolioState::Ready { snapshot } => Some(snapshot),
            PortfolioState::Error { previous, .. } => previous,
        }
    }
}
