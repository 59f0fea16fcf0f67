use super::portfolio::PortfolioSnapshot;

/// Lifecycle of the portfolio view as seen by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioState {
    /// No wallet connected. Nothing from a previous account is kept.
    Disconnected,
    /// A fetch is outstanding; `previous` may be rendered as stale data
    Loading { previous: Option<PortfolioSnapshot> },
    Ready { snapshot: PortfolioSnapshot },
    /// `message` is safe to show to the user
    Error {
        message: String,
        previous: Option<PortfolioSnapshot>,
    },
}

impl Default for PortfolioState {
    fn default() -> Self {
        PortfolioState::Disconnected
    }
}

impl PortfolioState {
    /// Most recent snapshot carried by this state, fresh or stale
    pub fn snapshot(&self) -> Option<&PortfolioSnapshot> {
        match self {
            PortfolioState::Disconnected => None,
            PortfolioState::Loading { previous } => previous.as_ref(),
            PortfolioState::Ready { snapshot } => Some(snapshot),
            PortfolioState::Error { previous, .. } => previous.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PortfolioState::Loading { .. })
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self, PortfolioState::Disconnected)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PortfolioState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            PortfolioState::Disconnected => "disconnected",
            PortfolioState::Loading { .. } => "loading",
            PortfolioState::Ready { .. } => "ready",
            PortfolioState::Error { .. } => "error",
        }
    }
}
