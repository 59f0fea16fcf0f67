//! Fetch error types.

use std::time::Duration;

use thiserror::Error;

/// Failure of one fetch attempt. The inner strings carry internal detail
/// for logs; use [`FetchError::user_message`] for anything user facing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("malformed response: {0}")]
    Data(String),

    /// The fetch task died before producing a result
    #[error("fetch task failed: {0}")]
    Internal(String),
}

/// Error taxonomy exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or RPC failure, including timeouts
    Transport,
    /// The response did not have the expected shape
    Data,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) | FetchError::Timeout(_) => ErrorKind::Transport,
            FetchError::AccountNotFound(_) | FetchError::Data(_) | FetchError::Internal(_) => ErrorKind::Data,
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Sanitized description for the presentation layer
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => {
                "Failed to fetch portfolio data. Please check your connection and try again."
            }
            FetchError::Timeout(_) => "The network took too long to respond. Please try again.",
            FetchError::AccountNotFound(_) => "This account was not found on the selected network.",
            FetchError::Data(_) => "Received unexpected portfolio data. Please try again.",
            FetchError::Internal(_) => "Something went wrong while loading the portfolio. Please try again.",
        }
    }
}
