//! Widget Errors
//!
//! Every failure the session manager can record. None of these escape
//! `send`: they are converted into an error string plus an error reply in
//! the message list.

use thiserror::Error;

use crate::backend::BackendError;

/// Failures recorded by the session manager
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The widget cannot talk to any backend (missing base URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or non-2xx response
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend answered with `status: false`
    #[error("{0}")]
    Application(String),

    /// The backend reported success without a payload
    #[error("Invalid response: missing answer data")]
    MalformedResponse,
}

impl WidgetError {
    /// Whether the user can retry after this error
    ///
    /// Only configuration errors are terminal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
