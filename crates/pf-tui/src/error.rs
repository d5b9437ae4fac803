//! TUI-specific error types.

use pf_nav::NavError;
use thiserror::Error;

/// Errors that can occur in the terminal picker.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TuiError {
    /// Terminal initialization or operation failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// Creating a path failed.
    #[error(transparent)]
    Navigation(#[from] NavError),

    /// The editor could not be resolved or exited unsuccessfully.
    #[error("editor error: {0}")]
    Editor(String),
}

impl TuiError {
    /// Creates a new editor error.
    #[must_use]
    pub fn editor(message: impl Into<String>) -> Self {
        Self::Editor(message.into())
    }

    /// Returns `true` if the session can continue after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Navigation(_))
    }
}
