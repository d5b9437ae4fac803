//! Error types for the pf-search crate.
//!
//! This module provides the [`SearchError`] type. Every failure of an
//! enumeration is converted into one of these variants at the enumerator
//! boundary; nothing escapes as a panic or an untyped error.

use std::io;

/// Errors produced while narrowing or enumerating candidates.
///
/// # Error Recovery Strategy
///
/// - **No project root** ([`SearchError::NoProjectRoot`]): shown as a notice, candidates cleared
/// - **Process failure** ([`SearchError::ProcessFailure`]): diagnostics shown, candidates cleared
/// - **Transport** ([`SearchError::Transport`]): fatal for the request, never for the session
/// - **Cancelled** ([`SearchError::Cancelled`]): superseded request, silently dropped
///
/// # Examples
///
/// ```
/// use pf_search::SearchError;
///
/// let err = SearchError::process_failure("find", Some(1), "find: 'x': No such file or directory");
/// assert!(err.to_string().contains("No such file"));
/// assert!(err.is_reportable());
/// assert!(!SearchError::Cancelled.is_reportable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No project root is registered, so there is nothing to search.
    #[error("no project root is configured")]
    NoProjectRoot,

    /// The listing program ran and exited unsuccessfully.
    #[error("{program} exited with {}: {stderr}", exit_label(*code))]
    ProcessFailure {
        /// Program name.
        program: String,
        /// Exit status, `None` if terminated by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The listing program could not be started or read from.
    #[error("failed to run {program}: {source}")]
    Transport {
        /// Program name.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A newer search superseded this one.
    #[error("search superseded")]
    Cancelled,
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_owned(), |code| format!("status {code}"))
}

impl SearchError {
    /// Creates a new [`SearchError::ProcessFailure`] error.
    #[inline]
    pub fn process_failure(
        program: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ProcessFailure {
            program: program.into(),
            code,
            stderr: stderr.into().trim_end().to_owned(),
        }
    }

    /// Creates a new [`SearchError::Transport`] error.
    #[inline]
    pub fn transport(program: impl Into<String>, source: io::Error) -> Self {
        Self::Transport {
            program: program.into(),
            source,
        }
    }

    /// Returns `true` if the user should be told about this error.
    #[inline]
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Returns `true` if the listing program could not be used at all.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failure_display() {
        let err = SearchError::process_failure("find", Some(1), "bad root\n");
        assert_eq!(err.to_string(), "find exited with status 1: bad root");
    }

    #[test]
    fn test_signal_display() {
        let err = SearchError::process_failure("find", None, "");
        assert!(err.to_string().contains("a signal"));
    }

    #[test]
    fn test_transport_is_fatal() {
        let err = SearchError::transport("fd", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_fatal());
        assert!(err.is_reportable());
        assert!(err.to_string().starts_with("failed to run fd"));
    }

    #[test]
    fn test_cancelled_is_silent() {
        assert!(!SearchError::Cancelled.is_reportable());
        assert!(!SearchError::Cancelled.is_fatal());
        assert!(!SearchError::NoProjectRoot.is_fatal());
    }
}
