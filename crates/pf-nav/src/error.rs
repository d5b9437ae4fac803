//! Error types for the pf-nav crate.
//!
//! Most unsuccessful navigation is not an error at all: operations that change
//! nothing report [`Outcome::NoOp`](crate::Outcome::NoOp). [`NavError`] covers
//! the remaining failures that touch the filesystem.

use camino::Utf8PathBuf;

/// Errors from navigation operations that write to the filesystem.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Creating a file or directory failed.
    #[error("failed to create {path}: {source}")]
    Create {
        /// The path that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl NavError {
    /// Creates a new [`NavError::Create`] error.
    #[inline]
    pub fn create(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Create {
            path: path.into(),
            source,
        }
    }

    /// The path involved in the error.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Create { path, .. } => path,
        }
    }
}
