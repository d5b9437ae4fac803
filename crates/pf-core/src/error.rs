//! Configuration errors.

use camino::{Utf8Path, Utf8PathBuf};

/// Why a configuration could not be used.
///
/// ```
/// use pf_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::ProjectRoot(Utf8PathBuf::from("/gone"));
/// assert_eq!(error.to_string(), "project folder is not a directory: /gone");
/// assert_eq!(error.path().map(|p| p.as_str()), Some("/gone"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configured project folder is missing or not a directory.
    #[error("project folder is not a directory: {0}")]
    ProjectRoot(Utf8PathBuf),

    /// An option holds a value serde accepted but pathfind cannot use.
    #[error("{option}: {reason}")]
    InvalidOption {
        /// Dotted option name, e.g. `match.scale_guard_ratio`.
        option: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`Config`](crate::Config).
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// An [`InvalidOption`](Self::InvalidOption) error.
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// The offending path, for errors about one.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::ProjectRoot(path) => Some(path),
            _ => None,
        }
    }
}
