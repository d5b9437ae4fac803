//! Events published to subscribers outside the navigation session.

use camino::Utf8PathBuf;

/// Something a navigation session did that other components may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEvent {
    /// A file was chosen and should be opened.
    DidOpenPath(Utf8PathBuf),
    /// A file or directory was created.
    DidCreatePath(Utf8PathBuf),
}

impl PathEvent {
    /// The absolute path the event is about.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::DidOpenPath(path) | Self::DidCreatePath(path) => path,
        }
    }
}
