//! Registered project folders.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Ordered, de-duplicated list of absolute project root directories.
///
/// The first entry is the primary root: relative input resolves against it
/// and the narrowing resolver probes it for the sentinel marker.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use pf_core::ProjectRoots;
///
/// let mut roots = ProjectRoots::new([Utf8PathBuf::from("/work/app")]);
/// assert!(!roots.add(Utf8PathBuf::from("/work/app")));
/// assert!(roots.add(Utf8PathBuf::from("/work/lib")));
/// assert_eq!(roots.primary().map(|p| p.as_str()), Some("/work/app"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectRoots {
    roots: Vec<Utf8PathBuf>,
}

impl ProjectRoots {
    /// Builds the registry, dropping duplicates while keeping first-seen order.
    pub fn new(roots: impl IntoIterator<Item = Utf8PathBuf>) -> Self {
        let mut registry = Self::default();
        for root in roots {
            registry.add(root);
        }
        registry
    }

    /// The root relative input is resolved against.
    #[must_use]
    pub fn primary(&self) -> Option<&Utf8Path> {
        self.roots.first().map(Utf8PathBuf::as_path)
    }

    /// Returns `true` if `path` is registered.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.roots.iter().any(|root| root == path)
    }

    /// Registers a root. Returns `false` if it was already present.
    pub fn add(&mut self, root: Utf8PathBuf) -> bool {
        if self.contains(&root) {
            return false;
        }
        self.roots.push(root);
        true
    }

    /// Iterates the roots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.roots.iter().map(Utf8PathBuf::as_path)
    }

    /// Number of registered roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` if no root is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_deduplicates_in_order() {
        let roots = ProjectRoots::new(["/b", "/a", "/b"].map(Utf8PathBuf::from));
        let listed: Vec<&str> = roots.iter().map(Utf8Path::as_str).collect();
        assert_eq!(listed, vec!["/b", "/a"]);
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_empty_has_no_primary() {
        let roots = ProjectRoots::default();
        assert!(roots.is_empty());
        assert!(roots.primary().is_none());
    }

    #[test]
    fn test_serializes_as_list() {
        let roots = ProjectRoots::new([Utf8PathBuf::from("/a")]);
        assert_eq!(serde_json::to_string(&roots).unwrap(), r#"["/a"]"#);
    }
}
