//! Search narrowing: which directories to walk and which names to keep.
//!
//! The resolver reads [`NarrowingConfig`] and probes the project root for the
//! sentinel marker once per call. When the marker exists the override profile
//! applies (several sub-roots and its own glob list), otherwise the default
//! profile searches the project root with the default glob list.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use pf_core::NarrowingConfig;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::SearchError;

/// Which narrowing profile produced a [`NarrowingSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Project root with the default glob list.
    Default,
    /// Sentinel-activated sub-roots with the override glob list.
    Override,
}

impl Profile {
    /// Short lowercase name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Override => "override",
        }
    }
}

/// Roots and glob patterns bounding one enumeration.
///
/// `roots` is never empty. Patterns are OR-combined and keep their configured
/// order; an empty pattern list means every regular file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NarrowingSpec {
    roots: SmallVec<[Utf8PathBuf; 1]>,
    patterns: SmallVec<[String; 4]>,
    profile: Profile,
}

impl NarrowingSpec {
    /// Builds a spec, returning `None` if `roots` is empty.
    pub fn new(
        roots: impl IntoIterator<Item = Utf8PathBuf>,
        patterns: impl IntoIterator<Item = String>,
        profile: Profile,
    ) -> Option<Self> {
        let roots: SmallVec<[Utf8PathBuf; 1]> = roots.into_iter().collect();
        if roots.is_empty() {
            return None;
        }
        Some(Self {
            roots,
            patterns: patterns.into_iter().collect(),
            profile,
        })
    }

    /// The directories to walk, in order.
    #[must_use]
    pub fn roots(&self) -> &[Utf8PathBuf] {
        &self.roots
    }

    /// The name globs, primary first.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// The profile this spec came from.
    #[must_use]
    pub const fn profile(&self) -> Profile {
        self.profile
    }

    /// The same patterns and profile restricted to a single directory.
    #[must_use]
    pub fn scoped_to(&self, root: Utf8PathBuf) -> Self {
        Self {
            roots: SmallVec::from_buf([root]),
            patterns: self.patterns.clone(),
            profile: self.profile,
        }
    }
}

impl fmt::Display for NarrowingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.profile.label())?;
        for root in &self.roots {
            write!(f, " {root}")?;
        }
        write!(f, " [{}]", self.patterns.join(" "))
    }
}

/// Splits a whitespace-separated configuration list, keeping order.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split_whitespace()
}

/// Chooses the search roots and patterns for a project.
#[derive(Debug, Clone, Default)]
pub struct NarrowingResolver {
    config: NarrowingConfig,
}

impl NarrowingResolver {
    /// Creates a resolver over the given configuration.
    #[must_use]
    pub const fn new(config: NarrowingConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &NarrowingConfig {
        &self.config
    }

    /// Resolves the narrowing for `project_root`.
    ///
    /// Fails with [`SearchError::NoProjectRoot`] when no root is known rather
    /// than producing a spec with nothing to search.
    pub fn resolve(&self, project_root: Option<&Utf8Path>) -> Result<NarrowingSpec, SearchError> {
        let root = project_root.ok_or(SearchError::NoProjectRoot)?;
        let default_patterns = || split_list(&self.config.patterns).map(str::to_owned);

        let sentinel = root.join(self.config.sentinel.trim());
        let spec = if sentinel.exists() {
            let mut roots: Vec<Utf8PathBuf> = split_list(&self.config.override_roots)
                .map(|sub| root.join(sub))
                .collect();
            if roots.is_empty() {
                roots.push(root.to_path_buf());
            }
            let patterns: Vec<String> = split_list(&self.config.override_patterns)
                .map(str::to_owned)
                .collect();
            if patterns.is_empty() {
                NarrowingSpec::new(roots, default_patterns(), Profile::Override)
            } else {
                NarrowingSpec::new(roots, patterns, Profile::Override)
            }
        } else {
            NarrowingSpec::new([root.to_path_buf()], default_patterns(), Profile::Default)
        };

        let spec = spec.ok_or(SearchError::NoProjectRoot)?;
        debug!(%spec, %sentinel, "resolved narrowing");
        Ok(spec)
    }
}
