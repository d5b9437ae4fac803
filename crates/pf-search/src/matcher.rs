//! Filtering and ranking candidate names against the typed fragment.
//!
//! Two strategies share the [`Matcher`] trait:
//!
//! - [`PrefixMatcher`] keeps names that start with the fragment, in input order.
//! - [`FuzzyMatcher`] keeps names containing the fragment as a subsequence and
//!   ranks tighter, earlier matches first using `nucleo-matcher` scoring.
//!
//! [`MatchStrategy::from_config`] picks one from [`MatchConfig`] on every call,
//! so configuration changes apply to the next keystroke.

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Matcher as NucleoMatcher, Utf32Str};
use pf_core::{MatchConfig, PathModel};

/// Ranks candidate names against a fragment.
pub trait Matcher {
    /// Indices into `names` of the matching candidates, best first.
    ///
    /// An empty `fragment` keeps every name in input order.
    fn rank(&self, fragment: &str, names: &[String], case_sensitive: bool) -> Vec<usize>;

    /// The matching names as path values, best first.
    fn matches(&self, fragment: &str, names: &[String], case_sensitive: bool) -> Vec<PathModel> {
        self.rank(fragment, names, case_sensitive)
            .into_iter()
            .map(|idx| PathModel::new(names[idx].as_str()))
            .collect()
    }
}

/// Returns `true` if `haystack` starts with `prefix`, comparing lowercased
/// characters.
pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    let mut hay = haystack.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|wanted| hay.next() == Some(wanted))
}

fn prefix_filter(fragment: &str, names: &[String], case_sensitive: bool) -> Vec<usize> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            if case_sensitive {
                name.starts_with(fragment)
            } else {
                starts_with_ignore_case(name, fragment)
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Leading-characters match, no reordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefixMatcher;

impl Matcher for PrefixMatcher {
    fn rank(&self, fragment: &str, names: &[String], case_sensitive: bool) -> Vec<usize> {
        if fragment.is_empty() {
            return (0..names.len()).collect();
        }
        prefix_filter(fragment, names, case_sensitive)
    }
}

/// Subsequence match ranked by score.
///
/// When `names.len()` exceeds `scale_guard_ratio` times the fragment length,
/// scoring is skipped: names are prefix-filtered and stably sorted by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatcher {
    scale_guard_ratio: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default().scale_guard_ratio)
    }
}

impl FuzzyMatcher {
    /// Creates a fuzzy matcher with the given scale guard.
    #[must_use]
    pub const fn new(scale_guard_ratio: usize) -> Self {
        Self { scale_guard_ratio }
    }

    fn over_scale(&self, fragment: &str, candidates: usize) -> bool {
        let fragment_len = fragment.chars().count();
        candidates > self.scale_guard_ratio.saturating_mul(fragment_len)
    }
}

impl Matcher for FuzzyMatcher {
    fn rank(&self, fragment: &str, names: &[String], case_sensitive: bool) -> Vec<usize> {
        if fragment.is_empty() {
            return (0..names.len()).collect();
        }

        if self.over_scale(fragment, names.len()) {
            let mut picked = prefix_filter(fragment, names, case_sensitive);
            picked.sort_by_key(|&idx| names[idx].len());
            return picked;
        }

        let case = if case_sensitive {
            CaseMatching::Respect
        } else {
            CaseMatching::Ignore
        };
        let atom = Atom::new(fragment, case, Normalization::Never, AtomKind::Fuzzy, false);
        let mut matcher = NucleoMatcher::new(nucleo_matcher::Config::DEFAULT);
        let mut buf = Vec::new();

        let mut scored: Vec<(usize, u16)> = names
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                atom.score(Utf32Str::new(name, &mut buf), &mut matcher)
                    .map(|score| (idx, score))
            })
            .collect();
        // Stable: equal scores keep input order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(idx, _)| idx).collect()
    }
}

/// The configured matcher for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// See [`PrefixMatcher`].
    Prefix(PrefixMatcher),
    /// See [`FuzzyMatcher`].
    Fuzzy(FuzzyMatcher),
}

impl MatchStrategy {
    /// Selects the strategy from configuration.
    #[must_use]
    pub const fn from_config(config: &MatchConfig) -> Self {
        if config.fuzzy {
            Self::Fuzzy(FuzzyMatcher::new(config.scale_guard_ratio))
        } else {
            Self::Prefix(PrefixMatcher)
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Prefix(_) => "prefix",
            Self::Fuzzy(_) => "fuzzy",
        }
    }
}

impl Matcher for MatchStrategy {
    fn rank(&self, fragment: &str, names: &[String], case_sensitive: bool) -> Vec<usize> {
        match self {
            Self::Prefix(matcher) => matcher.rank(fragment, names, case_sensitive),
            Self::Fuzzy(matcher) => matcher.rank(fragment, names, case_sensitive),
        }
    }
}
