//! Configuration structures for pathfind.
//!
//! This module provides configuration types for every layer:
//!
//! - [`MatchConfig`] - Matcher strategy and the fuzzy scale guard
//! - [`InputConfig`] - Initial input policy and directory shortcuts
//! - [`NarrowingConfig`] - Glob patterns, sentinel marker, override profile
//! - [`EnumeratorConfig`] - External listing program
//! - [`ProjectConfig`] - Registered project roots
//! - [`TuiConfig`] - Terminal UI settings
//! - [`Config`] - Root configuration combining all settings
//!
//! Every section is `#[serde(default)]`, so a partial JSON file only needs the
//! keys it overrides. Enumerated options are closed variants and unknown
//! strings fail at load time.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Color scheme for the TUI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ColorScheme {
    /// Automatically detect based on terminal settings.
    #[default]
    Auto,
    /// Light color scheme (dark text on light background).
    Light,
    /// Dark color scheme (light text on dark background).
    Dark,
}

/// What the path input holds when a session is attached.
///
/// The long display names used by older configuration files are accepted as
/// aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultInput {
    /// Directory of the file that was active when the session started.
    #[default]
    #[serde(alias = "Active file's directory")]
    ActiveFileDirectory,
    /// The primary project root.
    #[serde(alias = "Project root")]
    ProjectRoot,
    /// An empty input.
    #[serde(alias = "Empty")]
    Empty,
}

/// Matcher configuration.
///
/// # Examples
///
/// ```
/// use pf_core::MatchConfig;
///
/// let config = MatchConfig::default();
/// assert!(config.fuzzy);
/// assert_eq!(config.scale_guard_ratio, 1500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Fuzzy matching when `true`, prefix matching otherwise.
    pub fuzzy: bool,

    /// Candidate-count to fragment-length ratio above which fuzzy matching
    /// degrades to a prefix filter sorted by length.
    pub scale_guard_ratio: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fuzzy: true,
            scale_guard_ratio: 1500,
        }
    }
}

/// Input behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Initial input on attach.
    pub default_input: DefaultInput,

    /// Enables `//`, `~/` and `:/` shortcuts that jump to the filesystem
    /// root, the home directory and the project root.
    pub helm_dir_switch: bool,
}

/// Search narrowing: which roots and which file name globs.
///
/// Lists are whitespace separated. The override profile applies when
/// `sentinel` exists directly under the project root.
///
/// # Examples
///
/// ```
/// use pf_core::NarrowingConfig;
///
/// let config = NarrowingConfig::default();
/// assert_eq!(config.patterns, "*");
/// assert_eq!(config.override_patterns, "*.cpp *.hpp *.c *.h");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrowingConfig {
    /// Default profile glob list.
    pub patterns: String,

    /// Marker path, relative to the project root, that activates the
    /// override profile.
    pub sentinel: String,

    /// Override profile glob list.
    pub override_patterns: String,

    /// Override profile roots, relative to the project root.
    pub override_roots: String,
}

impl Default for NarrowingConfig {
    fn default() -> Self {
        Self {
            patterns: "*".to_owned(),
            sentinel: "mw_anchor".to_owned(),
            override_patterns: "*.cpp *.hpp *.c *.h".to_owned(),
            override_roots: [
                "matlab/src/cg_ir",
                "matlab/src/cgir_xform",
                "matlab/src/cgir_support",
                "matlab/src/cgir_vm",
                "matlab/src/cgir_vm_rt",
            ]
            .join(" "),
        }
    }
}

/// External listing program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumeratorConfig {
    /// Program invoked with `find`-compatible arguments.
    pub program: String,

    /// Exit status the program uses for "found nothing", treated as an empty
    /// success. `find` itself has none.
    pub no_match_exit_code: Option<i32>,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            program: "find".to_owned(),
            no_match_exit_code: None,
        }
    }
}

/// Project folders known at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Absolute root directories, primary first.
    pub roots: Vec<Utf8PathBuf>,
}

/// Configuration for the terminal user interface.
///
/// # Examples
///
/// ```
/// use pf_core::{TuiConfig, ColorScheme};
///
/// let config = TuiConfig::default();
/// assert_eq!(config.tick_rate_ms, 250);
/// assert_eq!(config.color_scheme, ColorScheme::Auto);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds (status message expiry, polling).
    pub tick_rate_ms: u64,

    /// Minimum interval between redraws in milliseconds.
    pub render_rate_ms: u64,

    /// Color scheme for the interface.
    pub color_scheme: ColorScheme,

    /// Upper bound on candidates kept for display.
    pub max_visible: usize,

    /// Editor command for opened files; `$VISUAL` / `$EDITOR` when unset.
    pub editor: Option<String>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            render_rate_ms: 16,
            color_scheme: ColorScheme::Auto,
            max_visible: 500,
            editor: None,
        }
    }
}

/// Root configuration for pathfind.
///
/// # Examples
///
/// ```
/// use pf_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"match": {"fuzzy": false}}"#).unwrap();
/// assert!(!config.matching.fuzzy);
/// assert_eq!(config.narrowing.patterns, "*");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Matcher configuration.
    #[serde(rename = "match")]
    pub matching: MatchConfig,

    /// Input behavior.
    pub input: InputConfig,

    /// Search narrowing.
    pub narrowing: NarrowingConfig,

    /// External listing program.
    pub enumerator: EnumeratorConfig,

    /// Project roots.
    pub projects: ProjectConfig,

    /// Terminal UI configuration.
    pub tui: TuiConfig,
}

impl Config {
    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matching.scale_guard_ratio == 0 {
            return Err(ConfigError::invalid_option(
                "match.scale_guard_ratio",
                "must be positive",
            ));
        }
        if self.narrowing.patterns.split_whitespace().next().is_none() {
            return Err(ConfigError::invalid_option(
                "narrowing.patterns",
                "needs at least one glob",
            ));
        }
        if self.narrowing.sentinel.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "narrowing.sentinel",
                "must not be empty",
            ));
        }
        if self.enumerator.program.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "enumerator.program",
                "must not be empty",
            ));
        }
        if self.tui.tick_rate_ms == 0 {
            return Err(ConfigError::invalid_option(
                "tui.tick_rate_ms",
                "must be positive",
            ));
        }
        if self.tui.render_rate_ms == 0 {
            return Err(ConfigError::invalid_option(
                "tui.render_rate_ms",
                "must be positive",
            ));
        }
        for root in &self.projects.roots {
            if !root.is_dir() {
                return Err(ConfigError::ProjectRoot(root.clone()));
            }
        }
        Ok(())
    }
}
