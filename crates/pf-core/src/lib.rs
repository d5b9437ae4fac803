//! Core types, errors, and configuration for pathfind.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`PathModel`]: an immutable path value split into directory and fragment,
//!   with lazily cached resolution and filesystem queries
//! - [`ProjectRoots`]: the ordered set of registered project folders
//! - [`Config`] and its sections, loaded from JSON
//! - [`ConfigError`] for configuration failures

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod path;
pub mod project;

pub use config::{
    ColorScheme, Config, DefaultInput, EnumeratorConfig, InputConfig, MatchConfig,
    NarrowingConfig, ProjectConfig, TuiConfig,
};
pub use error::ConfigError;
pub use path::PathModel;
pub use project::ProjectRoots;
