//! Search engine for pathfind: narrowing, enumeration, matching, completion.
//!
//! # Overview
//!
//! A search runs in three stages:
//!
//! 1. [`NarrowingResolver`] turns the project root and configuration into a
//!    [`NarrowingSpec`] (roots plus name globs), switching to the override
//!    profile when the sentinel marker exists.
//! 2. An [`Enumerator`] lists matching files. [`FindEnumerator`] shells out to
//!    `find`, drains its output asynchronously and can be cancelled.
//! 3. A [`Matcher`] filters and ranks candidate names against the typed
//!    fragment; [`common_prefix`] extends the fragment as far as every match
//!    agrees.
//!
//! # Architecture
//!
//! ```text
//! NarrowingResolver ──► NarrowingSpec ──► Enumerator ──► Vec<String>
//!   (sentinel probe)     (roots, globs)    (find, cancel)      │
//!                                                              ▼
//!                         common_prefix ◄── Vec<PathModel> ◄── MatchStrategy
//!                                                              (prefix | fuzzy)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod autocomplete;
pub mod enumerator;
pub mod error;
pub mod matcher;
pub mod narrowing;

pub use autocomplete::common_prefix;
pub use enumerator::{Enumerator, FindEnumerator};
pub use error::SearchError;
pub use matcher::{FuzzyMatcher, MatchStrategy, Matcher, PrefixMatcher, starts_with_ignore_case};
pub use narrowing::{NarrowingResolver, NarrowingSpec, Profile, split_list};
