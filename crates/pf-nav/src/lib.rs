//! Navigation for pathfind.
//!
//! [`NavigationController`] is the state machine behind the picker: it turns
//! path edits into searches through a [`SearchDispatcher`], applies only the
//! newest result, and answers every user operation with an [`Outcome`].
//! Opening or creating a path is announced as a [`PathEvent`].

pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod state;

pub use controller::{Applied, NavigationController, NoOpReason, Outcome};
pub use dispatcher::{Listing, SearchDispatcher, SearchResult, SearchScope};
pub use error::NavError;
pub use events::PathEvent;
pub use state::{NavigationState, SearchStatus};
