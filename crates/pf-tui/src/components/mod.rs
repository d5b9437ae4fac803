//! Widgets for the picker.
//!
//! - **Widgets** (`Widget` trait): `HeaderBar`, `PathInput`, `StatusBar`
//! - **Stateful widgets** (`StatefulWidget` trait): `CandidateList`
//! - **Overlays**: `HelpPanel`

mod candidate_list;
mod header;
mod help;
mod path_input;
mod status_bar;

pub use candidate_list::{CandidateList, MARKER_COLUMN, MARKER_WIDTH, truncate_left};
pub use header::HeaderBar;
pub use help::HelpPanel;
pub use path_input::PathInput;
pub use status_bar::StatusBar;
