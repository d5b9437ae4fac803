//! Events delivered to the picker loop.
//!
//! Terminal input, resizes and timer ticks arrive on one channel as
//! [`Event`]s. Search results travel separately, straight from the
//! navigation controller.

use crossterm::event::{KeyEvent, MouseEvent};

/// Events that can be processed by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// A key press.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),

    /// Bracketed paste.
    Paste(String),

    /// The terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Periodic tick; expires status messages.
    Tick,

    /// Time to draw a frame.
    Render,

    /// The terminal gained focus.
    FocusGained,

    /// The terminal lost focus.
    FocusLost,
}
