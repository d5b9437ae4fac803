//! Terminal picker for pathfind using Ratatui.
//!
//! The picker is a single panel: a header, the path input, the candidate list
//! and a status line. Keystrokes go through [`App`], which drives a
//! [`pf_nav::NavigationController`]; search results arrive on the same loop as
//! terminal events, so the screen updates as soon as a listing finishes.
//!
//! # Architecture
//!
//! ```text
//! crates/pf-tui/src/
//!   lib.rs           # run loop
//!   app.rs           # App, InputState, CandidateListState, StatusMessage
//!   event.rs         # Event (Key, Mouse, Paste, Resize, Tick, Render)
//!   tui.rs           # terminal wrapper with async event streaming
//!   action.rs        # actions produced by key bindings and clicks
//!   ui.rs            # layout, hit testing and rendering
//!   theme.rs         # colors
//!   editor.rs        # opening the chosen file
//!   toolchain.rs     # spawning external programs
//!   components/      # header, path input, candidate list, status bar, help
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pf_core::{Config, ProjectRoots};
//! use pf_nav::NavigationController;
//! use pf_search::FindEnumerator;
//!
//! let config = Config::default();
//! let enumerator = FindEnumerator::new(&config.enumerator);
//! let controller = NavigationController::new(config, ProjectRoots::default(), enumerator);
//! let chosen = pf_tui::run(controller, pf_tui::RunOptions::default()).await?;
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod action;
pub mod app;
pub mod components;
pub mod editor;
pub mod error;
pub mod event;
pub mod theme;
pub mod toolchain;
pub mod tui;
pub mod ui;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use pf_nav::NavigationController;
use pf_search::Enumerator;
use tracing::{debug, info};

pub use action::Action;
pub use app::{App, AppMode, CandidateListState, InputState, StatusMessage};
pub use editor::open_in_editor;
pub use error::TuiError;
pub use event::Event;
pub use theme::Theme;
pub use tui::Tui;

/// Options for [`run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// File the user is working on; seeds the initial input.
    pub active_file: Option<Utf8PathBuf>,
}

/// Runs the picker until a file is chosen or the picker is closed.
///
/// Returns the absolute path of the opened file, or `None` when the picker
/// was dismissed.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn to.
pub async fn run<E: Enumerator>(
    controller: NavigationController<E>,
    options: RunOptions,
) -> Result<Option<Utf8PathBuf>, TuiError> {
    let tui_config = controller.config().tui.clone();
    let theme = Theme::from_scheme(tui_config.color_scheme);
    let mut tui = Tui::new(
        Duration::from_millis(tui_config.tick_rate_ms),
        Duration::from_millis(tui_config.render_rate_ms),
    )?;

    let mut app = App::new(controller.with_candidate_limit(tui_config.max_visible));
    app.set_terminal_size(tui.size());
    app.attach(options.active_file.as_deref());

    tui.enter()?;
    info!("picker started");
    let result = run_event_loop(&mut tui, &mut app, &theme).await;
    tui.exit()?;
    result?;

    let chosen = app.chosen().map(Utf8Path::to_path_buf);
    debug!(chosen = ?chosen, "picker closed");
    Ok(chosen)
}

async fn run_event_loop<E: Enumerator>(
    tui: &mut Tui,
    app: &mut App<E>,
    theme: &Theme,
) -> Result<(), TuiError> {
    loop {
        if app.take_bell() {
            tui.bell()?;
        }
        tui.draw(|frame| ui::render(app, frame, theme))?;

        let event = tokio::select! {
            event = tui.next_event() => event,
            Some(result) = app.next_search_result() => {
                app.apply_search_result(result);
                continue;
            }
        };
        let Some(event) = event else {
            return Err(TuiError::ChannelClosed);
        };

        let action = match event {
            Event::Key(key) => app.handle_key(key),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Paste(text) => app.handle_paste(&text),
            Event::Resize { width, height } => {
                app.set_terminal_size(ratatui::layout::Rect::new(0, 0, width, height));
                Action::Render
            }
            Event::Tick => {
                app.tick();
                Action::None
            }
            Event::Render => Action::Render,
            Event::FocusGained | Event::FocusLost => Action::None,
        };
        app.update(action);

        if app.should_quit {
            debug!("quit requested");
            return Ok(());
        }
    }
}
