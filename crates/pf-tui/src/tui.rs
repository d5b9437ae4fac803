//! Terminal wrapper with async event streaming.
//!
//! [`Tui`] owns a Ratatui terminal drawn on **stderr**, so the chosen path can
//! be written to stdout by the caller. Crossterm events are read from an
//! `EventStream` in a background task and forwarded, together with tick and
//! render timers, through an mpsc channel.
//!
//! ```text
//! ┌──────────────────────── tokio::spawn ────────────────────────┐
//! │  EventStream ─┐                                               │
//! │  tick timer  ─┼─► select! ─► Event ─► mpsc::Sender<Event>     │
//! │  render timer ┘                                               │
//! └───────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//!                     Tui::next_event() ◄── application loop
//! ```

use std::io::{self, Stderr, Write};
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    EventStream, KeyEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::error::TuiError;
use crate::event::Event;

/// Default channel capacity for events.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Terminal wrapper with async event streaming.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    task: Option<JoinHandle<()>>,
    cancellation_token: CancellationToken,
    tick_delay: Duration,
    render_delay: Duration,
    entered: bool,
}

impl Tui {
    /// Creates a terminal wrapper with the given tick and render intervals.
    ///
    /// Call [`enter()`](Self::enter) before drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new(tick_delay: Duration, render_delay: Duration) -> Result<Self, TuiError> {
        let backend = CrosstermBackend::new(io::stderr());
        let terminal = Terminal::new(backend)?;
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        debug!(
            tick_ms = tick_delay.as_millis(),
            render_ms = render_delay.as_millis(),
            "created terminal"
        );

        Ok(Self {
            terminal,
            event_rx,
            event_tx,
            task: None,
            cancellation_token: CancellationToken::new(),
            tick_delay,
            render_delay,
            entered: false,
        })
    }

    /// Enters raw mode and the alternate screen, and starts reading events.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal mode cannot be changed.
    pub fn enter(&mut self) -> Result<(), TuiError> {
        enable_raw_mode()?;
        let mut stderr = io::stderr();
        stderr.execute(EnterAlternateScreen)?;
        stderr.execute(EnableMouseCapture)?;
        stderr.execute(EnableBracketedPaste)?;

        self.terminal.clear()?;
        self.entered = true;
        self.start_event_loop();

        debug!("terminal entered");
        Ok(())
    }

    /// Restores the terminal. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal mode cannot be restored.
    pub fn exit(&mut self) -> Result<(), TuiError> {
        self.stop_event_loop();
        if !self.entered {
            return Ok(());
        }
        self.entered = false;

        self.terminal.show_cursor()?;
        let mut stderr = io::stderr();
        stderr.execute(DisableBracketedPaste)?;
        stderr.execute(DisableMouseCapture)?;
        stderr.execute(LeaveAlternateScreen)?;
        disable_raw_mode()?;

        debug!("terminal exited");
        Ok(())
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    pub fn draw<F>(&mut self, f: F) -> Result<(), TuiError>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Rings the terminal bell.
    ///
    /// # Errors
    ///
    /// Returns an error if stderr cannot be written.
    pub fn bell(&mut self) -> Result<(), TuiError> {
        let mut stderr = io::stderr();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }

    /// Waits for the next event. `None` once the event task has stopped.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// The terminal size.
    #[must_use]
    pub fn size(&self) -> Rect {
        let size = self.terminal.size().unwrap_or_default();
        Rect::new(0, 0, size.width, size.height)
    }

    fn start_event_loop(&mut self) {
        if self.task.is_some() {
            return;
        }
        self.cancellation_token = CancellationToken::new();

        let tick_delay = self.tick_delay;
        let render_delay = self.render_delay;
        let event_tx = self.event_tx.clone();
        let cancellation_token = self.cancellation_token.clone();

        let task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_delay);
            let mut render_interval = tokio::time::interval(render_delay);
            tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    () = cancellation_token.cancelled() => break,
                    _ = tick_interval.tick() => Some(Event::Tick),
                    _ = render_interval.tick() => Some(Event::Render),
                    event = Self::read_crossterm_event(&mut reader) => event,
                };

                if let Some(event) = event {
                    trace!(?event, "sending event");
                    if event_tx.send(event).await.is_err() {
                        error!("event channel closed");
                        break;
                    }
                }
            }
            debug!("event loop ended");
        });

        self.task = Some(task);
    }

    fn stop_event_loop(&mut self) {
        self.cancellation_token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    async fn read_crossterm_event(reader: &mut EventStream) -> Option<Event> {
        use futures_util::StreamExt;

        match reader.next().await {
            Some(Ok(event)) => Self::convert_crossterm_event(event),
            Some(Err(e)) => {
                warn!(error = %e, "error reading terminal event");
                None
            }
            None => {
                // Stream is exhausted; park so select! keeps serving timers.
                std::future::pending().await
            }
        }
    }

    fn convert_crossterm_event(event: crossterm::event::Event) -> Option<Event> {
        use crossterm::event::Event as CrosstermEvent;

        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            CrosstermEvent::Key(_) => None,
            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
            CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize { width, height }),
            CrosstermEvent::FocusGained => Some(Event::FocusGained),
            CrosstermEvent::FocusLost => Some(Event::FocusLost),
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!(error = %e, "failed to restore terminal on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(
            Tui::convert_crossterm_event(crossterm::event::Event::Key(release)),
            None
        );
    }

    #[test]
    fn test_paste_and_resize_convert() {
        assert_eq!(
            Tui::convert_crossterm_event(crossterm::event::Event::Paste("src/".to_owned())),
            Some(Event::Paste("src/".to_owned()))
        );
        assert_eq!(
            Tui::convert_crossterm_event(crossterm::event::Event::Resize(80, 24)),
            Some(Event::Resize {
                width: 80,
                height: 24
            })
        );
    }
}
