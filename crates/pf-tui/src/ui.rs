//! Layout and rendering.
//!
//! ```text
//! ┌──────────────────────────── panel ─────────────────────────────┐
//! │ pathfind │ /work/project │ default │ 42 candidates │ F1 help   │
//! │ ┌ Path ──────────────────────────────────────────────────────┐ │
//! │ │ src/ma▌                                                    │ │
//! │ └────────────────────────────────────────────────────────────┘ │
//! │ ┌ Candidates (3) ────────────────────────────────────────────┐ │
//! │ │▸   src/main.rs                                             │ │
//! │ │  + src/macros/                                             │ │
//! │ └────────────────────────────────────────────────────────────┘ │
//! │  PICK  2/3                                                     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The panel is centered; a click outside it closes the picker.

use pf_search::Enumerator;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};

use crate::app::App;
use crate::components::{
    CandidateList, HeaderBar, HelpPanel, MARKER_COLUMN, MARKER_WIDTH, PathInput, StatusBar,
};
use crate::theme::Theme;

/// Screen areas of the picker for a given terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    /// Everything the picker draws in.
    pub panel: Rect,
    /// Header line.
    pub header: Rect,
    /// Path input box.
    pub input: Rect,
    /// Candidate list box, borders included.
    pub list: Rect,
    /// Status line.
    pub status: Rect,
}

/// What a mouse click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Outside the panel.
    Outside,
    /// A candidate row; `on_marker` when the `+` column was clicked.
    Candidate {
        /// Index into the candidates.
        index: usize,
        /// Whether the marker cell was clicked.
        on_marker: bool,
    },
    /// Inside the panel but not on a candidate.
    Panel,
}

impl AppLayout {
    /// Computes the layout for `area`.
    #[must_use]
    pub fn new(area: Rect) -> Self {
        let panel = centered_rect(90, 90, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Length(3), // Input
                Constraint::Min(3),    // Candidates
                Constraint::Length(1), // Status
            ])
            .split(panel);

        Self {
            panel,
            header: chunks[0],
            input: chunks[1],
            list: chunks[2],
            status: chunks[3],
        }
    }

    /// The candidate rows, without borders.
    #[must_use]
    pub fn list_inner(&self) -> Rect {
        self.list.inner(Margin::new(1, 1))
    }

    /// How many candidates fit on screen.
    #[must_use]
    pub fn visible_rows(&self) -> usize {
        usize::from(self.list_inner().height)
    }

    /// Classifies a click at (`column`, `row`) with the list scrolled to
    /// `offset` and `len` candidates.
    #[must_use]
    pub fn hit(&self, column: u16, row: u16, offset: usize, len: usize) -> Hit {
        let position = Position::new(column, row);
        if !self.panel.contains(position) {
            return Hit::Outside;
        }
        let inner = self.list_inner();
        if !inner.contains(position) {
            return Hit::Panel;
        }
        let index = offset + usize::from(row - inner.y);
        if index >= len {
            return Hit::Panel;
        }
        let marker_start = inner.x + MARKER_COLUMN;
        let on_marker = (marker_start..marker_start + MARKER_WIDTH).contains(&column);
        Hit::Candidate { index, on_marker }
    }
}

/// Renders the picker.
pub fn render<E: Enumerator>(app: &App<E>, frame: &mut Frame, theme: &Theme) {
    let layout = AppLayout::new(frame.area());
    let controller = app.controller();
    let candidates = controller.candidates();

    let header = HeaderBar::new(
        controller.roots().primary(),
        app.profile(),
        candidates.len(),
        theme,
    );
    frame.render_widget(&header, layout.header);

    let input = PathInput::new(app.input.text(), app.input.caret(), theme);
    frame.render_widget(&input, layout.input);

    let search = controller.state().map(pf_nav::NavigationState::search);
    let pending = pf_nav::SearchStatus::Pending;
    let list = CandidateList::new(
        candidates,
        controller.roots(),
        controller.cursor(),
        search.unwrap_or(&pending),
        theme,
    );
    frame.render_stateful_widget(&list, layout.list, &mut app.list.clone());

    let status = StatusBar::new(
        app.mode,
        app.status.as_ref(),
        search,
        controller.cursor(),
        candidates.len(),
        theme,
    );
    frame.render_widget(&status, layout.status);

    if app.mode == crate::app::AppMode::Help {
        let help = HelpPanel::new(theme);
        frame.render_widget(&help, centered_rect(70, 80, frame.area()));
    } else {
        frame.set_cursor_position(input.cursor_position(layout.input));
    }
}

/// Creates a centered rectangle with the given percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
