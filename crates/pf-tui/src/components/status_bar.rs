//! Status bar: transient message, search state and cursor position.

use pf_nav::SearchStatus;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::{AppMode, StatusMessage};
use crate::theme::Theme;

/// The status bar component.
pub struct StatusBar<'a> {
    mode: AppMode,
    message: Option<&'a StatusMessage>,
    search: Option<&'a SearchStatus>,
    cursor: Option<usize>,
    candidates: usize,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Creates a status bar.
    #[must_use]
    pub const fn new(
        mode: AppMode,
        message: Option<&'a StatusMessage>,
        search: Option<&'a SearchStatus>,
        cursor: Option<usize>,
        candidates: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            mode,
            message,
            search,
            cursor,
            candidates,
            theme,
        }
    }

    fn build_line(&self) -> Line<'a> {
        let mut spans = Vec::new();

        let mode_text = match self.mode {
            AppMode::Normal => "PICK",
            AppMode::Help => "HELP",
        };
        spans.push(Span::styled(
            format!(" {mode_text} "),
            Style::default()
                .fg(Color::Black)
                .bg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));

        if let Some(message) = self.message {
            let style = if message.is_error {
                self.theme.error_style()
            } else {
                self.theme.base_style()
            };
            spans.push(Span::styled(message.text.clone(), style));
            spans.push(Span::raw(" │ "));
        } else if let Some(SearchStatus::Failed(reason)) = self.search {
            spans.push(Span::styled(reason.clone(), self.theme.error_style()));
            spans.push(Span::raw(" │ "));
        }

        if matches!(self.search, Some(SearchStatus::Pending)) {
            spans.push(Span::styled("searching… ", self.theme.dimmed_style()));
        }

        let position = self.cursor.map_or(0, |c| c + 1);
        spans.push(Span::styled(
            format!("{position}/{}", self.candidates),
            self.theme.dimmed_style(),
        ));

        Line::from(spans)
    }
}

impl Widget for &StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.build_line())
            .style(self.theme.status_bar_style)
            .render(area, buf);
    }
}
