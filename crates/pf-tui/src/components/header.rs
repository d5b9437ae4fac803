//! Header bar: project root, narrowing profile and candidate count.

use camino::Utf8Path;
use pf_search::Profile;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::components::truncate_left;
use crate::theme::Theme;

/// The header bar component.
pub struct HeaderBar<'a> {
    root: Option<&'a Utf8Path>,
    profile: Option<Profile>,
    candidates: usize,
    theme: &'a Theme,
}

impl<'a> HeaderBar<'a> {
    /// Creates a new header bar.
    #[must_use]
    pub const fn new(
        root: Option<&'a Utf8Path>,
        profile: Option<Profile>,
        candidates: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            root,
            profile,
            candidates,
            theme,
        }
    }

    fn build_line(&self) -> Line<'a> {
        let root = self
            .root
            .map_or_else(|| "<no project>".to_owned(), |root| truncate_left(root.as_str(), 40));
        let profile = self.profile.map_or("none", Profile::label);

        Line::from(vec![
            Span::styled("pathfind", self.theme.header_style),
            Span::raw(" │ "),
            Span::styled(root, self.theme.base_style()),
            Span::raw(" │ "),
            Span::styled(profile, self.theme.accent_style()),
            Span::raw(" │ "),
            Span::styled(format!("{} candidates", self.candidates), self.theme.dimmed_style()),
            Span::raw(" │ "),
            Span::styled("F1 help", self.theme.dimmed_style()),
        ])
    }
}

impl Widget for &HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(self.theme.border_style);
        Paragraph::new(self.build_line()).block(block).render(area, buf);
    }
}
