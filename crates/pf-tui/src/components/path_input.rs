//! The path input line.

use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// The path input widget. The terminal cursor marks the caret.
pub struct PathInput<'a> {
    text: &'a str,
    caret: usize,
    theme: &'a Theme,
}

impl<'a> PathInput<'a> {
    /// Creates a path input; `caret` is a byte offset into `text`.
    #[must_use]
    pub const fn new(text: &'a str, caret: usize, theme: &'a Theme) -> Self {
        Self { text, caret, theme }
    }

    /// Where the terminal cursor goes when the widget is drawn in `area`.
    #[must_use]
    pub fn cursor_position(&self, area: Rect) -> Position {
        let before = self.text.get(..self.caret).unwrap_or(self.text);
        let width = u16::try_from(before.width()).unwrap_or(u16::MAX);
        let max_x = area.right().saturating_sub(2);
        Position::new(area.x.saturating_add(1).saturating_add(width).min(max_x), area.y + 1)
    }
}

impl Widget for &PathInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content = if self.text.is_empty() {
            Line::from(Span::styled(
                "Type a path…",
                self.theme.dimmed_style().add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from(Span::styled(self.text, self.theme.base_style()))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.focused_border_style)
            .title(Span::styled(
                " Path ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));

        Paragraph::new(content).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_follows_caret() {
        let theme = Theme::dark();
        let area = Rect::new(0, 2, 40, 3);
        let input = PathInput::new("src/ma", 6, &theme);
        assert_eq!(input.cursor_position(area), Position::new(7, 3));
        let input = PathInput::new("src/ma", 4, &theme);
        assert_eq!(input.cursor_position(area), Position::new(5, 3));
    }

    #[test]
    fn test_cursor_counts_wide_characters() {
        let theme = Theme::dark();
        let input = PathInput::new("日本/", "日本/".len(), &theme);
        assert_eq!(input.cursor_position(Rect::new(0, 0, 40, 3)), Position::new(6, 1));
    }

    #[test]
    fn test_cursor_is_clamped() {
        let theme = Theme::dark();
        let input = PathInput::new("a-very-long-path", 16, &theme);
        assert_eq!(input.cursor_position(Rect::new(0, 0, 10, 3)), Position::new(8, 1));
    }
}
