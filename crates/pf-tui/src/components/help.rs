//! Help overlay listing the key bindings.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table, Widget};

use crate::theme::Theme;

struct KeyBinding {
    key: &'static str,
    description: &'static str,
    group: &'static str,
}

const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "Enter",
        description: "Open file / enter directory",
        group: "Select",
    },
    KeyBinding {
        key: "Alt+Enter",
        description: "Select highlighted or first",
        group: "Select",
    },
    KeyBinding {
        key: "Tab",
        description: "Complete common prefix",
        group: "Path",
    },
    KeyBinding {
        key: "Ctrl+w",
        description: "Up one directory",
        group: "Path",
    },
    KeyBinding {
        key: "Ctrl+z",
        description: "Undo",
        group: "Path",
    },
    KeyBinding {
        key: "Ctrl+u",
        description: "Clear input",
        group: "Path",
    },
    KeyBinding {
        key: "↓ / Ctrl+n",
        description: "Next candidate",
        group: "List",
    },
    KeyBinding {
        key: "↑ / Ctrl+p",
        description: "Previous candidate",
        group: "List",
    },
    KeyBinding {
        key: "Ctrl+a",
        description: "Add directory as project folder",
        group: "List",
    },
    KeyBinding {
        key: "Ctrl+o",
        description: "Create typed path",
        group: "Path",
    },
    KeyBinding {
        key: "Esc",
        description: "Close without choosing",
        group: "Session",
    },
    KeyBinding {
        key: "F1",
        description: "Toggle this help",
        group: "Session",
    },
    KeyBinding {
        key: "Ctrl+c",
        description: "Quit",
        group: "Session",
    },
];

/// Modal overlay with the key bindings.
pub struct HelpPanel<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPanel<'a> {
    /// Creates a help panel.
    #[must_use]
    pub const fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn build_rows(&self) -> Vec<Row<'static>> {
        KEY_BINDINGS
            .iter()
            .map(|binding| {
                Row::new(vec![
                    Cell::from(Span::styled(
                        binding.key,
                        self.theme.accent_style().add_modifier(Modifier::BOLD),
                    )),
                    Cell::from(Span::styled(binding.description, self.theme.base_style())),
                    Cell::from(Span::styled(binding.group, self.theme.dimmed_style())),
                ])
            })
            .collect()
    }
}

impl Widget for &HelpPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.focused_border_style)
            .title(Span::styled(
                " Help - Key Bindings ",
                self.theme.accent_style().add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(self.theme.overlay_bg));

        let heading = self
            .theme
            .accent_style()
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let header = Row::new(vec![
            Cell::from(Span::styled("Key", heading)),
            Cell::from(Span::styled("Action", heading)),
            Cell::from(Span::styled("Group", heading)),
        ])
        .bottom_margin(1);

        let widths = [
            Constraint::Length(12),
            Constraint::Min(24),
            Constraint::Length(8),
        ];

        Table::new(self.build_rows(), widths)
            .block(block)
            .header(header)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_binding_has_a_row() {
        let theme = Theme::dark();
        assert_eq!(HelpPanel::new(&theme).build_rows().len(), KEY_BINDINGS.len());
    }

    #[test]
    fn test_render_lists_bindings() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        (&HelpPanel::new(&theme)).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_owned())
            .collect();
        assert!(text.contains("Alt+Enter"));
        assert!(text.contains("Create typed path"));
    }
}
