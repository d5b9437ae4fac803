//! The candidate list.
//!
//! Each row is `<marker><name>`: directories that are not project folders get
//! a `+` marker that can be clicked to register them, and directory names are
//! shown with a trailing separator. Only the visible window of candidates is
//! turned into rows, so large listings never stat more than a screenful.

use pf_core::{PathModel, ProjectRoots};
use pf_nav::SearchStatus;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, HighlightSpacing, List, ListItem, ListState, StatefulWidget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::CandidateListState;
use crate::theme::Theme;

const HIGHLIGHT_SYMBOL: &str = "▸ ";

/// Column of the `+` marker, relative to the list's inner area.
pub const MARKER_COLUMN: u16 = 2;

/// Width of the marker cell.
pub const MARKER_WIDTH: u16 = 2;

/// The candidate list widget.
pub struct CandidateList<'a> {
    candidates: &'a [PathModel],
    roots: &'a ProjectRoots,
    cursor: Option<usize>,
    search: &'a SearchStatus,
    theme: &'a Theme,
}

impl<'a> CandidateList<'a> {
    /// Creates a candidate list.
    #[must_use]
    pub const fn new(
        candidates: &'a [PathModel],
        roots: &'a ProjectRoots,
        cursor: Option<usize>,
        search: &'a SearchStatus,
        theme: &'a Theme,
    ) -> Self {
        Self {
            candidates,
            roots,
            cursor,
            search,
            theme,
        }
    }

    fn title(&self) -> String {
        match self.search {
            SearchStatus::Pending if self.candidates.is_empty() => " Searching… ".to_owned(),
            SearchStatus::Pending => format!(" Candidates ({}) … ", self.candidates.len()),
            SearchStatus::Ready => format!(" Candidates ({}) ", self.candidates.len()),
            SearchStatus::Failed(_) => " Search failed ".to_owned(),
        }
    }

    fn build_item(&self, path: &PathModel, width: usize) -> ListItem<'a> {
        let is_directory = path.is_directory() == Some(true);
        let addable = is_directory && !path.is_project_directory(self.roots);

        let marker = if addable {
            Span::styled("+ ", Style::default().fg(self.theme.marker_fg))
        } else {
            Span::raw("  ")
        };

        let mut name = path.full().to_owned();
        if is_directory && !name.ends_with(path.separator()) {
            name.push(path.separator());
        }
        let name_width = width.saturating_sub(usize::from(MARKER_COLUMN + MARKER_WIDTH));

        ListItem::new(Line::from(vec![
            marker,
            Span::styled(
                truncate_left(&name, name_width),
                self.theme.candidate_style(is_directory),
            ),
        ]))
    }
}

impl StatefulWidget for &CandidateList<'_> {
    type State = CandidateListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style)
            .title(Span::styled(self.title(), self.theme.header_style));

        let rows = usize::from(area.height.saturating_sub(2));
        let width = usize::from(area.width.saturating_sub(2));
        state.visible_height = rows;
        state.follow(self.cursor, self.candidates.len());

        let items: Vec<ListItem<'_>> = self
            .candidates
            .iter()
            .skip(state.offset)
            .take(rows)
            .map(|path| self.build_item(path, width))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(self.theme.highlight_style)
            .highlight_spacing(HighlightSpacing::Always)
            .highlight_symbol(HIGHLIGHT_SYMBOL);

        let mut list_state =
            ListState::default().with_selected(self.cursor.and_then(|c| c.checked_sub(state.offset)));
        StatefulWidget::render(list, area, buf, &mut list_state);
    }
}

/// Shortens `text` to `max_width` columns, keeping the end (the most specific
/// part of a path) behind a leading ellipsis.
#[must_use]
pub fn truncate_left(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }
    let ellipsis = "…";
    let budget = max_width.saturating_sub(ellipsis.width());

    let mut used = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        start = idx;
    }
    format!("{ellipsis}{}", &text[start..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_owned()
    }

    #[test]
    fn test_truncate_left_short() {
        assert_eq!(truncate_left("src/foo.rs", 20), "src/foo.rs");
    }

    #[test]
    fn test_truncate_left_keeps_end() {
        let truncated = truncate_left("src/very/long/path/to/main.rs", 12);
        assert_eq!(truncated, "…/to/main.rs");
        assert!(truncated.width() <= 12);
    }

    #[test]
    fn test_truncate_left_wide_characters() {
        let truncated = truncate_left("目录/文件名.txt", 8);
        assert!(truncated.width() <= 8);
        assert!(truncated.ends_with(".txt"));
    }

    #[test]
    fn test_render_marks_addable_directories() {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8");
        std::fs::create_dir(root.join("lib")).expect("create dir");
        std::fs::write(root.join("main.rs"), "").expect("write");

        let base = Some(std::sync::Arc::new(root.clone()));
        let candidates = vec![
            PathModel::with_base("lib", base.clone()),
            PathModel::with_base("main.rs", base),
        ];
        let roots = ProjectRoots::new([root]);
        let theme = Theme::dark();
        let search = SearchStatus::Ready;
        let list = CandidateList::new(&candidates, &roots, Some(1), &search, &theme);

        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        let mut state = CandidateListState::default();
        StatefulWidget::render(&list, area, &mut buf, &mut state);

        assert!(row_text(&buf, 0).contains("Candidates (2)"));
        insta::assert_snapshot!(row_text(&buf, 1), @"│  + lib/                    │");
        insta::assert_snapshot!(row_text(&buf, 2), @"│▸   main.rs                 │");
        assert_eq!(state.visible_height, 2);
    }

    #[test]
    fn test_pending_title() {
        let roots = ProjectRoots::default();
        let theme = Theme::dark();
        let search = SearchStatus::Pending;
        let list = CandidateList::new(&[], &roots, None, &search, &theme);
        assert_eq!(list.title(), " Searching… ");
    }
}
