//! Per-session navigation state.

use pf_core::PathModel;

/// Progress of the search backing the current candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// A listing is running; candidates may be from the previous step.
    #[default]
    Pending,
    /// Candidates reflect the current path.
    Ready,
    /// The last search failed; candidates are empty.
    Failed(String),
}

/// Everything a navigation session knows between two operations.
///
/// `cursor`, when set, always indexes into `candidates`. Created on attach and
/// dropped on detach.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub(crate) current: PathModel,
    pub(crate) history: Vec<PathModel>,
    pub(crate) candidates: Vec<PathModel>,
    pub(crate) cursor: Option<usize>,
    pub(crate) search: SearchStatus,
}

impl NavigationState {
    /// A fresh session at `current` with no history.
    #[must_use]
    pub fn new(current: PathModel) -> Self {
        Self {
            current,
            history: Vec::new(),
            candidates: Vec::new(),
            cursor: None,
            search: SearchStatus::Pending,
        }
    }

    /// The path in the input field.
    #[must_use]
    pub fn current(&self) -> &PathModel {
        &self.current
    }

    /// Previously current paths, most recent last.
    #[must_use]
    pub fn history(&self) -> &[PathModel] {
        &self.history
    }

    /// The ranked candidates for the current path.
    #[must_use]
    pub fn candidates(&self) -> &[PathModel] {
        &self.candidates
    }

    /// Index of the highlighted candidate.
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// State of the search behind `candidates`.
    #[must_use]
    pub const fn search(&self) -> &SearchStatus {
        &self.search
    }

    /// The highlighted candidate.
    #[must_use]
    pub fn selected(&self) -> Option<&PathModel> {
        self.cursor.and_then(|idx| self.candidates.get(idx))
    }

    pub(crate) fn set_candidates(&mut self, candidates: Vec<PathModel>) {
        self.candidates = candidates;
        self.cursor = None;
    }

    /// Moves the cursor down, wrapping from the last candidate (or from no
    /// selection) to the first.
    pub fn move_cursor_down(&mut self) -> Option<usize> {
        let len = self.candidates.len();
        self.cursor = if len == 0 {
            None
        } else {
            Some(match self.cursor {
                Some(i) if i + 1 < len => i + 1,
                Some(_) | None => 0,
            })
        };
        self.cursor
    }

    /// Moves the cursor up, wrapping from the first candidate (or from no
    /// selection) to the last.
    pub fn move_cursor_up(&mut self) -> Option<usize> {
        let len = self.candidates.len();
        self.cursor = if len == 0 {
            None
        } else {
            Some(match self.cursor {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            })
        };
        self.cursor
    }

    /// Points the cursor at `index` if it is in range, clears it otherwise.
    pub fn set_cursor(&mut self, index: Option<usize>) {
        self.cursor = index.filter(|&idx| idx < self.candidates.len());
    }
}
