//! Application state and input handling.
//!
//! ```text
//! App
//!  ├── controller: NavigationController   # path, history, candidates, searches
//!  ├── input: InputState                  # text field with caret
//!  ├── list: CandidateListState           # scroll offset
//!  ├── mode: AppMode
//!  └── status: Option<StatusMessage>
//! ```
//!
//! Keys and clicks become [`Action`]s; [`App::update`] turns them into
//! controller calls and reacts to the returned [`Outcome`].

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use pf_nav::{Applied, NavigationController, NoOpReason, Outcome, SearchResult};
use pf_search::{Enumerator, Profile};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::ui::{AppLayout, Hit};

/// The current mode of the application UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Picking a path.
    #[default]
    Normal,

    /// Help panel is displayed.
    Help,
}

/// Single-line text field with a caret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    text: String,
    /// Byte offset, always on a character boundary.
    caret: usize,
}

impl InputState {
    /// The text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The caret as a byte offset.
    #[must_use]
    pub const fn caret(&self) -> usize {
        self.caret
    }

    /// Replaces the text and puts the caret at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.caret = self.text.len();
    }

    /// Inserts `c` at the caret.
    pub fn insert(&mut self, c: char) {
        self.text.insert(self.caret, c);
        self.caret += c.len_utf8();
    }

    /// Inserts `s` at the caret.
    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.caret, s);
        self.caret += s.len();
    }

    /// Removes the character before the caret.
    pub fn backspace(&mut self) -> bool {
        let Some(idx) = self.previous_boundary() else {
            return false;
        };
        self.text.remove(idx);
        self.caret = idx;
        true
    }

    /// Removes the character at the caret.
    pub fn delete(&mut self) -> bool {
        if self.caret >= self.text.len() {
            return false;
        }
        self.text.remove(self.caret);
        true
    }

    /// Moves the caret one character left.
    pub fn move_left(&mut self) {
        if let Some(idx) = self.previous_boundary() {
            self.caret = idx;
        }
    }

    /// Moves the caret one character right.
    pub fn move_right(&mut self) {
        if let Some(c) = self.text.get(self.caret..).and_then(|rest| rest.chars().next()) {
            self.caret += c.len_utf8();
        }
    }

    /// Moves the caret to the start.
    pub const fn home(&mut self) {
        self.caret = 0;
    }

    /// Moves the caret to the end.
    pub fn end(&mut self) {
        self.caret = self.text.len();
    }

    fn previous_boundary(&self) -> Option<usize> {
        self.text
            .get(..self.caret)
            .and_then(|before| before.char_indices().next_back())
            .map(|(idx, _)| idx)
    }
}

/// Scroll state of the candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateListState {
    /// Index of the first visible candidate.
    pub offset: usize,

    /// Rows available for candidates.
    pub visible_height: usize,
}

impl CandidateListState {
    /// Scrolls so `cursor` is visible and no rows are wasted past the end.
    pub fn follow(&mut self, cursor: Option<usize>, len: usize) {
        let rows = self.visible_height.max(1);
        self.offset = self.offset.min(len.saturating_sub(rows));
        if let Some(cursor) = cursor {
            if cursor < self.offset {
                self.offset = cursor;
            } else if cursor >= self.offset + rows {
                self.offset = cursor + 1 - rows;
            }
        }
    }
}

/// Status message to display in the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    /// The message text.
    pub text: String,

    /// When the message was created.
    pub timestamp: Instant,

    /// Whether this is an error message.
    pub is_error: bool,
}

impl StatusMessage {
    /// Creates a new info message.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Instant::now(),
            is_error: false,
        }
    }

    /// Creates a new error message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Instant::now(),
            is_error: true,
        }
    }

    /// Returns `true` once the message is older than five seconds.
    #[must_use]
    pub fn should_hide(&self) -> bool {
        self.timestamp.elapsed().as_secs() > 5
    }
}

/// The picker state.
pub struct App<E> {
    controller: NavigationController<E>,

    /// Current UI mode.
    pub mode: AppMode,

    /// The path input.
    pub input: InputState,

    /// Candidate list scroll state.
    pub list: CandidateListState,

    /// Status message to display.
    pub status: Option<StatusMessage>,

    /// Terminal size (updated on resize).
    pub terminal_size: Rect,

    /// Whether the application should quit.
    pub should_quit: bool,

    active_file: Option<Utf8PathBuf>,
    profile: Option<Profile>,
    chosen: Option<Utf8PathBuf>,
    bell: bool,
}

impl<E: Enumerator> App<E> {
    /// Wraps a detached controller.
    #[must_use]
    pub fn new(controller: NavigationController<E>) -> Self {
        Self {
            controller,
            mode: AppMode::Normal,
            input: InputState::default(),
            list: CandidateListState::default(),
            status: None,
            terminal_size: Rect::default(),
            should_quit: false,
            active_file: None,
            profile: None,
            chosen: None,
            bell: false,
        }
    }

    /// Starts a session; `active_file` seeds the initial input.
    pub fn attach(&mut self, active_file: Option<&Utf8Path>) {
        self.active_file = active_file.map(Utf8Path::to_path_buf);
        self.reattach();
    }

    fn reattach(&mut self) {
        let outcome = self.controller.attach(self.active_file.as_deref());
        self.profile = self.controller.narrowing().ok().map(|spec| spec.profile());
        self.input.set(String::new());
        self.handle_outcome(outcome);
        self.sync_input();
        self.sync_list();
    }

    /// The navigation controller.
    pub const fn controller(&self) -> &NavigationController<E> {
        &self.controller
    }

    /// Narrowing profile of the primary project root.
    pub const fn profile(&self) -> Option<Profile> {
        self.profile
    }

    /// The opened file, once one was chosen.
    pub fn chosen(&self) -> Option<&Utf8Path> {
        self.chosen.as_deref()
    }

    /// Returns `true` once if the bell should ring.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Updates the terminal size.
    pub fn set_terminal_size(&mut self, size: Rect) {
        self.terminal_size = size;
        self.sync_list();
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Handles a key event and returns the resulting action.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Help => Self::handle_help_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Enter if alt => Action::ConfirmSelectedOrFirst,
            KeyCode::Enter => Action::Confirm,
            KeyCode::Tab => Action::Autocomplete,
            KeyCode::Esc => Action::Detach,
            KeyCode::F(1) => Action::ToggleHelp,
            KeyCode::Down => Action::NextCandidate,
            KeyCode::Up => Action::PreviousCandidate,
            KeyCode::Char(c) if ctrl => match c {
                'n' => Action::NextCandidate,
                'p' => Action::PreviousCandidate,
                'w' => Action::DeletePathComponent,
                'z' => Action::Undo,
                'a' => Action::AddProjectFolder,
                'o' => Action::CreatePath,
                'u' => {
                    self.input.set(String::new());
                    Action::SetPath(String::new())
                }
                _ => Action::None,
            },
            KeyCode::Char(_) if alt => Action::None,
            KeyCode::Char(c) => {
                self.input.insert(c);
                Action::SetPath(self.input.text().to_owned())
            }
            KeyCode::Backspace => {
                if self.input.backspace() {
                    Action::SetPath(self.input.text().to_owned())
                } else {
                    Action::None
                }
            }
            KeyCode::Delete => {
                if self.input.delete() {
                    Action::SetPath(self.input.text().to_owned())
                } else {
                    Action::None
                }
            }
            KeyCode::Left => {
                self.input.move_left();
                Action::Render
            }
            KeyCode::Right => {
                self.input.move_right();
                Action::Render
            }
            KeyCode::Home => {
                self.input.home();
                Action::Render
            }
            KeyCode::End => {
                self.input.end();
                Action::Render
            }
            _ => Action::None,
        }
    }

    fn handle_help_key(key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => Action::HideHelp,
            _ => Action::None,
        }
    }

    /// Inserts pasted text at the caret. Line breaks are dropped.
    pub fn handle_paste(&mut self, text: &str) -> Action {
        let line: String = text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
        if line.is_empty() || self.mode != AppMode::Normal {
            return Action::None;
        }
        self.input.insert_str(&line);
        Action::SetPath(self.input.text().to_owned())
    }

    /// Handles a mouse event and returns the resulting action.
    pub fn handle_mouse(&self, event: MouseEvent) -> Action {
        if self.mode != AppMode::Normal {
            return Action::None;
        }
        match event.kind {
            MouseEventKind::ScrollDown => Action::NextCandidate,
            MouseEventKind::ScrollUp => Action::PreviousCandidate,
            MouseEventKind::Down(MouseButton::Left) => {
                let layout = AppLayout::new(self.terminal_size);
                let len = self.controller.candidates().len();
                match layout.hit(event.column, event.row, self.list.offset, len) {
                    Hit::Outside => Action::Detach,
                    Hit::Candidate {
                        index,
                        on_marker: true,
                    } if self.is_addable(index) => Action::AddProjectFolderAt(index),
                    Hit::Candidate { index, .. } => Action::ClickCandidate(index),
                    Hit::Panel => Action::None,
                }
            }
            _ => Action::None,
        }
    }

    fn is_addable(&self, index: usize) -> bool {
        self.controller.candidates().get(index).is_some_and(|path| {
            path.is_directory() == Some(true) && !path.is_project_directory(self.controller.roots())
        })
    }

    // -------------------------------------------------------------------------
    // Updates
    // -------------------------------------------------------------------------

    /// Applies an action.
    pub fn update(&mut self, action: Action) {
        if action.edits_path() {
            self.status = None;
        }
        let outcome = match action {
            Action::SetPath(text) => Some(self.controller.path_text_changed(&text)),
            Action::Autocomplete => Some(self.controller.autocomplete()),
            Action::DeletePathComponent => Some(self.controller.delete_path_component()),
            Action::Undo => Some(self.controller.undo()),
            Action::NextCandidate => Some(self.controller.move_cursor_down()),
            Action::PreviousCandidate => Some(self.controller.move_cursor_up()),
            Action::ClickCandidate(index) => Some(self.controller.click_candidate(index)),
            Action::AddProjectFolderAt(index) => {
                let target = self.controller.candidates().get(index).cloned();
                Some(target.map_or(Outcome::NoOp(NoOpReason::NoSelection), |path| {
                    self.controller.add_project_folder(&path)
                }))
            }
            Action::Confirm => Some(self.controller.confirm()),
            Action::ConfirmSelectedOrFirst => Some(self.controller.confirm_selected_or_first()),
            Action::AddProjectFolder => Some(self.controller.add_selected_project_folder()),
            Action::CreatePath => match self.controller.create_path() {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    warn!(error = %err, "create failed");
                    self.status = Some(StatusMessage::error(err.to_string()));
                    None
                }
            },
            Action::Detach => Some(self.controller.detach()),
            Action::ToggleHelp => {
                self.mode = match self.mode {
                    AppMode::Normal => AppMode::Help,
                    AppMode::Help => AppMode::Normal,
                };
                None
            }
            Action::HideHelp => {
                self.mode = AppMode::Normal;
                None
            }
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::Render | Action::None => None,
        };

        if let Some(outcome) = outcome {
            self.handle_outcome(outcome);
        }
        self.sync_list();
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Updated => self.sync_input(),
            Outcome::CursorMoved(_) => {}
            Outcome::Opened(path) => {
                info!(%path, "path chosen");
                self.chosen = Some(path);
                self.should_quit = true;
            }
            Outcome::Created(path) => {
                self.status = Some(StatusMessage::info(format!("created {path}")));
                self.sync_input();
            }
            Outcome::ProjectFolderAdded(path) => {
                self.status = Some(StatusMessage::info(format!("added project folder {path}")));
                self.reattach();
            }
            Outcome::Detached => self.should_quit = true,
            Outcome::NoOp(reason) => {
                debug!(?reason, "nothing to do");
                self.bell = true;
                self.status = Some(StatusMessage::info(reason.describe()));
            }
        }
    }

    /// Shows the controller's path in the input when they disagree.
    fn sync_input(&mut self) {
        if let Some(current) = self.controller.current_path() {
            if current.full() != self.input.text() {
                self.input.set(current.full());
            }
        }
    }

    fn sync_list(&mut self) {
        self.list.visible_height = AppLayout::new(self.terminal_size).visible_rows();
        self.list
            .follow(self.controller.cursor(), self.controller.candidates().len());
    }

    /// Waits for the next finished search.
    pub async fn next_search_result(&mut self) -> Option<SearchResult> {
        self.controller.next_search_result().await
    }

    /// Applies a finished search; failures show in the status bar.
    pub fn apply_search_result(&mut self, result: SearchResult) {
        if let Applied::Failed(err) = self.controller.apply_search_result(result) {
            if err.is_reportable() {
                self.status = Some(StatusMessage::error(err.to_string()));
            }
        }
        self.sync_list();
    }

    /// Handles a tick event.
    pub fn tick(&mut self) {
        if self.status.as_ref().is_some_and(StatusMessage::should_hide) {
            self.status = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{Config, MatchConfig, ProjectRoots};
    use pf_search::{NarrowingSpec, SearchError};
    use std::future::Future;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    struct Canned(Vec<&'static str>);

    impl Enumerator for Canned {
        fn list_candidates(
            &self,
            spec: &NarrowingSpec,
            _cancel: CancellationToken,
        ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send {
            let root = spec.roots()[0].clone();
            let files: Vec<String> = self.0.iter().map(|name| root.join(name).into_string()).collect();
            async move { Ok(files) }
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn press(app: &mut App<Canned>, event: KeyEvent) {
        let action = app.handle_key(event);
        app.update(action);
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    async fn settle(app: &mut App<Canned>) {
        while app
            .controller()
            .state()
            .is_some_and(|s| *s.search() == pf_nav::SearchStatus::Pending)
        {
            let Some(result) = app.next_search_result().await else {
                break;
            };
            app.apply_search_result(result);
        }
    }

    struct Fixture {
        _dir: TempDir,
        root: Utf8PathBuf,
        app: App<Canned>,
    }

    fn fixture(files: &[&'static str], dirs: &[&str]) -> Fixture {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8");
        for sub in dirs {
            std::fs::create_dir_all(root.join(sub)).expect("create dir");
        }
        for file in files {
            std::fs::write(root.join(file), "").expect("write file");
        }
        let config = Config {
            matching: MatchConfig {
                fuzzy: false,
                ..MatchConfig::default()
            },
            ..Config::default()
        };
        let controller = NavigationController::new(
            config,
            ProjectRoots::new([root.clone()]),
            Canned(files.to_vec()),
        );
        let mut app = App::new(controller);
        app.set_terminal_size(Rect::new(0, 0, 100, 40));
        app.attach(None);
        Fixture {
            _dir: dir,
            root,
            app,
        }
    }

    #[test]
    fn test_input_state_editing() {
        let mut input = InputState::default();
        input.set("src/ma");
        input.move_left();
        input.insert('x');
        assert_eq!(input.text(), "src/mxa");
        input.home();
        assert!(!input.backspace());
        assert!(input.delete());
        assert_eq!(input.text(), "rc/mxa");
        input.end();
        assert!(input.backspace());
        assert_eq!(input.text(), "rc/mx");
    }

    #[test]
    fn test_input_state_multibyte() {
        let mut input = InputState::default();
        input.insert_str("日本");
        input.move_left();
        assert_eq!(input.caret(), "日".len());
        input.move_right();
        assert!(input.backspace());
        assert_eq!(input.text(), "日");
    }

    #[test]
    fn test_list_follows_cursor() {
        let mut list = CandidateListState {
            offset: 0,
            visible_height: 3,
        };
        list.follow(Some(5), 10);
        assert_eq!(list.offset, 3);
        list.follow(Some(1), 10);
        assert_eq!(list.offset, 1);
        list.follow(None, 2);
        assert_eq!(list.offset, 0);
    }

    #[test]
    fn test_status_message() {
        let msg = StatusMessage::info("created /tmp/x");
        assert!(!msg.is_error);
        assert!(!msg.should_hide());
        assert!(StatusMessage::error("boom").is_error);
    }

    #[tokio::test]
    async fn test_typing_updates_controller() {
        let mut fx = fixture(&["README.md", "reader.go", "main.rs"], &[]);
        settle(&mut fx.app).await;

        for c in "rea".chars() {
            press(&mut fx.app, key(KeyCode::Char(c)));
        }
        assert_eq!(fx.app.input.text(), "rea");
        let names: Vec<&str> = fx
            .app
            .controller()
            .candidates()
            .iter()
            .map(pf_core::PathModel::full)
            .collect();
        assert_eq!(names, vec!["README.md", "reader.go"]);

        press(&mut fx.app, key(KeyCode::Down));
        press(&mut fx.app, key(KeyCode::Enter));
        assert!(fx.app.should_quit);
        assert_eq!(fx.app.chosen(), Some(fx.root.join("README.md").as_path()));
    }

    #[tokio::test]
    async fn test_delete_component_syncs_input() {
        let mut fx = fixture(&[], &["src"]);
        let action = fx.app.handle_paste("src/ma");
        fx.app.update(action);
        press(&mut fx.app, ctrl('w'));
        assert_eq!(fx.app.input.text(), "src/");
    }

    #[tokio::test]
    async fn test_noop_rings_bell() {
        let mut fx = fixture(&[], &[]);
        settle(&mut fx.app).await;
        press(&mut fx.app, key(KeyCode::Tab));
        assert!(fx.app.take_bell());
        assert!(!fx.app.take_bell());
        assert_eq!(
            fx.app.status.as_ref().map(|s| s.text.as_str()),
            Some("nothing to complete")
        );
    }

    #[tokio::test]
    async fn test_escape_detaches_unless_help_is_open() {
        let mut fx = fixture(&[], &[]);
        press(&mut fx.app, key(KeyCode::F(1)));
        assert_eq!(fx.app.mode, AppMode::Help);
        press(&mut fx.app, key(KeyCode::Esc));
        assert_eq!(fx.app.mode, AppMode::Normal);
        assert!(!fx.app.should_quit);

        press(&mut fx.app, key(KeyCode::Esc));
        assert!(fx.app.should_quit);
        assert!(fx.app.chosen().is_none());
    }

    #[tokio::test]
    async fn test_click_outside_detaches() {
        let mut fx = fixture(&[], &[]);
        let action = fx.app.handle_mouse(click(0, 0));
        assert_eq!(action, Action::Detach);
        fx.app.update(action);
        assert!(fx.app.should_quit);
    }

    #[tokio::test]
    async fn test_click_candidate_and_marker() {
        let mut fx = fixture(&["notes.md"], &["lib"]);
        settle(&mut fx.app).await;
        let inner = AppLayout::new(fx.app.terminal_size).list_inner();

        // Files come first, then directories.
        let on_dir_marker = fx
            .app
            .handle_mouse(click(inner.x + crate::components::MARKER_COLUMN, inner.y + 1));
        assert_eq!(on_dir_marker, Action::AddProjectFolderAt(1));
        let on_file_marker = fx
            .app
            .handle_mouse(click(inner.x + crate::components::MARKER_COLUMN, inner.y));
        assert_eq!(on_file_marker, Action::ClickCandidate(0));

        fx.app.update(on_dir_marker);
        assert!(fx.app.controller().roots().contains(&fx.root.join("lib")));
        assert!(!fx.app.should_quit);
        assert!(fx.app.controller().is_attached());
    }

}
