//! The navigation state machine.
//!
//! [`NavigationController`] owns one session at a time: the current path, an
//! undo history, the ranked candidates and a cursor. Every operation is
//! synchronous; the only asynchronous part is the search, which runs on the
//! [`SearchDispatcher`] and comes back through
//! [`next_search_result`](NavigationController::next_search_result) to be fed
//! into [`apply_search_result`](NavigationController::apply_search_result).
//!
//! Operations that change nothing return [`Outcome::NoOp`] with a reason; the
//! caller decides how to signal it (the terminal UI rings the bell).

use std::path::MAIN_SEPARATOR;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use pf_core::{Config, DefaultInput, PathModel, ProjectRoots};
use pf_search::{
    Enumerator, MatchStrategy, Matcher, NarrowingResolver, NarrowingSpec, Profile, SearchError,
    common_prefix, split_list,
};
use rustc_hash::FxHashSet;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::dispatcher::{Listing, SearchDispatcher, SearchResult, SearchScope};
use crate::error::NavError;
use crate::events::PathEvent;
use crate::state::{NavigationState, SearchStatus};

/// Default capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Why an operation left everything as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoOpReason {
    /// No session is attached.
    Detached,
    /// A session is already attached.
    AlreadyAttached,
    /// Autocomplete found nothing longer than the current input.
    NothingToComplete,
    /// The current path is a filesystem root.
    AtRoot,
    /// History is empty and the input is already empty.
    HistoryExhausted,
    /// The path is not an existing directory.
    NotADirectory,
    /// The directory is already a project root.
    AlreadyProjectRoot,
    /// The selection is the parent of the current directory.
    ParentDirectory,
    /// The path exists but is not a regular file.
    NotAFile,
    /// The path does not exist.
    DoesNotExist,
    /// The path already exists.
    AlreadyExists,
    /// No candidate is highlighted.
    NoSelection,
}

impl NoOpReason {
    /// Short human-readable description.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Detached => "no active session",
            Self::AlreadyAttached => "session already active",
            Self::NothingToComplete => "nothing to complete",
            Self::AtRoot => "already at the root",
            Self::HistoryExhausted => "nothing to undo",
            Self::NotADirectory => "not a directory",
            Self::AlreadyProjectRoot => "already a project folder",
            Self::ParentDirectory => "cannot add the parent directory",
            Self::NotAFile => "not a file",
            Self::DoesNotExist => "path does not exist",
            Self::AlreadyExists => "path already exists",
            Self::NoSelection => "no candidate selected",
        }
    }
}

/// Result of a navigation operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The current path changed.
    Updated,
    /// The cursor moved.
    CursorMoved(Option<usize>),
    /// A file was opened; the session has ended.
    Opened(Utf8PathBuf),
    /// A directory was created and entered.
    Created(Utf8PathBuf),
    /// A project folder was registered; the session has ended.
    ProjectFolderAdded(Utf8PathBuf),
    /// The session ended without a choice.
    Detached,
    /// Nothing happened.
    NoOp(NoOpReason),
}

impl Outcome {
    /// Returns `true` for [`Outcome::NoOp`].
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp(_))
    }

    /// Returns `true` if the session is over after this outcome.
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        matches!(
            self,
            Self::Opened(_) | Self::ProjectFolderAdded(_) | Self::Detached
        )
    }
}

/// What applying a search result did.
#[derive(Debug)]
pub enum Applied {
    /// The result was superseded (or the session is gone) and was dropped.
    Stale,
    /// Candidates were replaced; holds the new count.
    Candidates(usize),
    /// The search failed; candidates were cleared.
    Failed(SearchError),
}

/// Names of the last completed listing, relative to its scope root.
#[derive(Debug)]
struct CachedListing {
    scope: SearchScope,
    keys: Vec<String>,
}

impl CachedListing {
    fn new(scope: SearchScope, listing: Listing) -> Self {
        let mut prefix = scope.root.as_str().to_owned();
        if !prefix.ends_with(MAIN_SEPARATOR) {
            prefix.push(MAIN_SEPARATOR);
        }

        let mut seen = FxHashSet::default();
        let keys = listing
            .files
            .into_iter()
            .chain(listing.directories)
            .map(|abs| match abs.strip_prefix(&prefix) {
                Some(rel) if !rel.is_empty() => rel.to_owned(),
                _ => abs,
            })
            .filter(|key| seen.insert(key.clone()))
            .collect();
        Self { scope, keys }
    }

    /// Candidates for `current`, best first, at most `limit` of them.
    fn matches(
        &self,
        current: &PathModel,
        strategy: &MatchStrategy,
        limit: usize,
    ) -> Vec<PathModel> {
        strategy
            .rank(
                current.fragment(),
                &self.keys,
                current.has_case_sensitive_fragment(),
            )
            .into_iter()
            .take(limit)
            .map(|idx| current.derive(self.full_for(&self.keys[idx])))
            .collect()
    }

    /// Text of the candidate for `key`: typed directory plus relative name,
    /// or the absolute path for entries outside the scope root.
    fn full_for(&self, key: &str) -> String {
        if Utf8Path::new(key).is_absolute() {
            key.to_owned()
        } else {
            format!("{}{key}", self.scope.directory)
        }
    }
}

fn directory_text(dir: &Utf8Path) -> String {
    let mut text = dir.as_str().to_owned();
    if !text.ends_with(MAIN_SEPARATOR) {
        text.push(MAIN_SEPARATOR);
    }
    text
}

/// Drives one navigation session over an [`Enumerator`].
pub struct NavigationController<E> {
    config: Config,
    resolver: NarrowingResolver,
    roots: ProjectRoots,
    base: Option<Arc<Utf8PathBuf>>,
    dispatcher: SearchDispatcher<E>,
    state: Option<NavigationState>,
    listing: Option<CachedListing>,
    candidate_limit: usize,
    events: broadcast::Sender<PathEvent>,
}

impl<E> std::fmt::Debug for NavigationController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("roots", &self.roots)
            .field("dispatcher", &self.dispatcher)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E: Enumerator> NavigationController<E> {
    /// Creates a detached controller.
    pub fn new(config: Config, roots: ProjectRoots, enumerator: E) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let base = roots.primary().map(|root| Arc::new(root.to_path_buf()));
        Self {
            resolver: NarrowingResolver::new(config.narrowing.clone()),
            config,
            roots,
            base,
            dispatcher: SearchDispatcher::new(enumerator),
            state: None,
            listing: None,
            candidate_limit: usize::MAX,
            events,
        }
    }

    /// Caps how many ranked candidates are kept for display. Autocomplete
    /// still considers every match.
    #[must_use]
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The configuration in use.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration; takes effect on the next match.
    pub fn set_config(&mut self, config: Config) {
        self.resolver = NarrowingResolver::new(config.narrowing.clone());
        self.config = config;
        self.listing = None;
        self.refresh();
    }

    /// Registered project roots.
    pub const fn roots(&self) -> &ProjectRoots {
        &self.roots
    }

    /// The session state, if attached.
    pub const fn state(&self) -> Option<&NavigationState> {
        self.state.as_ref()
    }

    /// Returns `true` while a session is attached.
    pub const fn is_attached(&self) -> bool {
        self.state.is_some()
    }

    /// The current path, if attached.
    pub fn current_path(&self) -> Option<&PathModel> {
        self.state.as_ref().map(NavigationState::current)
    }

    /// The ranked candidates (empty when detached).
    pub fn candidates(&self) -> &[PathModel] {
        self.state.as_ref().map_or(&[], NavigationState::candidates)
    }

    /// The cursor position.
    pub fn cursor(&self) -> Option<usize> {
        self.state.as_ref().and_then(NavigationState::cursor)
    }

    /// The highest search sequence number issued.
    pub const fn latest_seq(&self) -> u64 {
        self.dispatcher.latest_seq()
    }

    /// Subscribes to [`PathEvent`]s.
    pub fn subscribe(&self) -> broadcast::Receiver<PathEvent> {
        self.events.subscribe()
    }

    /// The project-wide narrowing for the primary root.
    pub fn narrowing(&self) -> Result<NarrowingSpec, SearchError> {
        self.resolver.resolve(self.roots.primary())
    }

    /// A path value resolving against the primary project root.
    pub fn path(&self, text: impl Into<String>) -> PathModel {
        PathModel::with_base(text, self.base.clone())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Starts a session, without history, at the configured initial input.
    pub fn attach(&mut self, active_file: Option<&Utf8Path>) -> Outcome {
        if self.state.is_some() {
            return Outcome::NoOp(NoOpReason::AlreadyAttached);
        }
        let initial = self.initial_path(active_file);
        info!(path = %initial, "session attached");
        self.state = Some(NavigationState::new(PathModel::empty(self.base.clone())));
        self.update_path(initial, false)
    }

    /// Ends the session and discards its state.
    pub fn detach(&mut self) -> Outcome {
        if self.state.is_none() {
            return Outcome::NoOp(NoOpReason::Detached);
        }
        self.end_session();
        Outcome::Detached
    }

    fn end_session(&mut self) {
        self.state = None;
        self.listing = None;
        self.dispatcher.supersede();
        debug!("session detached");
    }

    fn initial_path(&self, active_file: Option<&Utf8Path>) -> PathModel {
        let text = match self.config.input.default_input {
            DefaultInput::ActiveFileDirectory => active_file
                .and_then(Utf8Path::parent)
                .filter(|dir| !dir.as_str().is_empty())
                .map(directory_text),
            DefaultInput::ProjectRoot => self.roots.primary().map(directory_text),
            DefaultInput::Empty => None,
        };
        self.path(text.unwrap_or_default())
    }

    // -------------------------------------------------------------------------
    // Path changes
    // -------------------------------------------------------------------------

    /// Makes `path` current, optionally pushing the old one onto the history,
    /// and refreshes the candidates for it.
    pub fn update_path(&mut self, path: PathModel, record: bool) -> Outcome {
        let Some(state) = self.state.as_mut() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        let previous = std::mem::replace(&mut state.current, path);
        if record {
            state.history.push(previous);
        }
        state.cursor = None;
        debug!(path = %state.current, record, "path updated");
        self.refresh();
        Outcome::Updated
    }

    /// Handles text typed into the input field.
    pub fn path_text_changed(&mut self, text: &str) -> Outcome {
        let text = if self.config.input.helm_dir_switch {
            self.helm_target(text).unwrap_or_else(|| text.to_owned())
        } else {
            text.to_owned()
        };
        let path = self.path(text);
        self.update_path(path, true)
    }

    /// Directory shortcuts: `//` to the filesystem root, `~/` home, `:/` the
    /// project root.
    fn helm_target(&self, text: &str) -> Option<String> {
        let sep = PathModel::new(text).separator();
        if text.ends_with(&format!("{sep}{sep}")) {
            return Some(self.path(text).root().full().to_owned());
        }
        if text.ends_with(&format!("~{sep}")) {
            return Some(format!("~{sep}"));
        }
        if text.ends_with(&format!(":{sep}")) {
            return self.roots.primary().map(directory_text);
        }
        None
    }

    /// Enters `path` if it is a directory, otherwise tries to open it.
    pub fn select_path(&mut self, path: PathModel) -> Outcome {
        if self.state.is_none() {
            return Outcome::NoOp(NoOpReason::Detached);
        }
        if path.is_directory() == Some(true) {
            self.update_path(path.as_directory(), true)
        } else {
            self.open_path(&path)
        }
    }

    fn open_path(&mut self, path: &PathModel) -> Outcome {
        match (path.exists(), path.is_file()) {
            (Some(true), Some(true)) => {
                let absolute = path.absolute().to_path_buf();
                info!(path = %absolute, "opening path");
                self.publish(PathEvent::DidOpenPath(absolute.clone()));
                self.end_session();
                Outcome::Opened(absolute)
            }
            (Some(true), _) => Outcome::NoOp(NoOpReason::NotAFile),
            _ => Outcome::NoOp(NoOpReason::DoesNotExist),
        }
    }

    /// Selects the highlighted candidate, or the current path.
    pub fn confirm(&mut self) -> Outcome {
        let Some(state) = self.state.as_ref() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        let target = state.selected().unwrap_or(&state.current).clone();
        self.select_path(target)
    }

    /// Selects the highlighted candidate, else the first one, else the
    /// current path.
    pub fn confirm_selected_or_first(&mut self) -> Outcome {
        let Some(state) = self.state.as_ref() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        let target = state
            .selected()
            .or_else(|| state.candidates.first())
            .unwrap_or(&state.current)
            .clone();
        self.select_path(target)
    }

    /// Highlights and selects the candidate at `index`.
    pub fn click_candidate(&mut self, index: usize) -> Outcome {
        let Some(state) = self.state.as_mut() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        state.set_cursor(Some(index));
        match state.selected().cloned() {
            Some(target) => self.select_path(target),
            None => Outcome::NoOp(NoOpReason::NoSelection),
        }
    }

    /// Replaces the input with the longest prefix every matching path
    /// shares, including matches beyond the candidate limit.
    pub fn autocomplete(&mut self) -> Outcome {
        let Some(state) = self.state.as_ref() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        let matches = self.matching_paths(state);
        let case_sensitive = state.current.has_case_sensitive_fragment();
        let Some(prefix) = common_prefix(&matches, case_sensitive) else {
            return Outcome::NoOp(NoOpReason::NothingToComplete);
        };
        let next = if matches.len() == 1 && prefix.is_directory() == Some(true) {
            prefix.as_directory()
        } else {
            prefix
        };

        if next.full() == state.current.full() {
            return Outcome::NoOp(NoOpReason::NothingToComplete);
        }
        self.update_path(next, true)
    }

    /// Every path matching the current input. Only differs from the shown
    /// candidates when those were cut at the candidate limit.
    fn matching_paths(&self, state: &NavigationState) -> Vec<PathModel> {
        match self.listing.as_ref() {
            Some(listing)
                if state.search == SearchStatus::Ready
                    && state.candidates.len() >= self.candidate_limit =>
            {
                let strategy = MatchStrategy::from_config(&self.config.matching);
                listing.matches(&state.current, &strategy, usize::MAX)
            }
            _ => state.candidates.clone(),
        }
    }

    /// Moves up one path component.
    pub fn delete_path_component(&mut self) -> Outcome {
        let Some(state) = self.state.as_ref() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        if state.current.is_root() {
            return Outcome::NoOp(NoOpReason::AtRoot);
        }
        let parent = state.current.parent();
        if parent == state.current {
            return Outcome::NoOp(NoOpReason::AtRoot);
        }
        self.update_path(parent, true)
    }

    /// Restores the previous path, or clears the input once history is empty.
    pub fn undo(&mut self) -> Outcome {
        let Some(state) = self.state.as_mut() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        if let Some(previous) = state.history.pop() {
            return self.update_path(previous, false);
        }
        if state.current.is_empty() {
            return Outcome::NoOp(NoOpReason::HistoryExhausted);
        }
        let empty = self.path("");
        self.update_path(empty, false)
    }

    // -------------------------------------------------------------------------
    // Cursor
    // -------------------------------------------------------------------------

    /// Moves the highlight down with wraparound.
    pub fn move_cursor_down(&mut self) -> Outcome {
        match self.state.as_mut() {
            Some(state) => Outcome::CursorMoved(state.move_cursor_down()),
            None => Outcome::NoOp(NoOpReason::Detached),
        }
    }

    /// Moves the highlight up with wraparound.
    pub fn move_cursor_up(&mut self) -> Outcome {
        match self.state.as_mut() {
            Some(state) => Outcome::CursorMoved(state.move_cursor_up()),
            None => Outcome::NoOp(NoOpReason::Detached),
        }
    }

    // -------------------------------------------------------------------------
    // Project folders and creation
    // -------------------------------------------------------------------------

    /// Registers `path` as a project folder and ends the session.
    pub fn add_project_folder(&mut self, path: &PathModel) -> Outcome {
        if self.state.is_none() {
            return Outcome::NoOp(NoOpReason::Detached);
        }
        if path.is_directory() != Some(true) {
            return Outcome::NoOp(NoOpReason::NotADirectory);
        }
        if path.is_project_directory(&self.roots) {
            return Outcome::NoOp(NoOpReason::AlreadyProjectRoot);
        }

        let absolute = path.absolute().to_path_buf();
        self.roots.add(absolute.clone());
        if self.base.is_none() {
            self.base = Some(Arc::new(absolute.clone()));
        }
        info!(path = %absolute, "added project folder");
        self.end_session();
        Outcome::ProjectFolderAdded(absolute)
    }

    /// Registers the highlighted candidate as a project folder.
    pub fn add_selected_project_folder(&mut self) -> Outcome {
        let Some(state) = self.state.as_ref() else {
            return Outcome::NoOp(NoOpReason::Detached);
        };
        let Some(selected) = state.selected().cloned() else {
            return Outcome::NoOp(NoOpReason::NoSelection);
        };
        if selected == state.current.parent() {
            return Outcome::NoOp(NoOpReason::ParentDirectory);
        }
        self.add_project_folder(&selected)
    }

    /// Creates the current path if it does not exist.
    ///
    /// A path ending in a separator becomes a directory that is then entered;
    /// anything else becomes an empty file (with its parent directories) that
    /// is then opened.
    pub fn create_path(&mut self) -> Result<Outcome, NavError> {
        let Some(state) = self.state.as_ref() else {
            return Ok(Outcome::NoOp(NoOpReason::Detached));
        };
        let current = state.current.clone();
        match current.exists() {
            Some(false) => {}
            Some(true) => return Ok(Outcome::NoOp(NoOpReason::AlreadyExists)),
            None => return Ok(Outcome::NoOp(NoOpReason::DoesNotExist)),
        }

        let absolute = current.absolute().to_path_buf();
        if current.fragment().is_empty() {
            current
                .create_directories()
                .map_err(|source| NavError::create(&absolute, source))?;
        } else {
            current
                .create_file()
                .map_err(|source| NavError::create(&absolute, source))?;
        }
        info!(path = %absolute, "created path");
        self.publish(PathEvent::DidCreatePath(absolute.clone()));

        // Fresh value: the old one cached "missing".
        let created = current.derive(current.full());
        if current.fragment().is_empty() {
            if let Some(state) = self.state.as_mut() {
                state.current = created;
            }
            self.listing = None;
            self.refresh();
            Ok(Outcome::Created(absolute))
        } else {
            Ok(self.open_path(&created))
        }
    }

    fn publish(&self, event: PathEvent) {
        if self.events.send(event).is_err() {
            trace!("no event subscribers");
        }
    }

    // -------------------------------------------------------------------------
    // Searching
    // -------------------------------------------------------------------------

    /// Waits for the next finished search. Feed it to
    /// [`apply_search_result`](Self::apply_search_result).
    pub async fn next_search_result(&mut self) -> Option<SearchResult> {
        self.dispatcher.recv().await
    }

    /// Applies `result` if it answers the newest request; drops it otherwise.
    pub fn apply_search_result(&mut self, result: SearchResult) -> Applied {
        let seq = result.seq;
        if self.state.is_none() || !self.dispatcher.is_current(seq) {
            trace!(
                seq,
                latest = self.dispatcher.latest_seq(),
                "discarding stale search result"
            );
            return Applied::Stale;
        }
        self.dispatcher.finish(seq);

        match result.outcome {
            Ok(listing) => {
                debug!(
                    seq,
                    files = listing.files.len(),
                    directories = listing.directories.len(),
                    "search finished"
                );
                self.listing = Some(CachedListing::new(result.scope, listing));
                self.rematch();
                Applied::Candidates(self.candidates().len())
            }
            Err(SearchError::Cancelled) => Applied::Stale,
            Err(err) => {
                warn!(seq, error = %err, "search failed");
                self.listing = None;
                self.clear_candidates(SearchStatus::Failed(err.to_string()));
                Applied::Failed(err)
            }
        }
    }

    /// Applies results until the current search has settled.
    pub async fn settle(&mut self) -> Option<Applied> {
        let mut last = None;
        while self
            .state
            .as_ref()
            .is_some_and(|state| state.search == SearchStatus::Pending)
            && self.dispatcher.in_flight_scope().is_some()
        {
            let Some(result) = self.dispatcher.recv().await else {
                break;
            };
            last = Some(self.apply_search_result(result));
        }
        last
    }

    fn refresh(&mut self) {
        let Some(current) = self.state.as_ref().map(|state| state.current.clone()) else {
            return;
        };
        match self.scope_for(&current) {
            Ok(Some(scope)) => {
                if self.listing.as_ref().is_some_and(|cached| cached.scope == scope) {
                    if self.dispatcher.in_flight_scope().is_some() {
                        self.dispatcher.supersede();
                    }
                    self.rematch();
                } else if self.dispatcher.in_flight_scope() == Some(&scope) {
                    self.set_status(SearchStatus::Pending);
                } else {
                    self.dispatcher.dispatch(scope);
                    self.set_status(SearchStatus::Pending);
                }
            }
            Ok(None) => {
                self.dispatcher.supersede();
                self.listing = None;
                self.clear_candidates(SearchStatus::Ready);
            }
            Err(err) => {
                self.dispatcher.supersede();
                self.listing = None;
                warn!(error = %err, "search not possible");
                self.clear_candidates(SearchStatus::Failed(err.to_string()));
            }
        }
    }

    /// The search scope for `path`, or `None` if its directory does not exist.
    fn scope_for(&self, path: &PathModel) -> Result<Option<SearchScope>, SearchError> {
        let primary = self.roots.primary();
        if path.directory().is_empty() {
            let root = primary.ok_or(SearchError::NoProjectRoot)?;
            let spec = self.resolver.resolve(Some(root))?;
            return Ok(Some(SearchScope {
                directory: String::new(),
                root: root.to_path_buf(),
                spec,
            }));
        }

        let dir = path.derive(path.directory());
        if dir.is_directory() != Some(true) {
            return Ok(None);
        }
        let root = dir.absolute().to_path_buf();
        let spec = match self.resolver.resolve(primary) {
            Ok(project) => project.scoped_to(root.clone()),
            Err(_) => NarrowingSpec::new(
                [root.clone()],
                split_list(&self.config.narrowing.patterns).map(str::to_owned),
                Profile::Default,
            )
            .ok_or(SearchError::NoProjectRoot)?,
        };
        Ok(Some(SearchScope {
            directory: path.directory().to_owned(),
            root,
            spec,
        }))
    }

    fn rematch(&mut self) {
        let (Some(state), Some(listing)) = (self.state.as_mut(), self.listing.as_ref()) else {
            return;
        };
        let strategy = MatchStrategy::from_config(&self.config.matching);
        let candidates = listing.matches(&state.current, &strategy, self.candidate_limit);
        state.set_candidates(candidates);
        state.search = SearchStatus::Ready;
        trace!(
            count = state.candidates.len(),
            strategy = strategy.label(),
            "candidates ranked"
        );
    }

    fn set_status(&mut self, status: SearchStatus) {
        if let Some(state) = self.state.as_mut() {
            state.search = status;
        }
    }

    fn clear_candidates(&mut self, status: SearchStatus) {
        if let Some(state) = self.state.as_mut() {
            state.set_candidates(Vec::new());
            state.search = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::MatchConfig;
    use std::future::Future;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    /// Lists fixed names under the first search root.
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

    /// Never finishes unless cancelled.
    struct Pending;

    impl Enumerator for Pending {
        fn list_candidates(
            &self,
            _spec: &NarrowingSpec,
            cancel: CancellationToken,
        ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send {
            async move {
                cancel.cancelled().await;
                Err(SearchError::Cancelled)
            }
        }
    }

    /// Always fails like a listing program with a bad root.
    struct Failing;

    impl Enumerator for Failing {
        fn list_candidates(
            &self,
            _spec: &NarrowingSpec,
            _cancel: CancellationToken,
        ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send {
            async { Err(SearchError::process_failure("find", Some(1), "find: bad root")) }
        }
    }

    struct Project {
        dir: TempDir,
        root: Utf8PathBuf,
    }

    impl Project {
        fn new(files: &[&str], dirs: &[&str]) -> Self {
            let dir = TempDir::new().expect("create temp dir");
            let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8");
            for sub in dirs {
                std::fs::create_dir_all(root.join(sub)).expect("create dir");
            }
            for file in files {
                std::fs::write(root.join(file), "").expect("write file");
            }
            Self { dir, root }
        }

        fn roots(&self) -> ProjectRoots {
            ProjectRoots::new([self.root.clone()])
        }
    }

    fn prefix_config() -> Config {
        Config {
            matching: MatchConfig {
                fuzzy: false,
                ..MatchConfig::default()
            },
            ..Config::default()
        }
    }

    fn fulls(controller: &NavigationController<impl Enumerator>) -> Vec<String> {
        controller
            .candidates()
            .iter()
            .map(|p| p.full().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_attach_lists_project() {
        let project = Project::new(&["a.txt", "b.txt"], &[]);
        let mut nav =
            NavigationController::new(Config::default(), project.roots(), Canned(vec!["a.txt", "b.txt"]));

        assert_eq!(nav.attach(None), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some(""));
        assert!(nav.state().is_some_and(|s| s.history().is_empty()));

        assert!(matches!(nav.settle().await, Some(Applied::Candidates(2))));
        assert_eq!(fulls(&nav), vec!["a.txt", "b.txt"]);
        assert_eq!(nav.state().map(NavigationState::search), Some(&SearchStatus::Ready));
    }

    #[tokio::test]
    async fn test_end_to_end_prefix_then_confirm() {
        let project = Project::new(&["README.md", "reader.go", "main.rs"], &[]);
        let mut nav = NavigationController::new(
            prefix_config(),
            project.roots(),
            Canned(vec!["README.md", "reader.go", "main.rs"]),
        );
        let mut events = nav.subscribe();

        nav.attach(None);
        nav.settle().await;
        nav.path_text_changed("rea");
        assert_eq!(fulls(&nav), vec!["README.md", "reader.go"]);

        // "rea" itself is not a file.
        assert_eq!(nav.confirm(), Outcome::NoOp(NoOpReason::DoesNotExist));
        assert!(nav.is_attached());

        nav.path_text_changed("README.md");
        let expected = project.root.join("README.md");
        assert_eq!(nav.confirm(), Outcome::Opened(expected.clone()));
        assert!(!nav.is_attached());
        assert_eq!(events.try_recv().ok(), Some(PathEvent::DidOpenPath(expected)));
    }

    #[tokio::test]
    async fn test_only_latest_result_applies() {
        let project = Project::new(&[], &["a", "b", "c"]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        nav.attach(None);

        nav.path_text_changed("a/");
        let first = nav.latest_seq();
        nav.path_text_changed("b/");
        let second = nav.latest_seq();
        nav.path_text_changed("c/");
        let third = nav.latest_seq();
        assert!(first < second && second < third);

        let result = |seq: u64, sub: &str, file: &str| {
            let root = project.root.join(sub);
            SearchResult {
                seq,
                scope: SearchScope {
                    directory: format!("{sub}/"),
                    spec: NarrowingSpec::new([root.clone()], ["*".to_owned()], Profile::Default)
                        .expect("non-empty roots"),
                    root: root.clone(),
                },
                outcome: Ok(Listing {
                    files: vec![root.join(file).into_string()],
                    directories: Vec::new(),
                }),
            }
        };

        assert!(matches!(
            nav.apply_search_result(result(third, "c", "z.txt")),
            Applied::Candidates(1)
        ));
        assert!(matches!(nav.apply_search_result(result(first, "a", "x.txt")), Applied::Stale));
        assert!(matches!(nav.apply_search_result(result(second, "b", "y.txt")), Applied::Stale));
        assert_eq!(fulls(&nav), vec!["c/z.txt"]);
    }

    #[tokio::test]
    async fn test_cached_scope_drops_search_for_other_scope() {
        let project = Project::new(&[], &["a", "b"]);
        let mut nav = NavigationController::new(prefix_config(), project.roots(), Pending);
        nav.attach(None);

        nav.path_text_changed("a/");
        let a_scope = nav.dispatcher.in_flight_scope().cloned().expect("search for a/");
        let a_root = project.root.join("a");
        let listing = SearchResult {
            seq: nav.latest_seq(),
            scope: a_scope,
            outcome: Ok(Listing {
                files: vec![
                    a_root.join("x.txt").into_string(),
                    a_root.join("y.txt").into_string(),
                ],
                directories: Vec::new(),
            }),
        };
        assert!(matches!(nav.apply_search_result(listing), Applied::Candidates(2)));

        nav.path_text_changed("b/");
        let b_seq = nav.latest_seq();
        let b_scope = nav.dispatcher.in_flight_scope().cloned().expect("search for b/");

        // Same directory as the cached listing: no new search.
        nav.path_text_changed("a/x");
        assert!(nav.dispatcher.in_flight_scope().is_none());
        assert_eq!(fulls(&nav), vec!["a/x.txt"]);
        assert_eq!(nav.state().map(NavigationState::search), Some(&SearchStatus::Ready));

        let b_root = project.root.join("b");
        let late = SearchResult {
            seq: b_seq,
            scope: b_scope,
            outcome: Ok(Listing {
                files: vec![b_root.join("z.txt").into_string()],
                directories: Vec::new(),
            }),
        };
        assert!(matches!(nav.apply_search_result(late), Applied::Stale));
        assert_eq!(fulls(&nav), vec!["a/x.txt"]);
    }

    #[tokio::test]
    async fn test_cursor_moves_through_controller() {
        let project = Project::new(&[], &[]);
        let mut nav =
            NavigationController::new(Config::default(), project.roots(), Canned(vec!["x", "y", "z"]));
        nav.attach(None);
        nav.settle().await;

        assert_eq!(nav.move_cursor_down(), Outcome::CursorMoved(Some(0)));
        assert_eq!(nav.move_cursor_up(), Outcome::CursorMoved(Some(2)));
        assert_eq!(nav.move_cursor_down(), Outcome::CursorMoved(Some(0)));
        nav.move_cursor_up();
        assert_eq!(nav.cursor(), Some(2));
        assert_eq!(nav.move_cursor_down(), Outcome::CursorMoved(Some(0)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delete_component_at_root_is_noop() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        nav.attach(None);
        nav.path_text_changed("/");

        assert_eq!(nav.delete_path_component(), Outcome::NoOp(NoOpReason::AtRoot));
        assert_eq!(nav.current_path().map(PathModel::full), Some("/"));
    }

    #[tokio::test]
    async fn test_delete_component_climbs() {
        let project = Project::new(&[], &["src/bin"]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        nav.attach(None);
        nav.path_text_changed("src/bin/ma");

        nav.delete_path_component();
        assert_eq!(nav.current_path().map(PathModel::full), Some("src/bin/"));
        nav.delete_path_component();
        assert_eq!(nav.current_path().map(PathModel::full), Some("src/"));
    }

    #[tokio::test]
    async fn test_undo_walks_history_then_clears() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        nav.attach(None);
        nav.path_text_changed("a");
        nav.path_text_changed("ab");

        assert_eq!(nav.undo(), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some("a"));
        nav.undo();
        assert_eq!(nav.current_path().map(PathModel::full), Some(""));
        assert_eq!(nav.undo(), Outcome::NoOp(NoOpReason::HistoryExhausted));

        // Empty history but non-empty input falls back to the empty path.
        nav.update_path(nav.path("zzz"), false);
        assert_eq!(nav.undo(), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some(""));
    }

    #[tokio::test]
    async fn test_autocomplete_extends_to_common_prefix() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(
            Config::default(),
            project.roots(),
            Canned(vec!["abc/foo.txt", "abc/bar.txt"]),
        );
        nav.attach(None);
        nav.settle().await;

        assert_eq!(nav.autocomplete(), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some("abc/"));
    }

    #[tokio::test]
    async fn test_autocomplete_without_extension_is_noop() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(
            prefix_config(),
            project.roots(),
            Canned(vec!["reader.go", "realm.rs"]),
        );
        nav.attach(None);
        nav.settle().await;
        nav.path_text_changed("rea");

        assert_eq!(nav.autocomplete(), Outcome::NoOp(NoOpReason::NothingToComplete));
        assert_eq!(nav.current_path().map(PathModel::full), Some("rea"));
    }

    #[tokio::test]
    async fn test_autocomplete_folds_case_differences() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(
            prefix_config(),
            project.roots(),
            Canned(vec!["README.md", "reader.go"]),
        );
        nav.attach(None);
        nav.settle().await;
        nav.path_text_changed("rea");

        assert_eq!(nav.autocomplete(), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some("read"));
    }

    #[tokio::test]
    async fn test_autocomplete_considers_matches_past_the_limit() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(
            prefix_config(),
            project.roots(),
            Canned(vec!["a/1.txt", "a/2.txt", "b/3.txt"]),
        )
        .with_candidate_limit(2);
        nav.attach(None);
        nav.settle().await;
        assert_eq!(fulls(&nav), vec!["a/1.txt", "a/2.txt"]);

        assert_eq!(nav.autocomplete(), Outcome::NoOp(NoOpReason::NothingToComplete));
        assert_eq!(nav.current_path().map(PathModel::full), Some(""));
    }

    #[tokio::test]
    async fn test_fuzzy_autocomplete_may_replace_the_fragment() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(
            Config::default(),
            project.roots(),
            Canned(vec!["src/thread_area.rs", "src/reader.go"]),
        );
        nav.attach(None);
        nav.settle().await;
        nav.path_text_changed("rea");
        assert_eq!(nav.candidates().len(), 2);

        assert_eq!(nav.autocomplete(), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some("src/"));
        assert_eq!(nav.state().map(|s| s.history().len()), Some(2));
    }

    #[tokio::test]
    async fn test_autocomplete_single_directory_enters_it() {
        let project = Project::new(&[], &["docs"]);
        let mut nav = NavigationController::new(prefix_config(), project.roots(), Canned(vec![]));
        nav.attach(None);
        nav.settle().await;
        nav.path_text_changed("do");
        assert_eq!(fulls(&nav), vec!["docs"]);

        assert_eq!(nav.autocomplete(), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some("docs/"));
    }

    #[tokio::test]
    async fn test_select_directory_enters_it() {
        let project = Project::new(&[], &["docs"]);
        let mut nav = NavigationController::new(prefix_config(), project.roots(), Canned(vec![]));
        nav.attach(None);
        nav.settle().await;

        assert_eq!(nav.confirm_selected_or_first(), Outcome::Updated);
        assert_eq!(nav.current_path().map(PathModel::full), Some("docs/"));
        assert_eq!(nav.state().map(|s| s.history().len()), Some(1));
    }

    #[tokio::test]
    async fn test_add_selected_project_folder() {
        let project = Project::new(&[], &["lib"]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Canned(vec![]));
        nav.attach(None);
        nav.settle().await;
        nav.move_cursor_down();

        let expected = project.root.join("lib");
        assert_eq!(
            nav.add_selected_project_folder(),
            Outcome::ProjectFolderAdded(expected.clone())
        );
        assert!(!nav.is_attached());
        assert!(nav.roots().contains(&expected));

        nav.attach(None);
        let lib = nav.path("lib");
        assert_eq!(
            nav.add_project_folder(&lib),
            Outcome::NoOp(NoOpReason::AlreadyProjectRoot)
        );
    }

    #[tokio::test]
    async fn test_add_project_folder_rejects_files() {
        let project = Project::new(&["file.txt"], &[]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        nav.attach(None);
        let file = nav.path("file.txt");
        assert_eq!(nav.add_project_folder(&file), Outcome::NoOp(NoOpReason::NotADirectory));
        assert_eq!(nav.add_selected_project_folder(), Outcome::NoOp(NoOpReason::NoSelection));
    }

    #[tokio::test]
    async fn test_no_project_root_clears_candidates() {
        let mut nav =
            NavigationController::new(Config::default(), ProjectRoots::default(), Canned(vec!["x"]));
        nav.attach(None);

        assert!(nav.candidates().is_empty());
        assert!(matches!(
            nav.state().map(NavigationState::search),
            Some(SearchStatus::Failed(msg)) if msg.contains("no project root")
        ));
    }

    #[tokio::test]
    async fn test_missing_directory_has_no_candidates() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Canned(vec!["x"]));
        nav.attach(None);
        nav.settle().await;
        let before = nav.latest_seq();

        nav.path_text_changed("nope/x");
        assert!(nav.candidates().is_empty());
        assert!(nav.latest_seq() > before);
        assert_eq!(nav.state().map(NavigationState::search), Some(&SearchStatus::Ready));
    }

    #[tokio::test]
    async fn test_search_failure_keeps_current_path() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Failing);
        nav.attach(None);
        nav.path_text_changed("abc");

        assert!(matches!(nav.settle().await, Some(Applied::Failed(_))));
        assert!(nav.candidates().is_empty());
        assert_eq!(nav.current_path().map(PathModel::full), Some("abc"));
    }

    #[tokio::test]
    async fn test_create_file_opens_it() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        let mut events = nav.subscribe();
        nav.attach(None);
        nav.path_text_changed("notes/today.md");

        let expected = project.root.join("notes/today.md");
        let outcome = nav.create_path().expect("create succeeds");
        assert_eq!(outcome, Outcome::Opened(expected.clone()));
        assert!(project.dir.path().join("notes/today.md").is_file());
        assert_eq!(events.try_recv().ok(), Some(PathEvent::DidCreatePath(expected.clone())));
        assert_eq!(events.try_recv().ok(), Some(PathEvent::DidOpenPath(expected)));
    }

    #[tokio::test]
    async fn test_create_directory_enters_it() {
        let project = Project::new(&[], &[]);
        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        nav.attach(None);
        nav.path_text_changed("fresh/");

        let outcome = nav.create_path().expect("create succeeds");
        assert_eq!(outcome, Outcome::Created(project.root.join("fresh")));
        assert!(project.dir.path().join("fresh").is_dir());
        assert!(nav.is_attached());
        assert_eq!(nav.create_path().expect("second call"), Outcome::NoOp(NoOpReason::AlreadyExists));
    }

    #[tokio::test]
    async fn test_helm_shortcuts() {
        let project = Project::new(&[], &[]);
        let mut config = Config::default();
        config.input.helm_dir_switch = true;
        let mut nav = NavigationController::new(config, project.roots(), Pending);
        nav.attach(None);

        nav.path_text_changed("src/deep~/");
        assert_eq!(nav.current_path().map(PathModel::full), Some("~/"));

        nav.path_text_changed("~/x:/");
        let expected = directory_text(&project.root);
        assert_eq!(nav.current_path().map(PathModel::full), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_initial_input_policies() {
        let project = Project::new(&[], &["src"]);
        let active = project.root.join("src/main.rs");

        let mut nav = NavigationController::new(Config::default(), project.roots(), Pending);
        nav.attach(Some(&active));
        let expected = directory_text(&project.root.join("src"));
        assert_eq!(nav.current_path().map(PathModel::full), Some(expected.as_str()));

        let mut config = Config::default();
        config.input.default_input = DefaultInput::Empty;
        let mut nav = NavigationController::new(config, project.roots(), Pending);
        nav.attach(Some(&active));
        assert_eq!(nav.current_path().map(PathModel::full), Some(""));
    }

    #[tokio::test]
    async fn test_detached_operations_are_noops() {
        let mut nav =
            NavigationController::new(Config::default(), ProjectRoots::default(), Pending);
        assert_eq!(nav.confirm(), Outcome::NoOp(NoOpReason::Detached));
        assert_eq!(nav.undo(), Outcome::NoOp(NoOpReason::Detached));
        assert_eq!(nav.move_cursor_down(), Outcome::NoOp(NoOpReason::Detached));
        assert_eq!(nav.detach(), Outcome::NoOp(NoOpReason::Detached));

        nav.attach(None);
        assert_eq!(nav.attach(None), Outcome::NoOp(NoOpReason::AlreadyAttached));
        assert_eq!(nav.detach(), Outcome::Detached);
    }
}
