//! User actions for the picker.
//!
//! ```text
//! Key/Mouse Event → App::handle_key / handle_mouse → Action → App::update
//! ```

/// User-initiated actions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Action {
    // =========================================================================
    // Path editing
    // =========================================================================
    /// The input text changed.
    SetPath(String),

    /// Extend the input to the candidates' common prefix.
    Autocomplete,

    /// Move up one path component.
    DeletePathComponent,

    /// Restore the previous input.
    Undo,

    // =========================================================================
    // Candidates
    // =========================================================================
    /// Highlight the next candidate.
    NextCandidate,

    /// Highlight the previous candidate.
    PreviousCandidate,

    /// Select the candidate at a list index (mouse).
    ClickCandidate(usize),

    /// Register the candidate at a list index as a project folder (mouse).
    AddProjectFolderAt(usize),

    // =========================================================================
    // Commands
    // =========================================================================
    /// Select the highlighted candidate or the typed path.
    Confirm,

    /// Select the highlighted candidate, else the first one.
    ConfirmSelectedOrFirst,

    /// Register the highlighted directory as a project folder.
    AddProjectFolder,

    /// Create the typed path.
    CreatePath,

    /// Close the picker without a choice.
    Detach,

    // =========================================================================
    // UI State
    // =========================================================================
    /// Toggle the help panel.
    ToggleHelp,

    /// Hide the help panel.
    HideHelp,

    /// Quit the application.
    Quit,

    /// Render the UI.
    Render,

    /// No operation.
    #[default]
    None,
}

impl Action {
    /// Returns `true` if this action edits the path.
    #[must_use]
    pub const fn edits_path(&self) -> bool {
        matches!(
            self,
            Self::SetPath(_) | Self::Autocomplete | Self::DeletePathComponent | Self::Undo
        )
    }
}
