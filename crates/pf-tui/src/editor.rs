//! Opening the chosen file in an external editor.
//!
//! The editor is taken from `tui.editor` in the configuration, then `$VISUAL`,
//! then `$EDITOR`. GUI editors that return immediately get a wait flag so the
//! caller resumes only after the file is closed.

use std::env;
use std::path::Path;

use camino::Utf8Path;
use pf_core::Config;
use tracing::{debug, info};

use crate::error::TuiError;
use crate::toolchain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorKind {
    Cursor,
    VsCode,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditorCommand {
    program: String,
    args: Vec<String>,
    kind: EditorKind,
}

impl EditorCommand {
    fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next()?.to_owned();
        let args = parts.map(str::to_owned).collect();
        let kind = EditorKind::from_program(&program);
        Some(Self {
            program,
            args,
            kind,
        })
    }

    fn with_wait_flag(mut self) -> Self {
        if matches!(self.kind, EditorKind::Cursor | EditorKind::VsCode)
            && !self.args.iter().any(|arg| arg == "--wait" || arg == "-w")
        {
            self.args.push("--wait".to_owned());
        }
        self
    }
}

impl EditorKind {
    fn from_program(program: &str) -> Self {
        let file_name = Path::new(program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(program)
            .to_lowercase();

        match file_name.as_str() {
            "cursor" | "cursor.exe" => Self::Cursor,
            "code" | "code-insiders" | "code.exe" => Self::VsCode,
            _ => Self::Terminal,
        }
    }
}

fn resolve_editor(
    configured: Option<&str>,
    visual: Option<String>,
    editor: Option<String>,
) -> Result<EditorCommand, TuiError> {
    configured
        .map(str::to_owned)
        .into_iter()
        .chain(visual)
        .chain(editor)
        .find_map(|candidate| EditorCommand::parse(&candidate))
        .map(EditorCommand::with_wait_flag)
        .ok_or_else(|| {
            TuiError::editor("no editor configured; set --editor, $VISUAL or $EDITOR")
        })
}

/// Opens `path` in the configured editor and waits for it to exit.
///
/// Call this after the picker has restored the terminal.
///
/// # Errors
///
/// Returns an error if no editor is configured, it cannot be started, or it
/// exits unsuccessfully.
pub fn open_in_editor(path: &Utf8Path, config: &Config) -> Result<(), TuiError> {
    let editor = resolve_editor(
        config.tui.editor.as_deref(),
        env::var("VISUAL").ok(),
        env::var("EDITOR").ok(),
    )?;
    debug!(program = %editor.program, kind = ?editor.kind, "resolved editor");

    let working_dir = path.parent().unwrap_or(path);
    let mut command = toolchain::command(&editor.program, working_dir);
    command.args(&editor.args).arg(path.as_std_path());

    info!(%path, program = %editor.program, "opening editor");
    let status = command
        .status()
        .map_err(|e| TuiError::editor(format!("failed to start {}: {e}", editor.program)))?;
    if status.success() {
        Ok(())
    } else {
        Err(TuiError::editor(format!(
            "{} exited with status: {status}",
            editor.program
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_kind_from_program() {
        assert_eq!(EditorKind::from_program("/usr/bin/code"), EditorKind::VsCode);
        assert_eq!(EditorKind::from_program("Cursor"), EditorKind::Cursor);
        assert_eq!(EditorKind::from_program("nvim"), EditorKind::Terminal);
    }

    #[test]
    fn test_wait_flag_added_once() {
        let editor = EditorCommand::parse("code -w").map(EditorCommand::with_wait_flag);
        assert_eq!(editor.map(|e| e.args), Some(vec!["-w".to_owned()]));

        let editor = EditorCommand::parse("cursor").map(EditorCommand::with_wait_flag);
        assert_eq!(editor.map(|e| e.args), Some(vec!["--wait".to_owned()]));
    }

    #[test]
    fn test_resolution_order() {
        let editor = resolve_editor(None, Some("vim -p".to_owned()), Some("nano".to_owned()));
        assert!(matches!(editor, Ok(ref e) if e.program == "vim" && e.args == ["-p"]));

        let editor = resolve_editor(Some("hx"), Some("vim".to_owned()), None);
        assert!(matches!(editor, Ok(ref e) if e.program == "hx"));

        // Blank settings fall through.
        let editor = resolve_editor(Some("  "), None, Some("nano".to_owned()));
        assert!(matches!(editor, Ok(ref e) if e.program == "nano"));
    }

    #[test]
    fn test_no_editor() {
        let err = resolve_editor(None, None, None);
        assert!(matches!(err, Err(TuiError::Editor(_))));
    }
}
