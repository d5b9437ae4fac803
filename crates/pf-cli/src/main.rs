//! Command-line entry point for pathfind.
//!
//! `pathfind` finds files in a project by typing a path: the directory part
//! narrows where to look, the last component is matched against every file
//! below it.
//!
//! # Usage
//!
//! ```bash
//! pathfind [OPTIONS] <COMMAND>
//!
//! # Interactive picker; prints the chosen file
//! pathfind pick --project ~/src/app
//!
//! # One-shot listing, ranked like the picker
//! pathfind list src/ma --json
//!
//! # Longest common completion of a query
//! pathfind complete src/ma
//!
//! # Which roots and globs would be searched
//! pathfind narrowing
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use pf_core::{Config, PathModel, ProjectRoots};
use pf_nav::{NavigationController, NavigationState, Outcome, SearchStatus};
use pf_search::FindEnumerator;
use pf_tui::RunOptions;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Find and open project files by typing their path.
#[derive(Parser)]
#[command(name = "pathfind", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Project folder to search; repeat for more. The first one is primary.
    ///
    /// Defaults to the configured roots, then the current directory.
    #[arg(short, long = "project", global = true, env = "PATHFIND_PROJECT")]
    projects: Vec<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(long, global = true, env = "PATHFIND_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Match names by case-insensitive prefix.
    #[arg(long, global = true, conflicts_with = "fuzzy")]
    prefix: bool,

    /// Match names by fuzzy subsequence.
    #[arg(long, global = true)]
    fuzzy: bool,

    /// Whitespace-separated name globs for the default search profile.
    #[arg(long, global = true)]
    patterns: Option<String>,

    /// Editor used by `pick --open` (overrides $VISUAL and $EDITOR).
    #[arg(long, global = true, env = "PATHFIND_EDITOR")]
    editor: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Open the interactive picker and print the chosen file.
    Pick {
        /// Open the chosen file in an editor.
        #[arg(long)]
        open: bool,

        /// File being edited; its directory is the initial input.
        #[arg(long)]
        active_file: Option<Utf8PathBuf>,
    },

    /// Print the candidates for a query.
    List {
        /// Path as typed in the picker.
        query: String,

        /// Print JSON instead of one path per line.
        #[arg(long)]
        json: bool,
    },

    /// Print the query extended to the candidates' common prefix.
    Complete {
        /// Path as typed in the picker.
        query: String,
    },

    /// Print the search roots and globs for the primary project.
    Narrowing,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set. Otherwise pathfind's own crates log at `info`, or
/// `debug` with `--verbose`. The picker draws on stderr, so it stays quiet
/// unless logging was asked for.
fn init_tracing(verbose: bool, no_color: bool, interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match (verbose, interactive) {
            (true, _) => "debug",
            (false, true) => "off",
            (false, false) => "info",
        };
        EnvFilter::new(format!(
            "warn,pathfind={level},pf_core={level},pf_search={level},pf_nav={level},pf_tui={level}"
        ))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the configuration file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds invalid values.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).wrap_err_with(|| format!("loading {path}"))?,
        None => Config::default(),
    };

    if cli.prefix {
        config.matching.fuzzy = false;
    } else if cli.fuzzy {
        config.matching.fuzzy = true;
    }
    if let Some(patterns) = &cli.patterns {
        config.narrowing.patterns.clone_from(patterns);
    }
    if cli.editor.is_some() {
        config.tui.editor.clone_from(&cli.editor);
    }

    config.validate()?;
    Ok(config)
}

/// Collects the project folders: `--project` first, then configured roots,
/// else the current directory.
///
/// # Errors
///
/// Returns an error if a folder does not exist or is not valid UTF-8.
fn build_roots(cli: &Cli, config: &Config) -> color_eyre::Result<ProjectRoots> {
    let mut roots = ProjectRoots::default();
    for root in cli.projects.iter().chain(&config.projects.roots) {
        roots.add(absolute_dir(root)?);
    }
    if roots.is_empty() {
        let cwd = std::env::current_dir()?;
        let cwd = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|p| eyre!("current directory is not UTF-8: {}", p.display()))?;
        roots.add(cwd);
    }
    debug!(roots = roots.len(), primary = ?roots.primary(), "project roots");
    Ok(roots)
}

fn absolute_dir(path: &Utf8Path) -> color_eyre::Result<Utf8PathBuf> {
    let absolute = path
        .canonicalize_utf8()
        .wrap_err_with(|| format!("project folder {path}"))?;
    if !absolute.is_dir() {
        return Err(eyre!("project folder is not a directory: {path}"));
    }
    Ok(absolute)
}

fn controller(
    config: Config,
    roots: ProjectRoots,
) -> NavigationController<FindEnumerator> {
    let enumerator = FindEnumerator::new(&config.enumerator);
    NavigationController::new(config, roots, enumerator)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the interactive picker.
///
/// # Errors
///
/// Returns an error if the terminal fails or the editor cannot be run.
async fn run_pick(
    config: Config,
    roots: ProjectRoots,
    open: bool,
    active_file: Option<Utf8PathBuf>,
) -> color_eyre::Result<ExitCode> {
    info!(primary = ?roots.primary(), "starting picker");
    let nav = controller(config.clone(), roots);
    let options = RunOptions { active_file };

    #[cfg(unix)]
    let chosen = {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = pf_tui::run(nav, options) => result?,
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                None
            }
        }
    };

    #[cfg(not(unix))]
    let chosen = pf_tui::run(nav, options).await?;

    let Some(path) = chosen else {
        return Ok(ExitCode::FAILURE);
    };
    writeln!(std::io::stdout().lock(), "{path}")?;
    if open {
        pf_tui::open_in_editor(&path, &config)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Attaches, types `query` and waits for its search.
///
/// # Errors
///
/// Returns an error if the search fails.
async fn search(
    config: Config,
    roots: ProjectRoots,
    query: &str,
) -> color_eyre::Result<NavigationController<FindEnumerator>> {
    let mut nav = controller(config, roots);
    nav.attach(None);
    nav.path_text_changed(query);
    nav.settle().await;

    if let Some(SearchStatus::Failed(reason)) = nav.state().map(NavigationState::search) {
        return Err(eyre!("search failed: {reason}"));
    }
    Ok(nav)
}

/// One candidate in `list --json` output.
#[derive(serde::Serialize)]
struct CandidateOutput<'a> {
    path: &'a PathModel,
    absolute: &'a Utf8Path,
    directory: bool,
}

/// Prints the ranked candidates for `query`.
///
/// # Errors
///
/// Returns an error if the search fails or output cannot be written.
async fn run_list(
    config: Config,
    roots: ProjectRoots,
    query: &str,
    json: bool,
) -> color_eyre::Result<ExitCode> {
    let nav = search(config, roots, query).await?;
    let candidates = nav.candidates();
    info!(query, count = candidates.len(), "listed candidates");

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if json {
        let output: Vec<CandidateOutput<'_>> = candidates
            .iter()
            .map(|path| CandidateOutput {
                path,
                absolute: path.absolute(),
                directory: path.is_directory() == Some(true),
            })
            .collect();
        serde_json::to_writer_pretty(&mut handle, &output)?;
        writeln!(handle)?;
    } else {
        for path in candidates {
            writeln!(handle, "{path}")?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the completion of `query`, failing when it cannot be extended.
///
/// # Errors
///
/// Returns an error if the search fails or output cannot be written.
async fn run_complete(
    config: Config,
    roots: ProjectRoots,
    query: &str,
) -> color_eyre::Result<ExitCode> {
    let mut nav = search(config, roots, query).await?;
    match nav.autocomplete() {
        Outcome::Updated => {
            let completed = nav.current_path().map(PathModel::full).unwrap_or(query);
            writeln!(std::io::stdout().lock(), "{completed}")?;
            Ok(ExitCode::SUCCESS)
        }
        Outcome::NoOp(reason) => {
            writeln!(std::io::stderr().lock(), "{}", reason.describe())?;
            Ok(ExitCode::FAILURE)
        }
        other => Err(eyre!("unexpected completion outcome: {other:?}")),
    }
}

/// Prints the narrowing for the primary project root.
///
/// # Errors
///
/// Returns an error if there is no project root.
fn run_narrowing(config: Config, roots: ProjectRoots) -> color_eyre::Result<ExitCode> {
    let spec = controller(config, roots).narrowing()?;
    writeln!(std::io::stdout().lock(), "{spec}")?;
    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(
        cli.verbose,
        cli.no_color,
        matches!(cli.command, Commands::Pick { .. }),
    );

    let config = build_config(&cli)?;
    let roots = build_roots(&cli, &config)?;

    match &cli.command {
        Commands::Pick { open, active_file } => {
            run_pick(config, roots, *open, active_file.clone()).await
        }
        Commands::List { query, json } => run_list(config, roots, query, *json).await,
        Commands::Complete { query } => run_complete(config, roots, query).await,
        Commands::Narrowing => run_narrowing(config, roots),
    }
}
