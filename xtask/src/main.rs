//! Build automation tasks for the pathfind workspace.
//!
//! Run with: `cargo run -p xtask -- <command>`
//!
//! # Available Commands
//!
//! - `check`: Run all checks (fmt, clippy, test)
//! - `fmt`: Format code with rustfmt
//! - `lint`: Run clippy with all targets
//! - `test`: Run all tests
//! - `build`: Build the `pathfind` binary
//! - `clean`: Clean build artifacts
//! - `doc`: Build the workspace documentation

// xtask is a build tool - printing to stderr is expected
#![allow(clippy::print_stderr)]

use std::process::Command;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};

/// Build automation for pathfind
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for pathfind")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks (fmt --check, clippy, test)
    Check,
    /// Format code with rustfmt
    Fmt {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy lints
    Lint {
        /// Automatically fix lint warnings
        #[arg(long)]
        fix: bool,
    },
    /// Run all tests
    Test {
        /// Run tests with release optimizations
        #[arg(long)]
        release: bool,
    },
    /// Build the pathfind binary
    Build {
        /// Build in debug mode
        #[arg(long)]
        debug: bool,
    },
    /// Clean build artifacts
    Clean,
    /// Generate documentation
    Doc {
        /// Open in browser after building
        #[arg(long)]
        open: bool,
    },
}

fn workspace_root() -> Result<Utf8PathBuf> {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Utf8Path::to_path_buf)
        .context("xtask has no parent directory")
}

/// Arguments of the cargo invocations a command expands to.
fn plan(command: &Commands) -> Vec<Vec<&'static str>> {
    match command {
        Commands::Check => [
            plan(&Commands::Fmt { check: true }),
            plan(&Commands::Lint { fix: false }),
            plan(&Commands::Test { release: false }),
        ]
        .concat(),
        Commands::Fmt { check: true } => vec![vec!["fmt", "--all", "--", "--check"]],
        Commands::Fmt { check: false } => vec![vec!["fmt", "--all"]],
        Commands::Lint { fix: true } => vec![vec![
            "clippy",
            "--workspace",
            "--all-targets",
            "--fix",
            "--allow-dirty",
        ]],
        Commands::Lint { fix: false } => vec![vec![
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ]],
        Commands::Test { release: true } => vec![vec!["test", "--workspace", "--release"]],
        Commands::Test { release: false } => vec![vec!["test", "--workspace"]],
        Commands::Build { debug: true } => vec![vec!["build", "-p", "pf-cli"]],
        Commands::Build { debug: false } => vec![vec!["build", "-p", "pf-cli", "--release"]],
        Commands::Clean => vec![vec!["clean"]],
        Commands::Doc { open: true } => vec![vec!["doc", "--workspace", "--no-deps", "--open"]],
        Commands::Doc { open: false } => vec![vec!["doc", "--workspace", "--no-deps"]],
    }
}

fn cargo(root: &Utf8Path, args: &[&str]) -> Result<()> {
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_owned());
    eprintln!("$ cargo {}", args.join(" "));

    let status = Command::new(&cargo)
        .args(args)
        .current_dir(root)
        .status()
        .with_context(|| format!("failed to run {cargo}"))?;
    if !status.success() {
        bail!("cargo {} failed: {status}", args.join(" "));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = workspace_root()?;

    for args in plan(&cli.command) {
        cargo(&root, &args)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_runs_every_gate() {
        let steps = plan(&Commands::Check);
        let heads: Vec<&str> = steps.iter().map(|args| args[0]).collect();
        assert_eq!(heads, vec!["fmt", "clippy", "test"]);
        assert!(steps[0].contains(&"--check"));
    }

    #[test]
    fn test_build_targets_binary() {
        assert_eq!(
            plan(&Commands::Build { debug: false }),
            vec![vec!["build", "-p", "pf-cli", "--release"]]
        );
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        let root = workspace_root().expect("root");
        assert!(root.join("Cargo.toml").is_file());
    }
}
