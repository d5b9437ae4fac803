//! Candidate enumeration through an external listing process.
//!
//! [`FindEnumerator`] runs `find` (or a compatible program) over the roots of
//! a [`NarrowingSpec`], restricted to regular files whose names match any of
//! its globs:
//!
//! ```text
//! find <root>... -type f ( -name <p0> -o -name <p1> ... )
//! ```
//!
//! Standard output and standard error are drained concurrently while the
//! process runs. Cancelling the token kills the process and resolves to
//! [`SearchError::Cancelled`].

use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};

use pf_core::EnumeratorConfig;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::error::SearchError;
use crate::narrowing::NarrowingSpec;

/// Source of candidate file paths for a narrowing.
///
/// Implementations must honor `cancel`: once it fires, any external work is
/// stopped and the call resolves to [`SearchError::Cancelled`].
pub trait Enumerator: Send + Sync + 'static {
    /// Lists absolute paths of the files matching `spec`.
    fn list_candidates(
        &self,
        spec: &NarrowingSpec,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send;
}

/// Enumerator backed by the `find` command.
#[derive(Debug, Clone)]
pub struct FindEnumerator {
    program: String,
    no_match_exit_code: Option<i32>,
}

impl Default for FindEnumerator {
    fn default() -> Self {
        Self::new(&EnumeratorConfig::default())
    }
}

impl FindEnumerator {
    /// Creates an enumerator from configuration.
    #[must_use]
    pub fn new(config: &EnumeratorConfig) -> Self {
        Self {
            program: config.program.clone(),
            no_match_exit_code: config.no_match_exit_code,
        }
    }

    /// The program that will be spawned.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument vector for `spec`.
    ///
    /// The first glob anchors the name filter and the rest are `-o`
    /// alternates. Several globs are grouped so `-type f` applies to all.
    #[must_use]
    pub fn args(spec: &NarrowingSpec) -> Vec<String> {
        let mut args: Vec<String> = spec.roots().iter().map(|root| root.to_string()).collect();
        args.extend(["-type".to_owned(), "f".to_owned()]);

        let grouped = spec.patterns().len() > 1;
        if grouped {
            args.push("(".to_owned());
        }
        for (idx, pattern) in spec.patterns().iter().enumerate() {
            if idx > 0 {
                args.push("-o".to_owned());
            }
            args.push("-name".to_owned());
            args.push(pattern.clone());
        }
        if grouped {
            args.push(")".to_owned());
        }
        args
    }

    #[instrument(skip_all, fields(program = %self.program, roots = spec.roots().len()))]
    async fn run(
        &self,
        spec: &NarrowingSpec,
        cancel: CancellationToken,
    ) -> Result<Vec<String>, SearchError> {
        let mut child = Command::new(&self.program)
            .args(Self::args(spec))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SearchError::transport(&self.program, source))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SearchError::transport(&self.program, io::Error::other("stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            SearchError::transport(&self.program, io::Error::other("stderr was not captured"))
        })?;

        let finished = {
            let collect = async {
                let (lines, diagnostics) = tokio::try_join!(read_lines(stdout), read_text(stderr))?;
                let status = child.wait().await?;
                Ok::<_, io::Error>((lines, diagnostics, status))
            };
            tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = collect => Some(result),
            }
        };

        let Some(result) = finished else {
            if let Err(err) = child.start_kill() {
                trace!(error = %err, "listing process already gone");
            }
            // Reap so no zombie outlives the superseded request.
            if let Err(err) = child.wait().await {
                trace!(error = %err, "failed to reap cancelled listing process");
            }
            debug!("listing cancelled");
            return Err(SearchError::Cancelled);
        };

        let (lines, diagnostics, status) =
            result.map_err(|source| SearchError::transport(&self.program, source))?;
        self.interpret(status, lines, diagnostics)
    }

    fn interpret(
        &self,
        status: ExitStatus,
        lines: Vec<String>,
        diagnostics: String,
    ) -> Result<Vec<String>, SearchError> {
        match status.code() {
            Some(0) => {
                debug!(count = lines.len(), "listing finished");
                Ok(lines)
            }
            code if code.is_some() && code == self.no_match_exit_code => {
                debug!(?code, "listing found nothing");
                Ok(Vec::new())
            }
            code => {
                warn!(?code, stderr = %diagnostics.trim_end(), "listing failed");
                Err(SearchError::process_failure(&self.program, code, diagnostics))
            }
        }
    }
}

impl Enumerator for FindEnumerator {
    fn list_candidates(
        &self,
        spec: &NarrowingSpec,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send {
        self.run(spec, cancel)
    }
}

/// Reads newline-separated paths, dropping blank lines and line terminators.
/// Lines that are not UTF-8 are skipped with a warning.
async fn read_lines<R: AsyncRead + Unpin>(reader: R) -> io::Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        if buf.is_empty() {
            continue;
        }
        match std::str::from_utf8(&buf) {
            Ok(line) => lines.push(line.to_owned()),
            Err(_) => warn!(path = %String::from_utf8_lossy(&buf), "skipping non UTF-8 path"),
        }
    }
    Ok(lines)
}

async fn read_text<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
