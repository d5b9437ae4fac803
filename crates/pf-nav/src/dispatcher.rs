//! Sequenced, cancellable background searches.
//!
//! Every dispatched search gets the next sequence number. Starting a new one
//! cancels the previous listing, and the new task waits for the previous task
//! to finish (the enumerator kills and reaps its process) before listing, so
//! at most one external process is live per dispatcher. Results come back on
//! a channel tagged with their sequence number; only a result carrying
//! [`latest_seq`](SearchDispatcher::latest_seq) may touch navigation state.
//!
//! ```text
//! dispatch(scope) ──► seq = latest + 1 ──► tokio::spawn(join previous,
//!        │                                      list + read_dir)
//!   cancel previous                                 │
//!                                                   ▼
//!                                       mpsc::Sender<SearchResult>
//!                                                   │
//! controller ◄── recv() ◄───────────────────────────┘
//!   (drops seq != latest)
//! ```

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use pf_search::{Enumerator, NarrowingSpec, SearchError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Default capacity of the result channel.
const RESULT_CHANNEL_CAPACITY: usize = 16;

/// What one search covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchScope {
    /// The typed directory text candidates are prefixed with (may be empty).
    pub directory: String,
    /// Absolute directory candidate names are made relative to.
    pub root: Utf8PathBuf,
    /// Roots and globs for the enumerator.
    pub spec: NarrowingSpec,
}

/// Raw output of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Absolute paths of matching files.
    pub files: Vec<String>,
    /// Absolute paths of the immediate sub-directories of the scope root.
    pub directories: Vec<String>,
}

/// A finished search.
#[derive(Debug)]
pub struct SearchResult {
    /// Sequence number assigned at dispatch.
    pub seq: u64,
    /// The scope that was searched.
    pub scope: SearchScope,
    /// The listing or the reason there is none.
    pub outcome: Result<Listing, SearchError>,
}

struct InFlight {
    seq: u64,
    scope: SearchScope,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Runs searches in the background and hands back their results in order of
/// completion, tagged so stale ones can be dropped.
pub struct SearchDispatcher<E> {
    enumerator: Arc<E>,
    latest: u64,
    in_flight: Option<InFlight>,
    draining: Option<JoinHandle<()>>,
    result_tx: mpsc::Sender<SearchResult>,
    result_rx: mpsc::Receiver<SearchResult>,
}

impl<E> std::fmt::Debug for SearchDispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDispatcher")
            .field("latest", &self.latest)
            .field("in_flight", &self.in_flight.as_ref().map(|job| job.seq))
            .finish_non_exhaustive()
    }
}

impl<E: Enumerator> SearchDispatcher<E> {
    /// Creates a dispatcher over `enumerator`.
    #[must_use]
    pub fn new(enumerator: E) -> Self {
        Self::with_capacity(enumerator, RESULT_CHANNEL_CAPACITY)
    }

    /// Creates a dispatcher with a custom result channel capacity.
    #[must_use]
    pub fn with_capacity(enumerator: E, capacity: usize) -> Self {
        let (result_tx, result_rx) = mpsc::channel(capacity.max(1));
        Self {
            enumerator: Arc::new(enumerator),
            latest: 0,
            in_flight: None,
            draining: None,
            result_tx,
            result_rx,
        }
    }

    /// The highest sequence number issued so far.
    #[must_use]
    pub const fn latest_seq(&self) -> u64 {
        self.latest
    }

    /// Returns `true` if `seq` belongs to the newest request.
    #[must_use]
    pub const fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }

    /// Scope of the search still running for the newest request, if any.
    #[must_use]
    pub fn in_flight_scope(&self) -> Option<&SearchScope> {
        self.in_flight
            .as_ref()
            .filter(|job| job.seq == self.latest)
            .map(|job| &job.scope)
    }

    /// Returns `true` if a search is running.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|job| !job.task.is_finished())
    }

    /// Starts a search for `scope`, cancelling any running one.
    pub fn dispatch(&mut self, scope: SearchScope) -> u64 {
        let previous = self.cancel_in_flight().or_else(|| self.draining.take());
        self.latest += 1;
        let seq = self.latest;
        let cancel = CancellationToken::new();

        let enumerator = Arc::clone(&self.enumerator);
        let tx = self.result_tx.clone();
        let job_scope = scope.clone();
        let job_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(err) = previous.await {
                    warn!(seq, error = %err, "superseded search task failed");
                }
            }
            let outcome = if job_cancel.is_cancelled() {
                Err(SearchError::Cancelled)
            } else {
                run_search(enumerator.as_ref(), &job_scope, job_cancel.clone()).await
            };
            let result = SearchResult {
                seq,
                scope: job_scope,
                outcome,
            };
            // A superseded task must not block its successor on a full channel.
            tokio::select! {
                biased;
                sent = tx.send(result) => {
                    if sent.is_err() {
                        trace!(seq, "search result receiver dropped");
                    }
                }
                () = job_cancel.cancelled() => trace!(seq, "dropping superseded result"),
            }
        });

        debug!(seq, spec = %scope.spec, "dispatched search");
        self.in_flight = Some(InFlight {
            seq,
            scope,
            cancel,
            task,
        });
        seq
    }

    /// Invalidates every outstanding request and cancels the running search.
    /// Returns the new latest sequence number.
    pub fn supersede(&mut self) -> u64 {
        if let Some(task) = self.cancel_in_flight() {
            self.draining = Some(task);
        }
        self.latest += 1;
        self.latest
    }

    /// Cancels the running search and hands back its task so the next one
    /// can wait for it.
    fn cancel_in_flight(&mut self) -> Option<JoinHandle<()>> {
        let job = self.in_flight.take()?;
        trace!(seq = job.seq, "cancelling superseded search");
        job.cancel.cancel();
        Some(job.task)
    }

    /// Marks `seq` as delivered so its scope no longer counts as in flight.
    pub fn finish(&mut self, seq: u64) {
        if self.in_flight.as_ref().is_some_and(|job| job.seq == seq) {
            self.in_flight = None;
        }
    }

    /// Waits for the next finished search, current or not.
    pub async fn recv(&mut self) -> Option<SearchResult> {
        self.result_rx.recv().await
    }

    /// Returns a finished search if one is waiting.
    pub fn try_recv(&mut self) -> Result<SearchResult, mpsc::error::TryRecvError> {
        self.result_rx.try_recv()
    }
}

impl<E> Drop for SearchDispatcher<E> {
    fn drop(&mut self) {
        if let Some(job) = self.in_flight.take() {
            job.cancel.cancel();
        }
    }
}

async fn run_search<E: Enumerator>(
    enumerator: &E,
    scope: &SearchScope,
    cancel: CancellationToken,
) -> Result<Listing, SearchError> {
    let files = enumerator.list_candidates(&scope.spec, cancel.clone()).await?;
    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }
    let directories = list_subdirectories(&scope.root).await;
    Ok(Listing { files, directories })
}

/// Immediate sub-directories of `root`. Unreadable entries are skipped.
async fn list_subdirectories(root: &Utf8Path) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(%root, error = %err, "cannot list directories");
            return Vec::new();
        }
    };

    let mut directories = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!(%root, error = %err, "stopped listing directories");
                break;
            }
        };
        let is_dir = match entry.file_type().await {
            Ok(kind) if kind.is_symlink() => tokio::fs::metadata(entry.path())
                .await
                .is_ok_and(|meta| meta.is_dir()),
            Ok(kind) => kind.is_dir(),
            Err(_) => false,
        };
        if !is_dir {
            continue;
        }
        match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => directories.push(path.into_string()),
            Err(path) => trace!(path = %path.display(), "skipping non UTF-8 directory"),
        }
    }
    directories.sort();
    directories
}
