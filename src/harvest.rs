//! Concurrent history harvesting across many files.
//!
//! Every path gets its own blocking task on tokio's blocking pool. Tasks
//! share nothing but the [`HistorySource`]; each one hands `(path, outcome)`
//! back to a single collecting loop, which is the only place the result map
//! is written.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::git::{CommitRecord, HistoryError, HistorySource};
use crate::utils::format_elapsed;

/// Commit history per file, oldest commit first.
///
/// Files whose fetch failed are absent. They cannot be told apart from files
/// that were never requested except by comparing against the input paths.
pub type HarvestResult = HashMap<PathBuf, Vec<CommitRecord>>;

/// Options for a harvest run.
#[derive(Debug, Clone, Default)]
pub struct HarvestOptions {
    /// Print per-file progress and failures to stderr.
    pub verbose: bool,
    /// Upper bound on concurrently running fetches; `None` dispatches every
    /// file at once.
    pub concurrency: Option<usize>,
}

/// Why one file is missing from a [`HarvestResult`].
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Fetching or decoding the history failed.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// The blocking task panicked or was cancelled.
    #[error("History task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The concurrency limiter was closed.
    #[error("Concurrency limiter closed: {0}")]
    Limiter(#[from] tokio::sync::AcquireError),
}

/// Fans history fetches out over many files and collects the results.
pub struct Harvester<S> {
    source: Arc<S>,
    options: HarvestOptions,
}

impl<S: HistorySource + 'static> Harvester<S> {
    /// Creates a harvester fetching through `source`.
    pub fn new(source: S, options: HarvestOptions) -> Self {
        Self {
            source: Arc::new(source),
            options,
        }
    }

    /// Harvests every path and returns the collected histories.
    pub async fn harvest(&self, paths: Vec<PathBuf>) -> HarvestResult {
        let total = paths.len();
        let limiter = self
            .options
            .concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS))));

        debug!(files = total, concurrency = ?self.options.concurrency, "Starting harvest");

        let mut pending: FuturesUnordered<_> = paths
            .into_iter()
            .map(|path| {
                let source = Arc::clone(&self.source);
                let limiter = limiter.clone();
                async move {
                    let started = Instant::now();
                    let outcome = fetch(source, limiter, path.clone()).await;
                    (path, outcome, started.elapsed())
                }
            })
            .collect();

        let mut result = HarvestResult::with_capacity(total);
        let mut current = 0;

        while let Some((path, outcome, elapsed)) = pending.next().await {
            match outcome {
                Ok(mut records) => {
                    current += 1;
                    records.reverse();
                    self.report_progress(current, total, &path, elapsed);
                    result.insert(path, records);
                }
                Err(e) => {
                    warn!(file = %path.display(), "Skipping file: {e}");
                    if self.options.verbose {
                        eprintln!("❌ {} Error: {e}", path.display());
                    }
                }
            }
        }

        info!(
            harvested = result.len(),
            failed = total - result.len(),
            "Harvest complete"
        );
        result
    }

    /// Harvests every path, then hands the result to `on_complete` exactly once.
    pub async fn harvest_then<F, R>(&self, paths: Vec<PathBuf>, on_complete: F) -> R
    where
        F: FnOnce(HarvestResult) -> R,
    {
        let result = self.harvest(paths).await;
        on_complete(result)
    }

    fn report_progress(&self, current: usize, total: usize, path: &Path, elapsed: Duration) {
        debug!(file = %path.display(), current, total, "Harvested file");
        if self.options.verbose {
            eprintln!(
                "[{current}/{total}] {} {}",
                path.display(),
                format_elapsed(elapsed)
            );
        }
    }
}

/// Runs one fetch on the blocking pool, newest record first.
async fn fetch<S: HistorySource + 'static>(
    source: Arc<S>,
    limiter: Option<Arc<Semaphore>>,
    path: PathBuf,
) -> Result<Vec<CommitRecord>, HarvestError> {
    let _permit = match limiter {
        Some(limiter) => Some(limiter.acquire_owned().await?),
        None => None,
    };

    let records = tokio::task::spawn_blocking(move || source.fetch(&path)).await??;
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::git::log::newest_first;
    use crate::git::record::fixtures::record;

    /// In-memory history keyed by path; unknown paths fail like git would.
    struct FakeSource {
        histories: HashMap<PathBuf, Vec<CommitRecord>>,
        panics_on: Option<PathBuf>,
        delay: Duration,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeSource {
        fn new(histories: Vec<(&str, Vec<CommitRecord>)>) -> Self {
            Self {
                histories: histories
                    .into_iter()
                    .map(|(path, records)| (PathBuf::from(path), records))
                    .collect(),
                panics_on: None,
                delay: Duration::ZERO,
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl HistorySource for FakeSource {
        fn fetch(&self, path: &Path) -> Result<Vec<CommitRecord>, HistoryError> {
            let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.panics_on.as_deref() == Some(path) {
                panic!("fetch exploded");
            }
            match self.histories.get(path) {
                Some(records) => Ok(newest_first(records.clone())),
                None => Err(HistoryError::CommandFailed {
                    status: Some(128),
                    arguments: vec!["log".to_string()],
                    stdout: String::new(),
                    stderr: "fatal: not a git repository".to_string(),
                }),
            }
        }
    }

    fn three_commit_history() -> Vec<CommitRecord> {
        vec![
            record("c3", "third", "2024-01-03T00:00:00Z"),
            record("c1", "first", "2024-01-01T00:00:00Z"),
            record("c2", "second", "2024-01-02T00:00:00Z"),
        ]
    }

    #[tokio::test]
    async fn collects_histories_oldest_first() {
        let harvester = Harvester::new(
            FakeSource::new(vec![("a.txt", three_commit_history())]),
            HarvestOptions::default(),
        );
        let result = harvester.harvest(vec![PathBuf::from("a.txt")]).await;

        let hashes: Vec<_> = result[Path::new("a.txt")]
            .iter()
            .map(|r| r.hash.full.as_str())
            .collect();
        assert_eq!(hashes, ["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn every_history_is_non_decreasing() {
        let harvester = Harvester::new(
            FakeSource::new(vec![
                ("a.txt", three_commit_history()),
                (
                    "b.txt",
                    vec![
                        record("b2", "later", "2024-02-01T00:00:00+05:00"),
                        record("b1", "earlier", "2024-01-31T23:00:00Z"),
                    ],
                ),
            ]),
            HarvestOptions::default(),
        );
        let result = harvester
            .harvest(vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")])
            .await;

        for records in result.values() {
            assert!(records
                .windows(2)
                .all(|pair| pair[0].committed_at <= pair[1].committed_at));
        }
    }

    #[tokio::test]
    async fn failed_fetch_is_absent_not_empty() {
        let harvester = Harvester::new(
            FakeSource::new(vec![("a.txt", three_commit_history()), ("empty.txt", vec![])]),
            HarvestOptions::default(),
        );
        let result = harvester
            .harvest(vec![
                PathBuf::from("a.txt"),
                PathBuf::from("empty.txt"),
                PathBuf::from("missing.txt"),
            ])
            .await;

        assert_eq!(result.len(), 2);
        assert!(result[Path::new("empty.txt")].is_empty());
        assert!(!result.contains_key(Path::new("missing.txt")));
    }

    #[tokio::test]
    async fn panicking_fetch_is_isolated() {
        let mut source =
            FakeSource::new(vec![("a.txt", three_commit_history()), ("b.txt", vec![])]);
        source.panics_on = Some(PathBuf::from("b.txt"));
        let harvester = Harvester::new(source, HarvestOptions::default());

        let result = harvester
            .harvest(vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")])
            .await;
        assert_eq!(result.keys().collect::<Vec<_>>(), [Path::new("a.txt")]);
    }

    #[tokio::test]
    async fn harvest_then_invokes_callback_once() {
        let calls = AtomicUsize::new(0);
        let harvester = Harvester::new(
            FakeSource::new(vec![("a.txt", three_commit_history())]),
            HarvestOptions::default(),
        );

        let count = harvester
            .harvest_then(vec![PathBuf::from("a.txt")], |result| {
                calls.fetch_add(1, Ordering::SeqCst);
                result.len()
            })
            .await;

        assert_eq!(count, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_result() {
        let harvester = Harvester::new(FakeSource::new(vec![]), HarvestOptions::default());
        assert!(harvester.harvest(Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn harvesting_twice_is_idempotent() {
        let harvester = Harvester::new(
            FakeSource::new(vec![("a.txt", three_commit_history()), ("b.txt", vec![])]),
            HarvestOptions::default(),
        );
        let paths = vec![
            PathBuf::from("a.txt"),
            PathBuf::from("b.txt"),
            PathBuf::from("c.txt"),
        ];

        let first = harvester.harvest(paths.clone()).await;
        let second = harvester.harvest(paths).await;

        let as_sets = |result: &HarvestResult| -> HashMap<PathBuf, HashSet<CommitRecord>> {
            result
                .iter()
                .map(|(path, records)| (path.clone(), records.iter().cloned().collect()))
                .collect()
        };
        assert_eq!(as_sets(&first), as_sets(&second));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrency_limit_bounds_running_fetches() {
        let histories: Vec<_> = ["a", "b", "c", "d", "e", "f"]
            .into_iter()
            .map(|name| (name, vec![record(name, "subject", "2024-01-01T00:00:00Z")]))
            .collect();
        let mut source = FakeSource::new(histories);
        source.delay = Duration::from_millis(25);

        let harvester = Harvester::new(
            source,
            HarvestOptions {
                verbose: false,
                concurrency: Some(2),
            },
        );
        let paths = ["a", "b", "c", "d", "e", "f"].map(PathBuf::from).to_vec();
        let result = harvester.harvest(paths).await;

        assert_eq!(result.len(), 6);
        assert!(harvester.source.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn oversized_concurrency_limit_is_clamped() {
        let harvester = Harvester::new(
            FakeSource::new(vec![("a.txt", three_commit_history())]),
            HarvestOptions {
                verbose: false,
                concurrency: Some(usize::MAX),
            },
        );
        let result = harvester.harvest(vec![PathBuf::from("a.txt")]).await;
        assert_eq!(result[Path::new("a.txt")].len(), 3);
    }
}
