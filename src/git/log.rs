//! Per-file history fetching with `git log --follow`.

use std::path::Path;

use tracing::debug;

use super::{CommitRecord, GitTool, HistoryDecoder, HistoryError, LogFormat};

/// Filters applied to every fetch in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSpec {
    /// Maximum number of commits per file; `None` or `0` means unlimited.
    pub max_count: Option<usize>,
    /// Only commits before this date (git date syntax, inclusive).
    pub before: Option<String>,
    /// Only commits after this date (git date syntax, inclusive).
    pub after: Option<String>,
}

/// Source of per-file commit history.
///
/// Implementations return records newest first.
pub trait HistorySource: Send + Sync {
    /// Fetches the history of one file.
    fn fetch(&self, path: &Path) -> Result<Vec<CommitRecord>, HistoryError>;
}

/// Fetches file history by running `git log`.
#[derive(Debug, Clone)]
pub struct GitLog {
    tool: GitTool,
    decoder: HistoryDecoder,
    spec: FetchSpec,
}

impl GitLog {
    /// Creates a fetcher using the built-in record format.
    pub fn new(tool: GitTool, spec: FetchSpec) -> Result<Self, HistoryError> {
        Ok(Self::with_format(tool, LogFormat::json()?, spec))
    }

    /// Creates a fetcher using a custom record format.
    pub fn with_format(tool: GitTool, format: LogFormat, spec: FetchSpec) -> Self {
        Self {
            tool,
            decoder: HistoryDecoder::new(format, true),
            spec,
        }
    }

    /// Returns the filters used by this fetcher.
    pub fn spec(&self) -> &FetchSpec {
        &self.spec
    }

    /// Builds the `git log` arguments for `path`, without the `-C <dir>` prefix.
    pub fn arguments(&self, path: &Path) -> Result<Vec<String>, HistoryError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| HistoryError::InvalidPath(path.to_path_buf()))?;

        let mut arguments = vec![
            "log".to_string(),
            self.decoder.format().format_argument(),
            "--follow".to_string(),
        ];
        if let Some(max_count) = self.spec.max_count.filter(|&n| n > 0) {
            arguments.push(format!("-{max_count}"));
        }
        if let Some(before) = &self.spec.before {
            arguments.push(format!("--before={before}"));
        }
        if let Some(after) = &self.spec.after {
            arguments.push(format!("--after={after}"));
        }
        arguments.push(file_name.to_string_lossy().into_owned());

        Ok(arguments)
    }
}

impl HistorySource for GitLog {
    fn fetch(&self, path: &Path) -> Result<Vec<CommitRecord>, HistoryError> {
        let arguments = self.arguments(path)?;
        let output = self.tool.run(&arguments, path)?;
        let records = self.decoder.decode_output(&output)?;

        debug!(file = %path.display(), commits = records.len(), "Decoded history");
        Ok(newest_first(records))
    }
}

/// Orders records by committed time, newest first.
///
/// Sorts ascending with a stable sort and reverses, so reversing the result
/// again yields ascending order with ties kept in decode order.
pub fn newest_first(mut records: Vec<CommitRecord>) -> Vec<CommitRecord> {
    records.sort_by_key(|record| record.committed_at);
    records.reverse();
    records
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::git::record::fixtures::record;

    fn git_log(spec: FetchSpec) -> GitLog {
        GitLog::new(GitTool::default(), spec).unwrap()
    }

    #[test]
    fn arguments_without_filters() {
        let log = git_log(FetchSpec::default());
        let arguments = log.arguments(Path::new("src/git/log.rs")).unwrap();
        assert_eq!(arguments.len(), 4);
        assert_eq!(arguments[0], "log");
        assert!(arguments[1].starts_with("--format="));
        assert_eq!(arguments[2], "--follow");
        assert_eq!(arguments[3], "log.rs");
    }

    #[test]
    fn arguments_with_all_filters() {
        let log = git_log(FetchSpec {
            max_count: Some(2),
            before: Some("2024-01-31".to_string()),
            after: Some("2 weeks ago".to_string()),
        });
        let arguments = log.arguments(&PathBuf::from("/repo/a b.txt")).unwrap();
        assert_eq!(
            &arguments[2..],
            ["--follow", "-2", "--before=2024-01-31", "--after=2 weeks ago", "a b.txt"]
        );
    }

    #[test]
    fn zero_max_count_is_unlimited() {
        let log = git_log(FetchSpec {
            max_count: Some(0),
            ..FetchSpec::default()
        });
        let arguments = log.arguments(Path::new("a.txt")).unwrap();
        assert!(!arguments.iter().any(|a| a == "-0"));
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        let log = git_log(FetchSpec::default());
        assert!(matches!(
            log.arguments(Path::new("..")),
            Err(HistoryError::InvalidPath(_))
        ));
    }

    #[test]
    fn newest_first_orders_descending() {
        let records = vec![
            record("b", "second", "2024-01-02T00:00:00Z"),
            record("c", "third", "2024-01-03T00:00:00Z"),
            record("a", "first", "2024-01-01T00:00:00Z"),
        ];
        let hashes: Vec<_> = newest_first(records)
            .into_iter()
            .map(|r| r.hash.full)
            .collect();
        assert_eq!(hashes, ["c", "b", "a"]);
    }

    #[test]
    fn newest_first_reversed_keeps_decode_order_for_ties() {
        let records = vec![
            record("x", "one", "2024-01-01T00:00:00Z"),
            record("y", "two", "2024-01-01T00:00:00Z"),
            record("z", "three", "2024-01-01T00:00:00Z"),
        ];
        let mut ordered = newest_first(records);
        ordered.reverse();
        let hashes: Vec<_> = ordered.into_iter().map(|r| r.hash.full).collect();
        assert_eq!(hashes, ["x", "y", "z"]);
    }

    #[test]
    fn newest_first_compares_instants_across_offsets() {
        let records = vec![
            record("early", "a", "2024-01-01T10:00:00+02:00"),
            record("late", "b", "2024-01-01T09:00:00+00:00"),
        ];
        let ordered = newest_first(records);
        assert_eq!(ordered[0].hash.full, "late");
    }
}
