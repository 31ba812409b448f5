//! Recursive file listing with regex include rules.

use std::fmt;
use std::fs;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Decides whether indexing continues after an I/O error.
pub type ErrorHandler = Box<dyn Fn(&Path, &io::Error) -> bool + Send + Sync>;

/// Errors raised while configuring a [`FileIndexer`].
#[derive(Error, Debug)]
pub enum IndexError {
    /// An include rule is not a valid regular expression.
    #[error("Invalid include rule '{rule}': {source}")]
    InvalidRule {
        /// The rule as given
        rule: String,
        /// Compilation failure
        #[source]
        source: regex::Error,
    },
}

/// Lists the regular files under a directory that match any include rule.
///
/// Hidden entries (names starting with `.`) are skipped and hidden
/// directories are not descended into. Rules are matched against the path
/// relative to the root; with no rules every file is included.
pub struct FileIndexer {
    directory: PathBuf,
    include_rules: Vec<String>,
    rules: Vec<Regex>,
    verbose: bool,
    error_handler: Option<ErrorHandler>,
}

impl fmt::Debug for FileIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileIndexer")
            .field("directory", &self.directory)
            .field("include_rules", &self.include_rules)
            .field("verbose", &self.verbose)
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

impl FileIndexer {
    /// Creates an indexer, compiling every include rule.
    pub fn new(
        directory: impl Into<PathBuf>,
        include_rules: Vec<String>,
        verbose: bool,
    ) -> Result<Self, IndexError> {
        let rules = include_rules
            .iter()
            .map(|rule| {
                Regex::new(rule).map_err(|source| IndexError::InvalidRule {
                    rule: rule.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            directory: directory.into(),
            include_rules,
            rules,
            verbose,
            error_handler: None,
        })
    }

    /// Installs a handler consulted on I/O errors; returning `false` stops
    /// indexing and keeps what was found so far.
    ///
    /// Without a handler, unreadable entries are skipped.
    #[must_use]
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// The indexed root.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The include rules as given.
    pub fn include_rules(&self) -> &[String] {
        &self.include_rules
    }

    /// Lists every included regular file, sorted by path.
    ///
    /// A root that is itself a file yields just that file (when included).
    /// A symlinked root is followed. A missing root yields an empty list.
    pub fn run(&self) -> Vec<PathBuf> {
        if let Err(e) = fs::metadata(&self.directory) {
            warn!(directory = %self.directory.display(), "Directory not found: {e}");
            return Vec::new();
        }

        let walker = WalkDir::new(&self.directory)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(&self.directory).to_path_buf();
                    if self.handle_error(&path, &io::Error::from(e)).is_break() {
                        break;
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            let relative = match path.strip_prefix(&self.directory) {
                Ok(relative) if !relative.as_os_str().is_empty() => relative,
                _ => path.as_path(),
            };
            if self.is_included(&path, relative) {
                files.push(path);
            }
        }
        files.sort();

        debug!(directory = %self.directory.display(), files = files.len(), "Indexed files");
        files
    }

    fn is_included(&self, path: &Path, relative: &Path) -> bool {
        if self.rules.is_empty() {
            return true;
        }

        let relative = relative.to_string_lossy();
        let included = self.rules.iter().any(|rule| rule.is_match(&relative));
        if self.verbose {
            let marker = if included { "✅ Indexing" } else { "➖ Skipping" };
            eprintln!("{marker} {relative}");
        }
        debug!(file = %path.display(), included, "Checked include rules");
        included
    }

    fn handle_error(&self, path: &Path, error: &io::Error) -> ControlFlow<()> {
        warn!(path = %path.display(), "Failed to read entry: {error}");
        match &self.error_handler {
            Some(handler) if !handler(path, error) => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
