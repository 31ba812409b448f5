//! # git-log-analyser
//!
//! Bulk per-file git history harvesting.
//!
//! ## Features
//!
//! - One `git log --follow` per file, decoded from a sentinel-delimited format
//! - Concurrent harvesting that isolates per-file failures
//! - JSON, full text, one-line and squad ownership reports
//!
//! ## Quick Start
//!
//! ```no_run
//! use git_log_analyser::git::{FetchSpec, GitLog, GitTool, HistorySource};
//!
//! let log = GitLog::new(GitTool::default(), FetchSpec::default())?;
//! for record in log.fetch(std::path::Path::new("src/lib.rs"))? {
//!     println!("{} {}", record.hash.abbreviated, record.subject);
//! }
//! # Ok::<(), git_log_analyser::git::HistoryError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod files;
pub mod git;
pub mod harvest;
pub mod ownership;
pub mod report;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of git-log-analyser.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
