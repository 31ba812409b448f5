//! git history extraction.
//!
//! [`GitLog`] runs `git log --follow` for one file through [`GitTool`],
//! using the sentinel-delimited [`LogFormat`] so every commit decodes into a
//! [`CommitRecord`] via [`HistoryDecoder`].

pub mod decoder;
pub mod error;
pub mod format;
pub mod log;
pub mod record;
pub mod runner;

pub use decoder::HistoryDecoder;
pub use error::HistoryError;
pub use format::LogFormat;
pub use log::{FetchSpec, GitLog, HistorySource};
pub use record::{CommitHash, CommitRecord, Contributor, RecordField, Signature, Subject};
pub use runner::GitTool;
