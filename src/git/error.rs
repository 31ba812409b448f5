//! History harvesting errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while fetching and decoding the history of a single file.
///
/// Apart from [`HistoryError::InvalidPattern`], which is raised while building
/// a [`LogFormat`](crate::git::LogFormat), these are scoped to one file: the
/// harvester logs them and leaves the file out of the result.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The field pattern derived from the record format did not compile.
    #[error("Invalid record format pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The path has no file name or containing directory to hand to git.
    #[error("Cannot derive a git invocation from path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The git executable could not be launched.
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// git exited with a non-zero status.
    #[error("git {} exited with {}", arguments.join(" "), status_label(*status))]
    CommandFailed {
        /// Exit code, `None` when the process was killed by a signal.
        status: Option<i32>,
        /// Arguments passed to git, including `-C <dir>`.
        arguments: Vec<String>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// git printed something that is not valid UTF-8.
    #[error("git output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// One commit record could not be parsed; the whole file is rejected.
    #[error("Failed to decode commit record: {source}\n{input}")]
    Decode {
        /// The JSON parse error.
        #[source]
        source: serde_json::Error,
        /// The sanitized record that failed to parse.
        input: String,
    },
}

fn status_label(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
