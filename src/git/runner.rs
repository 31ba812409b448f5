//! git subprocess execution.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use super::HistoryError;

/// Program used when nothing else is configured.
pub const DEFAULT_GIT_PROGRAM: &str = "git";

/// The git executable and the environment block it runs with.
///
/// Resolved once at startup and shared by every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTool {
    program: String,
    env: BTreeMap<String, String>,
}

impl Default for GitTool {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_PROGRAM)
    }
}

impl GitTool {
    /// Creates a tool that runs `program` with prompts disabled.
    pub fn new(program: impl Into<String>) -> Self {
        let mut env = BTreeMap::new();
        env.insert("GIT_TERMINAL_PROMPT".to_string(), "0".to_string());

        Self {
            program: program.into(),
            env,
        }
    }

    /// Adds a variable to the environment passed to every invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Returns the program name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the extra environment block.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Runs git from the directory containing `file` and returns its standard
    /// output with trailing whitespace removed.
    ///
    /// Blocks until the child exits. There is no timeout and no retry.
    pub fn run(&self, args: &[String], file: &Path) -> Result<String, HistoryError> {
        let directory = containing_directory(file)?;

        let mut arguments = Vec::with_capacity(args.len() + 2);
        arguments.push("-C".to_string());
        arguments.push(directory.to_string_lossy().into_owned());
        arguments.extend(args.iter().cloned());

        debug!(program = %self.program, file = %file.display(), "Running git");

        let output = Command::new(&self.program)
            .args(&arguments)
            .envs(&self.env)
            .output()
            .map_err(|source| HistoryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(HistoryError::CommandFailed {
                status: output.status.code(),
                arguments,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        Ok(stdout.trim_end().to_string())
    }
}

/// Returns the directory git should run in for `file`.
fn containing_directory(file: &Path) -> Result<&Path, HistoryError> {
    match file.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(Path::new(".")),
        Some(parent) => Ok(parent),
        None => Err(HistoryError::InvalidPath(file.to_path_buf())),
    }
}
