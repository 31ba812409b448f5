//! Reports rendered from a harvest.

pub mod json;
pub mod squad;
pub mod text;

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use thiserror::Error;

pub use json::JsonReport;
pub use squad::SquadOwnershipReport;
pub use text::{TextFormat, TextReport};

use crate::harvest::HarvestResult;
use crate::ownership::OwnershipAnalyzer;

/// Timestamp format used in report headers.
pub const HEADER_DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M %p";

/// Report kinds selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Pretty-printed JSON of every harvested commit
    Json,
    /// Full text history per file
    Full,
    /// One line per commit
    Oneline,
    /// Squad attribution from ticket keys
    SquadOwnership,
}

impl ReportKind {
    /// The name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Full => "full",
            Self::Oneline => "oneline",
            Self::SquadOwnership => "squad-ownership",
        }
    }
}

/// Run parameters echoed in every report header.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Indexed root directory
    pub directory: PathBuf,
    /// Include rules as given
    pub include_rules: Vec<String>,
    /// Per-file commit limit, if any
    pub max_commits_per_file: Option<usize>,
    /// When the report was generated
    pub generated_at: DateTime<FixedOffset>,
}

impl ReportContext {
    /// Generation time formatted for headers.
    pub fn header_date(&self) -> String {
        self.generated_at.format(HEADER_DATE_FORMAT).to_string()
    }
}

/// Errors raised while rendering or writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The rendered report could not be written.
    #[error("Couldn't write the report: {source}\n\nReport:\n\n{report}")]
    Output {
        /// Write failure
        #[source]
        source: io::Error,
        /// The unwritten report
        report: String,
    },
}

/// A report built from one harvest.
#[derive(Debug)]
pub enum Report {
    /// See [`JsonReport`]
    Json(JsonReport),
    /// See [`TextReport`] with [`TextFormat::full`]
    Full(TextReport),
    /// See [`TextReport`] with [`TextFormat::oneline`]
    Oneline(TextReport),
    /// See [`SquadOwnershipReport`]
    SquadOwnership(SquadOwnershipReport),
}

impl Report {
    /// Builds the report of the given kind.
    pub fn build(
        kind: ReportKind,
        context: ReportContext,
        harvest: HarvestResult,
        analyzer: &OwnershipAnalyzer,
    ) -> Self {
        match kind {
            ReportKind::Json => Self::Json(JsonReport::new(context, harvest)),
            ReportKind::Full => Self::Full(TextReport::new(context, harvest, TextFormat::full())),
            ReportKind::Oneline => {
                Self::Oneline(TextReport::new(context, harvest, TextFormat::oneline()))
            }
            ReportKind::SquadOwnership => {
                Self::SquadOwnership(SquadOwnershipReport::new(context, &harvest, analyzer))
            }
        }
    }

    /// Renders the report text.
    pub fn render(&self) -> Result<String, ReportError> {
        match self {
            Self::Json(report) => report.render(),
            Self::Full(report) | Self::Oneline(report) => Ok(report.render()),
            Self::SquadOwnership(report) => Ok(report.render()),
        }
    }
}

/// Writes a rendered report, keeping the text in the error on failure.
pub fn write_report<W: Write>(out: &mut W, report: String) -> Result<(), ReportError> {
    match out.write_all(report.as_bytes()).and_then(|()| out.flush()) {
        Ok(()) => Ok(()),
        Err(source) => Err(ReportError::Output { source, report }),
    }
}

/// Number of distinct commits across all files.
pub fn unique_commits(harvest: &HarvestResult) -> usize {
    harvest
        .values()
        .flatten()
        .map(|record| record.hash.full.as_str())
        .collect::<HashSet<_>>()
        .len()
}
