//! JSON dump of every harvested commit.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::{unique_commits, ReportContext, ReportError};
use crate::git::CommitRecord;
use crate::harvest::HarvestResult;
use crate::utils::relative_display;

/// Pretty-printed JSON with lexically sorted keys.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    created: DateTime<FixedOffset>,
    directory: String,
    items: Vec<JsonItem>,
    include_rules: Vec<String>,
    max_commits_per_file: Option<usize>,
    total_commits: usize,
}

#[derive(Debug, Serialize)]
struct JsonItem {
    file: String,
    logs: Vec<CommitRecord>,
}

impl JsonReport {
    /// Builds the report; items are ordered by file path.
    pub fn new(context: ReportContext, harvest: HarvestResult) -> Self {
        let total_commits = unique_commits(&harvest);
        let mut items: Vec<JsonItem> = harvest
            .into_iter()
            .map(|(path, logs)| JsonItem {
                file: relative_display(&path, &context.directory),
                logs,
            })
            .collect();
        items.sort_by(|a, b| a.file.cmp(&b.file));

        Self {
            created: context.generated_at,
            directory: context.directory.display().to_string(),
            items,
            include_rules: context.include_rules,
            max_commits_per_file: context.max_commits_per_file,
            total_commits,
        }
    }

    /// Renders the report.
    pub fn render(&self) -> Result<String, ReportError> {
        // Value objects keep their keys sorted.
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
