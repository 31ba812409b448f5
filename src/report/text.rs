//! Human-readable history reports.

use std::path::PathBuf;

use super::{unique_commits, ReportContext};
use crate::git::{CommitRecord, RecordField};
use crate::harvest::HarvestResult;
use crate::utils::relative_display;

/// Which commit fields a text report shows and how they are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFormat {
    /// Fields in display order
    pub fields: Vec<RecordField>,
    /// Joins the fields of one commit
    pub separator: &'static str,
}

impl TextFormat {
    /// Hash, identities, subject and body on separate lines.
    pub fn full() -> Self {
        Self {
            fields: vec![
                RecordField::Hash,
                RecordField::Author,
                RecordField::Committer,
                RecordField::Subject,
                RecordField::Body,
            ],
            separator: "\n",
        }
    }

    /// Hash and subject on one line.
    pub fn oneline() -> Self {
        Self {
            fields: vec![RecordField::Hash, RecordField::Subject],
            separator: " ",
        }
    }
}

/// Per-file history rendered as Markdown-flavoured text.
#[derive(Debug)]
pub struct TextReport {
    context: ReportContext,
    items: Vec<(String, Vec<CommitRecord>)>,
    total_commits: usize,
    format: TextFormat,
}

impl TextReport {
    /// Builds the report; files are ordered by path.
    pub fn new(context: ReportContext, harvest: HarvestResult, format: TextFormat) -> Self {
        let total_commits = unique_commits(&harvest);
        let mut items: Vec<(PathBuf, Vec<CommitRecord>)> = harvest.into_iter().collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));

        let items = items
            .into_iter()
            .map(|(path, records)| (relative_display(&path, &context.directory), records))
            .collect();

        Self {
            context,
            items,
            total_commits,
            format,
        }
    }

    /// Renders the report.
    pub fn render(&self) -> String {
        let max_commits = self
            .context
            .max_commits_per_file
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string());

        let mut report = String::from("# Git Logs\n");
        report.push_str(&format!("- Date: {}\n", self.context.header_date()));
        report.push_str(&format!(
            "- Directory: {}\n",
            self.context.directory.display()
        ));
        report.push_str(&format!(
            "- Include Rules: {}\n",
            self.context.include_rules.join(", ")
        ));
        report.push_str(&format!("- Maximum commits per file: {max_commits}\n"));
        report.push_str(&format!(
            "- Total commits indexed: {}\n\n",
            self.total_commits
        ));

        let items: Vec<String> = self
            .items
            .iter()
            .map(|(path, records)| self.describe_item(path, records))
            .collect();
        report.push_str(&items.join("\n"));
        report
    }

    fn describe_item(&self, path: &str, records: &[CommitRecord]) -> String {
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut item = format!("### {name} ({} commits)\n\nPath: {path}", records.len());
        if records.is_empty() {
            return item;
        }

        item.push_str("\n\nHistory:\n");
        for (index, record) in records.iter().enumerate() {
            item.push_str(&format!("\n{}.\n", index + 1));
            item.push_str(&record.describe(&self.format.fields, self.format.separator, false));
            item.push('\n');
        }
        item
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::report::tests::{context, harvest};

    #[test]
    fn oneline_report() {
        let report = TextReport::new(context(), harvest(), TextFormat::oneline()).render();

        let expected = [
            "# Git Logs",
            "- Date: 6/1/2024, 2:30 PM",
            "- Directory: /repo",
            r"- Include Rules: \.rs$, ^src/",
            "- Maximum commits per file: 5",
            "- Total commits indexed: 2",
            "",
            "### README.md (0 commits)",
            "",
            "Path: README.md",
            "### app.rs (2 commits)",
            "",
            "Path: src/app.rs",
            "",
            "History:",
            "",
            "1.",
            "commit aaa1111 ",
            "ABC-1: create app",
            "",
            "2.",
            "commit bbb2222 ",
            "ABC-2: wire it up",
            "",
            "### model.rs (1 commits)",
            "",
            "Path: src/model.rs",
            "",
            "History:",
            "",
            "1.",
            "commit aaa1111 ",
            "ABC-1: create app",
            "",
        ]
        .join("\n");
        assert_eq!(report, expected);
    }

    #[test]
    fn full_report_lists_identities_and_body() {
        let mut harvest = harvest();
        let records = harvest
            .get_mut(std::path::Path::new("/repo/src/model.rs"))
            .unwrap();
        records[0].body = Some("Longer explanation".to_string());

        let report = TextReport::new(context(), harvest, TextFormat::full()).render();
        assert!(report.contains(
            "1.\ncommit aaa1111\nAuthor: Ada Lovelace <ada@example.com>\n\
             Commit: Ada Lovelace <ada@example.com>\n\nABC-1: create app\n\nLonger explanation\n"
        ));
    }

    #[test]
    fn unlimited_commits_per_file() {
        let mut context = context();
        context.max_commits_per_file = None;
        let report = TextReport::new(context, HarvestResult::new(), TextFormat::full()).render();
        assert!(report.contains("- Maximum commits per file: unlimited\n"));
        assert!(report.contains("- Total commits indexed: 0\n"));
    }
}
