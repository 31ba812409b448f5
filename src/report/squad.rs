//! Squad ownership report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::ReportContext;
use crate::harvest::HarvestResult;
use crate::ownership::{Ownership, OwnershipAnalyzer};
use crate::utils::relative_display;

const FILE_DATE_FORMAT: &str = "%Y/%m/%d";

/// One line per owned file plus the unowned remainder.
#[derive(Debug)]
pub struct SquadOwnershipReport {
    context: ReportContext,
    aliases: BTreeMap<String, String>,
    owned: Vec<OwnedFile>,
    unowned: Vec<String>,
    total: usize,
}

#[derive(Debug)]
struct OwnedFile {
    path: String,
    last_commit: String,
    ownership: Ownership,
}

impl SquadOwnershipReport {
    /// Attributes every harvested file with `analyzer`.
    pub fn new(
        context: ReportContext,
        harvest: &HarvestResult,
        analyzer: &OwnershipAnalyzer,
    ) -> Self {
        let analysis = analyzer.analyze(harvest);
        let total = analysis.total();

        let mut owned: Vec<(PathBuf, Ownership)> = analysis.owned.into_iter().collect();
        owned.sort_by(|a, b| a.0.cmp(&b.0));
        let owned = owned
            .into_iter()
            .map(|(path, ownership)| {
                let last_commit = harvest
                    .get(&path)
                    .and_then(|records| records.iter().map(|r| r.committed_at).max())
                    .map_or_else(
                        || "No date".to_string(),
                        |date| date.format(FILE_DATE_FORMAT).to_string(),
                    );
                OwnedFile {
                    path: relative_display(&path, &context.directory),
                    last_commit,
                    ownership,
                }
            })
            .collect();

        let unowned = analysis
            .unowned
            .iter()
            .map(|path| relative_display(path, &context.directory))
            .collect();

        Self {
            aliases: analyzer.extractor().aliases().clone(),
            context,
            owned,
            unowned,
            total,
        }
    }

    /// Renders the report.
    pub fn render(&self) -> String {
        let files_query: Vec<String> = self
            .context
            .include_rules
            .iter()
            .map(|rule| format!("\"{rule}\""))
            .collect();

        let mut report = String::from("# Squad Ownership Report\n");
        report.push_str(&format!("- Date: {}\n", self.context.header_date()));
        report.push_str(&format!(
            "- Directory: {}\n",
            self.context.directory.display()
        ));
        report.push_str(&format!("- Files Query: {}\n", files_query.join(", ")));
        report.push_str(&format!(
            "- Files with squad: {} / {}\n",
            self.owned.len(),
            self.total
        ));

        report.push_str("\n## Squad Normalization\n");
        let aliases: Vec<String> = self
            .aliases
            .iter()
            .map(|(alias, squad)| format!("- {alias} => {squad}"))
            .collect();
        report.push_str(&aliases.join("\n"));

        report.push_str("\n\n## Files\n");
        for file in &self.owned {
            report.push_str(&format!(
                "{}, {}, {}\n",
                file.last_commit, file.path, file.ownership
            ));
        }

        if !self.unowned.is_empty() {
            report.push_str(&format!("\n\n## {} Unowned Files\n", self.unowned.len()));
            let unowned: Vec<String> = self.unowned.iter().map(|path| format!("- {path}")).collect();
            report.push_str(&unowned.join("\n"));
        }
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ownership::TicketExtractor;
    use crate::report::tests::{context, harvest};

    #[test]
    fn squad_report_with_custom_aliases() {
        let aliases = BTreeMap::from([
            ("ABC".to_string(), "CORE".to_string()),
            ("XYZ".to_string(), "CORE".to_string()),
        ]);
        let analyzer = OwnershipAnalyzer::new(TicketExtractor::new(aliases));
        let report = SquadOwnershipReport::new(context(), &harvest(), &analyzer).render();

        insta::assert_snapshot!(report, @r#"
        # Squad Ownership Report
        - Date: 6/1/2024, 2:30 PM
        - Directory: /repo
        - Files Query: "\.rs$", "^src/"
        - Files with squad: 2 / 3

        ## Squad Normalization
        - ABC => CORE
        - XYZ => CORE

        ## Files
        2024/02/01, src/app.rs, CORE, 100%
        2024/01/01, src/model.rs, CORE, 100%


        ## 1 Unowned Files
        - README.md
        "#);
    }

    #[test]
    fn default_alias_table_is_listed_sorted() {
        let report =
            SquadOwnershipReport::new(context(), &harvest(), &OwnershipAnalyzer::default())
                .render();
        let aliases: Vec<_> = report
            .lines()
            .filter(|line| line.contains(" => "))
            .collect();
        assert_eq!(aliases.len(), 28);
        assert_eq!(aliases[0], "- CCS => AGNTX");
        assert_eq!(aliases[27], "- SMF => DPLAN");
    }

    #[test]
    fn no_unowned_section_when_everything_is_owned() {
        let mut harvest = harvest();
        harvest.remove(std::path::Path::new("/repo/README.md"));
        let report =
            SquadOwnershipReport::new(context(), &harvest, &OwnershipAnalyzer::default()).render();
        assert!(report.ends_with("2024/01/01, src/model.rs, ABC, 100%\n"));
        assert!(!report.contains("Unowned"));
    }
}
