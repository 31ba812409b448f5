//! CLI interface for git-log-analyser.

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::files::FileIndexer;
use crate::git::{FetchSpec, GitLog};
use crate::harvest::{HarvestOptions, Harvester};
use crate::ownership::{OwnershipAnalyzer, TicketExtractor};
use crate::report::{write_report, Report, ReportContext, ReportKind};
use crate::utils::{format_elapsed, plural, Settings};

/// git-log-analyser: analyzes the commit history of individual files in bulk.
#[derive(Parser, Debug)]
#[command(name = "git-log-analyser")]
#[command(about = "Analyzes the commit git logs of individual files in bulk", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The root path.
    #[arg(long, value_name = "PATH")]
    pub directory: PathBuf,

    /// Prints indexing and per-file progress.
    #[arg(long)]
    pub verbose: bool,

    /// Regex rule a file's path (relative to the root) must match; repeatable.
    #[arg(long, value_name = "REGEX")]
    pub included: Vec<String>,

    /// The report to generate.
    #[arg(long, value_enum)]
    pub report: ReportKind,

    /// Shows only commits before this date (inclusive). Accepts git date formats like YYYY-MM-DD.
    #[arg(long, value_name = "DATE")]
    pub before: Option<String>,

    /// Includes only commits after this date (inclusive). Accepts git date formats like YYYY-MM-DD.
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// The maximum number of commits to index per file, newest first. For unlimited set zero.
    #[arg(long, value_name = "N")]
    pub max_commits_per_file: Option<usize>,

    /// Maximum number of git processes running at once. Unbounded when omitted.
    #[arg(
        long,
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub concurrency: Option<usize>,

    /// Settings file to use instead of ~/.git-log-analyser/settings.json.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        let start = Instant::now();

        // Resolve settings once; the git tool is threaded through every fetch
        let settings = match &self.settings {
            Some(path) => Settings::load_from_path(path)?,
            None => Settings::load()?,
        };
        let analyzer = OwnershipAnalyzer::new(
            settings
                .ticket_aliases
                .clone()
                .map_or_else(TicketExtractor::default, TicketExtractor::new),
        );
        let git_log = GitLog::new(settings.git_tool(), self.fetch_spec())
            .context("Failed to build the git log format")?;

        // Index files
        let files = FileIndexer::new(&self.directory, self.included.clone(), self.verbose)
            .context("Failed to compile include rules")?
            .run();
        eprintln!("\nFound {} file{}\n", files.len(), plural(files.len()));
        info!(directory = %self.directory.display(), files = files.len(), "Indexed directory");

        // Harvest histories and build the report once every file is done
        let harvester = Harvester::new(
            git_log,
            HarvestOptions {
                verbose: self.verbose,
                concurrency: self.concurrency,
            },
        );
        let context = self.report_context();
        let kind = self.report;
        let report = harvester
            .harvest_then(files, |harvest| {
                eprintln!("\nGenerating report...\n");
                Report::build(kind, context, harvest, &analyzer)
            })
            .await;

        // Write to stdout
        let rendered = report.render()?;
        write_report(&mut io::stdout().lock(), rendered)?;

        eprintln!("\nReport done! {}", format_elapsed(start.elapsed()));
        Ok(())
    }

    /// Filters passed to every `git log` run.
    pub fn fetch_spec(&self) -> FetchSpec {
        FetchSpec {
            max_count: self.max_commits_per_file,
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }

    fn report_context(&self) -> ReportContext {
        ReportContext {
            directory: self.directory.clone(),
            include_rules: self.included.clone(),
            max_commits_per_file: self.max_commits_per_file,
            generated_at: Local::now().fixed_offset(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_option() {
        let cli = Cli::try_parse_from([
            "git-log-analyser",
            "--directory",
            "/repo",
            "--verbose",
            "--included",
            r"\.rs$",
            "--included",
            "^src/",
            "--report",
            "squad-ownership",
            "--before",
            "2024-12-31",
            "--after",
            "2024-01-01",
            "--max-commits-per-file",
            "10",
            "--concurrency",
            "8",
            "--settings",
            "/tmp/settings.json",
        ])
        .unwrap();

        assert_eq!(cli.directory, PathBuf::from("/repo"));
        assert!(cli.verbose);
        assert_eq!(cli.included, [r"\.rs$", "^src/"]);
        assert_eq!(cli.report, ReportKind::SquadOwnership);
        assert_eq!(cli.concurrency, Some(8));
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/settings.json")));
        assert_eq!(
            cli.fetch_spec(),
            FetchSpec {
                max_count: Some(10),
                before: Some("2024-12-31".to_string()),
                after: Some("2024-01-01".to_string()),
            }
        );
    }

    #[test]
    fn directory_and_report_are_required() {
        assert!(Cli::try_parse_from(["git-log-analyser", "--report", "json"]).is_err());
        assert!(Cli::try_parse_from(["git-log-analyser", "--directory", "."]).is_err());
    }

    #[test]
    fn unknown_report_is_rejected() {
        let err = Cli::try_parse_from([
            "git-log-analyser",
            "--directory",
            ".",
            "--report",
            "yaml",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn defaults() {
        let cli =
            Cli::try_parse_from(["git-log-analyser", "--directory", ".", "--report", "oneline"])
                .unwrap();
        assert!(!cli.verbose);
        assert!(cli.included.is_empty());
        assert_eq!(cli.concurrency, None);
        assert_eq!(cli.fetch_spec(), FetchSpec::default());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = Cli::try_parse_from([
            "git-log-analyser",
            "--directory",
            ".",
            "--report",
            "json",
            "--concurrency",
            "0",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
