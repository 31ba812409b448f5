//! Squad ownership attribution from ticket keys in commit subjects.
//!
//! Every commit contributes at most one ticket prefix (the first key in its
//! sanitized subject). Prefixes are normalized through the alias table and
//! tallied per file; a file's owners are the tallied squads ranked by count.

pub mod counted_set;
pub mod tickets;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

pub use counted_set::CountedSet;
pub use tickets::{default_aliases, TicketExtractor, DEFAULT_ALIASES};

use crate::git::CommitRecord;
use crate::harvest::HarvestResult;

/// One squad's share of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// Normalized ticket prefix
    pub prefix: String,
    /// Commits carrying this prefix
    pub count: usize,
    /// `count` divided by the file's total tallied commits
    pub share: f64,
}

impl Attribution {
    /// Share as a whole percentage, rounding half to even.
    pub fn percent(&self) -> u32 {
        (self.share * 100.0).round_ties_even() as u32
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}%", self.prefix, self.percent())
    }
}

/// The squads that touched one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    tally: CountedSet<String>,
}

impl Ownership {
    /// Wraps a tally; `None` when no ticket was found.
    pub fn new(tally: CountedSet<String>) -> Option<Self> {
        if tally.is_empty() {
            None
        } else {
            Some(Self { tally })
        }
    }

    /// The per-squad commit counts.
    pub fn tally(&self) -> &CountedSet<String> {
        &self.tally
    }

    /// Squads grouped by count, highest first.
    ///
    /// Members of one count group come out in hash-map iteration order.
    pub fn ranked(&self) -> Vec<Attribution> {
        let Some(max_count) = self.tally.max_count() else {
            return Vec::new();
        };
        let total = self.tally.total_count() as f64;

        let mut ranked = Vec::with_capacity(self.tally.len());
        for threshold in (1..=max_count).rev() {
            for (prefix, count) in self.tally.iter().filter(|&(_, count)| count == threshold) {
                ranked.push(Attribution {
                    prefix: prefix.clone(),
                    count,
                    share: count as f64 / total,
                });
            }
        }
        ranked
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranked: Vec<String> = self.ranked().iter().map(ToString::to_string).collect();
        f.write_str(&ranked.join(", "))
    }
}

/// Ownership of every harvested file.
#[derive(Debug, Clone, Default)]
pub struct OwnershipAnalysis {
    /// Files with at least one ticket key
    pub owned: HashMap<PathBuf, Ownership>,
    /// Files without any ticket key, sorted by path
    pub unowned: Vec<PathBuf>,
}

impl OwnershipAnalysis {
    /// Every squad seen in any file.
    pub fn squads(&self) -> BTreeSet<&str> {
        self.owned
            .values()
            .flat_map(|ownership| ownership.tally.members())
            .map(String::as_str)
            .collect()
    }

    /// Number of files analyzed.
    pub fn total(&self) -> usize {
        self.owned.len() + self.unowned.len()
    }
}

/// Attributes harvested files to squads.
#[derive(Debug, Clone, Default)]
pub struct OwnershipAnalyzer {
    extractor: TicketExtractor,
}

impl OwnershipAnalyzer {
    /// Creates an analyzer using `extractor`.
    pub fn new(extractor: TicketExtractor) -> Self {
        Self { extractor }
    }

    /// The ticket extractor, including its alias table.
    pub fn extractor(&self) -> &TicketExtractor {
        &self.extractor
    }

    /// Tallies the squads of one file's history.
    pub fn tally(&self, records: &[CommitRecord]) -> CountedSet<String> {
        records
            .iter()
            .filter_map(|record| self.extractor.extract(&record.subject.sanitized))
            .collect()
    }

    /// Splits every harvested file into owned and unowned.
    pub fn analyze(&self, harvest: &HarvestResult) -> OwnershipAnalysis {
        let mut analysis = OwnershipAnalysis::default();

        for (path, records) in harvest {
            match Ownership::new(self.tally(records)) {
                Some(ownership) => {
                    analysis.owned.insert(path.clone(), ownership);
                }
                None => analysis.unowned.push(path.clone()),
            }
        }
        analysis.unowned.sort();

        debug!(
            owned = analysis.owned.len(),
            unowned = analysis.unowned.len(),
            "Attributed files to squads"
        );
        analysis
    }
}
