//! Ticket prefix extraction and squad alias normalization.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// A ticket key such as `ABC-123` followed by a non-word character.
#[allow(clippy::unwrap_used)]
static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)-\d+\W").unwrap());

/// Misspelled or retired ticket prefixes and the squad they belong to.
pub const DEFAULT_ALIASES: [(&str, &str); 28] = [
    ("CCS", "AGNTX"),
    ("CHK", "ORGANIC"),
    ("CHURN", "CS"),
    ("CMSUM", "ORGANIC"),
    ("CON", "ORGANIC"),
    ("ET", "ER"),
    ("FINNC", "FINCC"),
    ("GRW", "ORGANIC"),
    ("HFHFMOB", "HFMOB"),
    ("HFMO", "HFMOB"),
    ("HFOMB", "HFMOB"),
    ("HMOB", "HFMOB"),
    ("IMR", "MREV"),
    ("IO", "HFMOB"),
    ("IOS", "HFMOB"),
    ("MNZ", "MREV"),
    ("MOBAD", "MOBA/MOBD"),
    ("MOBDA", "MOBA/MOBD"),
    ("MODBA", "MOBA/MOBD"),
    ("MSS", "MENUX"),
    ("MVW", "MENUX/DPLAN"),
    ("PLAMN", "DPLAN"),
    ("PLANM", "DPLAN"),
    ("PLUS", "MREV"),
    ("RAF", "REF"),
    ("RCP", "MENUX"),
    ("REACT", "SQDREACT"),
    ("SMF", "DPLAN"),
];

/// Returns [`DEFAULT_ALIASES`] as an owned table.
pub fn default_aliases() -> BTreeMap<String, String> {
    DEFAULT_ALIASES
        .iter()
        .map(|&(alias, squad)| (alias.to_string(), squad.to_string()))
        .collect()
}

/// Pulls the squad prefix out of a commit subject.
#[derive(Debug, Clone)]
pub struct TicketExtractor {
    aliases: BTreeMap<String, String>,
}

impl Default for TicketExtractor {
    fn default() -> Self {
        Self::new(default_aliases())
    }
}

impl TicketExtractor {
    /// Creates an extractor normalizing prefixes through `aliases`.
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// The alias table, sorted by alias.
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Returns the normalized prefix of the first ticket key in `subject`.
    pub fn extract(&self, subject: &str) -> Option<String> {
        let prefix = TICKET_PATTERN.captures(subject)?.get(1)?.as_str();
        Some(self.normalize(prefix).to_string())
    }

    /// Maps an alias to its squad; unknown prefixes pass through.
    pub fn normalize<'a>(&'a self, prefix: &'a str) -> &'a str {
        self.aliases.get(prefix).map_or(prefix, String::as_str)
    }
}
