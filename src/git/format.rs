//! Sentinel-delimited `git log --format` template.
//!
//! git has no structured output mode for `log`, so the template spells out a
//! JSON object whose keys and values are wrapped in a rare quote sentinel
//! instead of `"`. Commit text may legitimately contain quotes, backslashes and
//! newlines; [`LogFormat::sanitize`] escapes every sentinel-quoted value and
//! only then swaps the sentinels for real quotes, so the chunk parses as JSON.
//!
//! If git ever emits a sentinel literally inside commit content, a field
//! boundary is misdetected and the record fails to decode. That risk is
//! accepted rather than handled.

use std::fmt;

use regex::Regex;

use super::HistoryError;

/// Quote sentinel wrapping every key and value in [`JSON_TEMPLATE`].
pub const QUOTE_SYMBOL: char = '\u{237A}';

/// Terminator written after every commit record.
pub const RECORD_SEPARATOR: &str = "\u{2611}\u{FE0F}";

/// Template emitting one JSON-shaped record per commit.
pub const JSON_TEMPLATE: &str = "{
  ⍺subject⍺: {
    ⍺text⍺: ⍺%s⍺,
    ⍺sanitized⍺: ⍺%f⍺
  },
  ⍺authored_at⍺: ⍺%aI⍺,
  ⍺committed_at⍺: ⍺%cI⍺,
  ⍺body⍺: ⍺%b⍺,
  ⍺parents⍺: ⍺%P⍺,
  ⍺author⍺: {
    ⍺email⍺: ⍺%aE⍺,
    ⍺name⍺: ⍺%aN⍺
  },
  ⍺committer⍺: {
    ⍺email⍺: ⍺%cE⍺,
    ⍺name⍺: ⍺%cN⍺
  },
  ⍺notes⍺: ⍺%N⍺,
  ⍺signature⍺: {
    ⍺issuer⍺: ⍺%GS⍺,
    ⍺fingerprint⍺: ⍺%GF⍺,
    ⍺key⍺: ⍺%GK⍺,
    ⍺message⍺: ⍺%GG⍺,
    ⍺trust⍺: ⍺%GT⍺
  },
  ⍺hash⍺: {
    ⍺full⍺: ⍺%H⍺,
    ⍺abbreviated⍺: ⍺%h⍺
  }
}☑️";

/// A `--format` template together with the rules for reading its output.
#[derive(Debug, Clone)]
pub struct LogFormat {
    template: String,
    quote: char,
    separator: String,
    field_pattern: Regex,
}

impl LogFormat {
    /// Creates a format from a template, its quote sentinel and record separator.
    pub fn new(
        template: impl Into<String>,
        quote: char,
        separator: impl Into<String>,
    ) -> Result<Self, HistoryError> {
        let quote_pattern = regex::escape(&quote.to_string());
        let field_pattern = Regex::new(&format!(": {quote_pattern}([^{quote_pattern}]*)"))?;

        Ok(Self {
            template: template.into(),
            quote,
            separator: separator.into(),
            field_pattern,
        })
    }

    /// Returns the built-in JSON-shaped format.
    pub fn json() -> Result<Self, HistoryError> {
        Self::new(JSON_TEMPLATE, QUOTE_SYMBOL, RECORD_SEPARATOR)
    }

    /// Returns the template passed to git.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the `--format=<template>` argument.
    pub fn format_argument(&self) -> String {
        format!("--format={}", self.template)
    }

    /// Returns the record separator used to split raw output.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Returns the quote sentinel.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// Escapes every sentinel-quoted value in one raw record, then replaces the
    /// sentinels with `"` so the record becomes JSON text.
    pub fn sanitize(&self, record: &str) -> String {
        let mut sanitized = String::with_capacity(record.len());
        let mut last = 0;

        for captures in self.field_pattern.captures_iter(record) {
            let Some(value) = captures.get(1) else {
                continue;
            };
            sanitized.push_str(&record[last..value.start()]);
            sanitized.push_str(&escape_value(value.as_str()));
            last = value.end();
        }
        sanitized.push_str(&record[last..]);

        sanitized.replace(self.quote, "\"")
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Escapes one field value for embedding in a JSON string literal.
///
/// Quotes become apostrophes and tabs become spaces; both are lossy.
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push('\''),
            '\t' => escaped.push(' '),
            '\\' => escaped.push_str("\\\\"),
            '/' => escaped.push_str("\\/"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            c if c.is_ascii_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}
