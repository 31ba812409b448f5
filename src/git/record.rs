//! Commit records decoded from `git log` output.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One commit touching a harvested file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full and abbreviated commit hash
    pub hash: CommitHash,
    /// Author identity (mailmap applied)
    pub author: Contributor,
    /// Committer identity (mailmap applied)
    pub committer: Contributor,
    /// When the change was originally authored
    pub authored_at: DateTime<FixedOffset>,
    /// When the commit was created; the ordering key
    pub committed_at: DateTime<FixedOffset>,
    /// Subject line, raw and filename-sanitized
    pub subject: Subject,
    /// Message body after the subject line
    pub body: Option<String>,
    /// Attached git notes
    pub notes: Option<String>,
    /// GPG/SSH signature details when the commit is signed
    pub signature: Option<Signature>,
    /// Parent hashes; empty for a root commit
    pub parents: Vec<String>,
}

/// Full and abbreviated commit hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitHash {
    /// 40 character hex hash
    pub full: String,
    /// Abbreviated hash as chosen by git
    pub abbreviated: String,
}

/// An author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contributor {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

/// Commit subject in raw and sanitized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// Subject line as written
    pub text: String,
    /// Subject reduced to filename-safe characters (`%f`)
    pub sanitized: String,
}

/// Signature verification details.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Name of the signer
    pub issuer: Option<String>,
    /// Fingerprint of the signing key
    pub fingerprint: Option<String>,
    /// Key used to sign
    pub key: Option<String>,
    /// Raw verification message
    pub message: Option<String>,
    /// Trust level of the signing key
    pub trust: Option<String>,
}

impl fmt::Display for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fields that can be rendered by [`CommitRecord::describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    /// Full hash
    Hash,
    /// Author identity
    Author,
    /// Subject text
    Subject,
    /// Message body
    Body,
    /// Authored timestamp
    AuthoredAt,
    /// Abbreviated hash
    AbbreviatedHash,
    /// Committed timestamp
    CommittedAt,
    /// Committer identity
    Committer,
    /// git notes
    Notes,
    /// Sanitized subject
    SanitizedSubject,
}

impl RecordField {
    /// Every field, in the order used by the default [`fmt::Display`] output.
    pub const ALL: [Self; 10] = [
        Self::Hash,
        Self::Author,
        Self::Subject,
        Self::Body,
        Self::AuthoredAt,
        Self::AbbreviatedHash,
        Self::CommittedAt,
        Self::Committer,
        Self::Notes,
        Self::SanitizedSubject,
    ];

    /// Label written in front of the value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hash => "commit ",
            Self::Author => "Author: ",
            Self::Subject | Self::Body => "\n",
            Self::AuthoredAt => "Created: ",
            Self::AbbreviatedHash => "Abbrev. Hash: ",
            Self::CommittedAt => "Published: ",
            Self::Committer => "Commit: ",
            Self::Notes => "Notes: ",
            Self::SanitizedSubject => "Sanitized Subject: ",
        }
    }
}

/// Timestamp format used in text output.
pub const TEXT_DATE_FORMAT: &str = "%b %-d, %Y at %-I:%M:%S %p %:z";

impl CommitRecord {
    /// Returns the rendered value of one field.
    pub fn field_value(&self, field: RecordField) -> String {
        match field {
            RecordField::Hash => self.hash.full.clone(),
            RecordField::Author => self.author.to_string(),
            RecordField::Subject => self.subject.text.clone(),
            RecordField::Body => self.body.clone().unwrap_or_default(),
            RecordField::AuthoredAt => self.authored_at.format(TEXT_DATE_FORMAT).to_string(),
            RecordField::AbbreviatedHash => self.hash.abbreviated.clone(),
            RecordField::CommittedAt => self.committed_at.format(TEXT_DATE_FORMAT).to_string(),
            RecordField::Committer => self.committer.to_string(),
            RecordField::Notes => self.notes.clone().unwrap_or_default(),
            RecordField::SanitizedSubject => self.subject.sanitized.clone(),
        }
    }

    /// Renders the given fields as `label + value`, joined by `separator`.
    ///
    /// With `omit_empty`, fields without a value are skipped.
    pub fn describe(&self, fields: &[RecordField], separator: &str, omit_empty: bool) -> String {
        fields
            .iter()
            .filter_map(|&field| {
                let value = self.field_value(field);
                if omit_empty && is_blank(&value) {
                    None
                } else {
                    Some(format!("{}{value}", field.label()))
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(&RecordField::ALL, "\n", true))
    }
}

/// True for values git uses to mean "nothing here".
pub(crate) fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "undefined"
}
