//! Decoding of raw `git log` output into [`CommitRecord`]s.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tracing::error;

use super::record::{is_blank, CommitHash, CommitRecord, Contributor, Signature, Subject};
use super::{HistoryError, LogFormat};

/// Splits, sanitizes and decodes the output of one `git log` invocation.
#[derive(Debug, Clone)]
pub struct HistoryDecoder {
    format: LogFormat,
    prune_empty: bool,
}

/// Shape of one sanitized record, mirroring [`JSON_TEMPLATE`](super::format::JSON_TEMPLATE).
#[derive(Debug, Deserialize)]
struct RawRecord {
    hash: CommitHash,
    author: Contributor,
    committer: Contributor,
    authored_at: DateTime<FixedOffset>,
    committed_at: DateTime<FixedOffset>,
    subject: Subject,
    #[serde(default)]
    body: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    signature: RawSignature,
    #[serde(default)]
    parents: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSignature {
    issuer: String,
    fingerprint: String,
    key: String,
    message: String,
    trust: String,
}

impl HistoryDecoder {
    /// Creates a decoder for output produced with `format`.
    ///
    /// With `prune_empty`, optional fields that decode to an empty string
    /// become `None`, and so does a signature whose fields are all empty.
    pub fn new(format: LogFormat, prune_empty: bool) -> Self {
        Self {
            format,
            prune_empty,
        }
    }

    /// Returns the format this decoder reads.
    pub fn format(&self) -> &LogFormat {
        &self.format
    }

    /// Splits raw output into sanitized per-commit chunks.
    pub fn split(&self, output: &str) -> Vec<String> {
        output
            .split(self.format.separator())
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| self.format.sanitize(chunk))
            .collect()
    }

    /// Decodes sanitized chunks in order.
    ///
    /// The first malformed chunk aborts the whole batch.
    pub fn decode(&self, chunks: &[String]) -> Result<Vec<CommitRecord>, HistoryError> {
        chunks
            .iter()
            .map(|chunk| {
                self.decode_one(chunk).inspect_err(|e| {
                    error!("{e}");
                })
            })
            .collect()
    }

    /// Splits and decodes raw output in one step.
    pub fn decode_output(&self, output: &str) -> Result<Vec<CommitRecord>, HistoryError> {
        self.decode(&self.split(output))
    }

    fn decode_one(&self, chunk: &str) -> Result<CommitRecord, HistoryError> {
        let decode_error = |source| HistoryError::Decode {
            source,
            input: chunk.to_string(),
        };

        let raw: RawRecord = serde_json::from_str(chunk).map_err(decode_error)?;
        if raw.hash.full.is_empty() || raw.hash.abbreviated.is_empty() {
            return Err(decode_error(serde::de::Error::custom(
                "commit hash is empty",
            )));
        }

        Ok(self.into_record(raw))
    }

    fn into_record(&self, raw: RawRecord) -> CommitRecord {
        let signature = self.signature(raw.signature);

        CommitRecord {
            hash: raw.hash,
            author: raw.author,
            committer: raw.committer,
            authored_at: raw.authored_at,
            committed_at: raw.committed_at,
            subject: raw.subject,
            body: self.optional(raw.body.trim_end(), str::is_empty),
            notes: self.optional(raw.notes.trim_end(), str::is_empty),
            signature,
            parents: raw.parents.split_whitespace().map(String::from).collect(),
        }
    }

    fn signature(&self, raw: RawSignature) -> Option<Signature> {
        let signature = Signature {
            issuer: self.optional(&raw.issuer, is_blank),
            fingerprint: self.optional(&raw.fingerprint, is_blank),
            key: self.optional(&raw.key, is_blank),
            message: self.optional(raw.message.trim_end(), is_blank),
            trust: self.optional(&raw.trust, is_blank),
        };

        let unsigned = signature.issuer.is_none()
            && signature.fingerprint.is_none()
            && signature.key.is_none()
            && signature.message.is_none()
            && signature.trust.is_none();

        if self.prune_empty && unsigned {
            None
        } else {
            Some(signature)
        }
    }

    fn optional(&self, value: &str, empty: fn(&str) -> bool) -> Option<String> {
        if self.prune_empty && empty(value) {
            None
        } else {
            Some(value.to_string())
        }
    }
}
