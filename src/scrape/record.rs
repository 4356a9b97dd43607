//! Raw tweet data and the normalized output record.
//!
//! Normalization is the only transform between the wire and the sink:
//! a run-scoped sequence number is assigned and newline characters in the
//! body are collapsed to spaces so each record stays on one CSV row.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One tweet as returned by the session for a page, before normalization.
///
/// Consumed to produce a [`TweetRecord`], then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTweet {
    /// Display name of the tweet author.
    pub author: String,
    /// Tweet body text, possibly containing newlines.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Retweet count as reported by the source.
    pub reshare_count: u64,
    /// Like count as reported by the source.
    pub favorite_count: u64,
}

/// Normalized record written to the sink.
///
/// The serde field names are the fixed CSV column headers; keep them in sync
/// with [`crate::sink::CSV_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TweetRecord {
    /// 1-based position of this record within the run. Strictly increasing
    /// and gapless, independent of per-page indices.
    #[serde(rename = "Tweet_count")]
    pub sequence_number: u64,
    /// Display name of the tweet author.
    #[serde(rename = "Username")]
    pub author: String,
    /// Body text with every newline collapsed to a space.
    #[serde(rename = "Text")]
    pub text: String,
    /// Creation timestamp (RFC 3339 in the CSV).
    #[serde(rename = "Created At")]
    pub created_at: DateTime<Utc>,
    /// Retweet count.
    #[serde(rename = "Retweets")]
    pub reshare_count: u64,
    /// Like count.
    #[serde(rename = "Likes")]
    pub favorite_count: u64,
}

impl TweetRecord {
    /// Normalizes a raw tweet, assigning the given run-scoped sequence
    /// number (1-based).
    #[must_use]
    pub fn normalize(raw: RawTweet, sequence_number: u64) -> Self {
        Self {
            sequence_number,
            author: raw.author,
            text: collapse_newlines(&raw.text),
            created_at: raw.created_at,
            reshare_count: raw.reshare_count,
            favorite_count: raw.favorite_count,
        }
    }
}

/// Replaces each newline character (`\n` or `\r`) with a single space.
///
/// The replacement is 1:1, so the character count of the input is preserved.
#[must_use]
pub fn collapse_newlines(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
