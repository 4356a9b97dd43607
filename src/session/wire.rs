//! Tolerant decoding of the `SearchTimeline` response payload.
//!
//! The timeline format nests tweets deep inside instruction/entry wrappers
//! and changes shape between rollouts, so this module walks the JSON with
//! `serde_json::Value` instead of rigid typed structs. Individual entries
//! that fail to decode are skipped with a warning; only a payload with no
//! recognizable timeline at all is a decode error.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::FetchError;
use super::{Page, PageCursor};
use crate::scrape::RawTweet;

/// Wire format of tweet creation timestamps.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Fallback wait when a 429 response carries no usable reset header.
const DEFAULT_RESET_WINDOW: TimeDelta = TimeDelta::seconds(60);

/// Extracts tweets and the bottom cursor from a `SearchTimeline` body.
///
/// Order of appearance is preserved. Cursor-only pages decode to an empty
/// item list, which the engine treats as source exhaustion.
pub(crate) fn parse_search_page(body: &Value) -> Result<Page, FetchError> {
    let instructions = body
        .pointer("/data/search_by_raw_query/search_timeline/timeline/instructions")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::decode("missing timeline instructions"))?;

    let mut items = Vec::new();
    let mut next = None;

    for instruction in instructions {
        match instruction.get("type").and_then(Value::as_str) {
            Some("TimelineAddEntries") => {
                let entries = instruction
                    .get("entries")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                for entry in entries {
                    collect_entry(entry, &mut items, &mut next);
                }
            }
            // Terminal pages often replace the bottom cursor instead of
            // adding entries.
            Some("TimelineReplaceEntry") => {
                if let Some(entry) = instruction.get("entry") {
                    collect_entry(entry, &mut items, &mut next);
                }
            }
            _ => {}
        }
    }

    debug!(items = items.len(), has_cursor = next.is_some(), "decoded search page");
    Ok(Page { items, next })
}

/// Dispatches one timeline entry to the tweet or cursor collector.
fn collect_entry(entry: &Value, items: &mut Vec<RawTweet>, next: &mut Option<PageCursor>) {
    let Some(content) = entry.get("content") else {
        return;
    };
    match content.get("entryType").and_then(Value::as_str) {
        Some("TimelineTimelineItem") => {
            let result = content.pointer("/itemContent/tweet_results/result");
            match result.and_then(parse_tweet_result) {
                Some(tweet) => items.push(tweet),
                None => {
                    // Promoted entries and tombstones land here too; only
                    // worth a warning, not a failed run.
                    let entry_id = entry.get("entryId").and_then(Value::as_str);
                    warn!(entry_id, "skipping undecodable timeline item");
                }
            }
        }
        Some("TimelineTimelineCursor") => {
            if content.get("cursorType").and_then(Value::as_str) == Some("Bottom") {
                if let Some(value) = content.get("value").and_then(Value::as_str) {
                    *next = Some(PageCursor::new(value));
                }
            }
        }
        _ => {}
    }
}

/// Decodes one `tweet_results.result` object into a [`RawTweet`].
///
/// Returns `None` when any required field is missing or malformed.
fn parse_tweet_result(result: &Value) -> Option<RawTweet> {
    // Limited-visibility tweets wrap the real result one level deeper.
    let result = if result.get("__typename").and_then(Value::as_str)
        == Some("TweetWithVisibilityResults")
    {
        result.get("tweet")?
    } else {
        result
    };

    let legacy = result.get("legacy")?;
    let author = result
        .pointer("/core/user_results/result/legacy/name")
        .and_then(Value::as_str)?
        .to_string();
    let text = legacy.get("full_text").and_then(Value::as_str)?.to_string();
    let created_at =
        parse_created_at(legacy.get("created_at").and_then(Value::as_str)?)?;
    let reshare_count = legacy.get("retweet_count").and_then(Value::as_u64)?;
    let favorite_count = legacy.get("favorite_count").and_then(Value::as_u64)?;

    Some(RawTweet {
        author,
        text,
        created_at,
        reshare_count,
        favorite_count,
    })
}

/// Parses a tweet timestamp in the `"Tue Dec 10 18:11:02 +0000 2024"` form.
pub(crate) fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Reads the rate-limit reset time from a 429 response.
///
/// The `x-rate-limit-reset` header carries epoch seconds. A throttle
/// response without a usable header is still a throttle, so the fallback
/// is a fixed window from now rather than a fatal error.
pub(crate) fn rate_limit_reset(headers: &HeaderMap) -> DateTime<Utc> {
    headers
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|epoch| Utc.timestamp_opt(epoch, 0).single())
        .unwrap_or_else(|| Utc::now() + DEFAULT_RESET_WINDOW)
}
