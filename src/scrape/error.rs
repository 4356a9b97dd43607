//! Run outcome and error types for the pagination engine.
//!
//! Rate limiting is not an error at this level: the engine handles it
//! internally and only ever stops for one of the three terminal conditions
//! captured by [`StopReason`].

use thiserror::Error;

use crate::session::FetchError;
use crate::sink::SinkError;

/// Fatal failure that ended a run early.
///
/// Everything appended to the sink before the failure stays in place;
/// there is no rollback.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The session failed with something other than a rate limit.
    #[error("page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The record sink rejected an append.
    #[error("record sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// Why a run ended.
#[derive(Debug)]
pub enum StopReason {
    /// At least `target_count` records were collected.
    TargetReached,
    /// The source returned an empty page or an exhausted cursor.
    SourceExhausted,
    /// A fatal error stopped the run with partial results.
    Failed(ScrapeError),
}

impl StopReason {
    /// Returns `true` for the two expected terminal conditions.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Result of one engine run.
#[derive(Debug)]
pub struct ScrapeSummary {
    /// Number of records handed to the sink.
    pub records_collected: u64,
    /// Number of pages fetched (including the one that ended the run).
    pub pages_fetched: u32,
    /// Terminal condition that ended the run.
    pub stop: StopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_target_reached_is_success() {
        assert!(StopReason::TargetReached.is_success());
    }

    #[test]
    fn test_stop_reason_source_exhausted_is_success() {
        assert!(StopReason::SourceExhausted.is_success());
    }

    #[test]
    fn test_stop_reason_failed_is_not_success() {
        let reason = StopReason::Failed(ScrapeError::Fetch(FetchError::http_status(
            "https://x.com/i/api", 500,
        )));
        assert!(!reason.is_success());
    }

    #[test]
    fn test_scrape_error_display_includes_cause() {
        let error = ScrapeError::Fetch(FetchError::http_status("https://x.com/i/api", 403));
        let msg = error.to_string();
        assert!(msg.contains("page fetch failed"), "got: {msg}");
        assert!(msg.contains("403"), "got: {msg}");
    }
}
