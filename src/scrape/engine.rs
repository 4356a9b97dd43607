//! The retrieval loop: pagination with politeness pacing and backoff.
//!
//! The engine drives a [`SessionProvider`] page by page, normalizes every
//! item in the order received, and appends each record to a [`RecordSink`]
//! before the next page is requested. Pages are never prefetched and never
//! truncated: once fetched, a page is fully processed even when that
//! overshoots the target count.
//!
//! # Stopping conditions
//!
//! 1. Target reached - at least `target_count` records collected.
//! 2. Source exhausted - an empty page or an exhausted cursor. An empty
//!    page ends the run even when a continuation cursor is present.
//! 3. Fatal error - any session failure other than a rate limit, or a sink
//!    failure. Never retried.
//!
//! Rate-limited fetches are retried forever against the same cursor after
//! waiting out the server-reported reset time.

use tracing::{debug, error, info, instrument};

use super::cursor::SearchCursor;
use super::error::{ScrapeError, ScrapeSummary, StopReason};
use super::pacing::PacingPolicy;
use super::record::{RawTweet, TweetRecord};
use crate::session::{FetchError, Page, SearchMode, SessionProvider};
use crate::sink::{RecordSink, SinkError};

/// Default number of records to collect when none is requested.
pub const DEFAULT_TARGET_COUNT: u64 = 10;

/// Error type for engine construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The target count must be at least 1.
    #[error("invalid target count {value}: must be at least 1")]
    InvalidTarget {
        /// The invalid value that was provided.
        value: u64,
    },
}

/// Mutable state threaded through one run.
///
/// Created at the start of [`ScrapeEngine::run`] and destroyed when it
/// returns; runs never resume from prior state.
#[derive(Debug, Default)]
pub struct RunState {
    /// Records handed to the sink so far. The next sequence number is
    /// always `records_collected + 1`, which keeps the output gapless.
    pub records_collected: u64,
    /// Where the run is within the paginated result set.
    pub cursor: SearchCursor,
}

/// Pagination engine for one search query.
///
/// # Concurrency Model
///
/// Single logical task. The loop suspends only at the politeness delay
/// before a non-initial fetch and at the hard rate-limit wait; pages are
/// fetched and written strictly sequentially, so the sink sees exactly one
/// writer for the whole run.
#[derive(Debug)]
pub struct ScrapeEngine {
    /// Search expression sent to the session on the initial fetch.
    query: String,
    /// Result ordering requested from the session.
    mode: SearchMode,
    /// Stop once at least this many records were collected.
    target_count: u64,
    /// Politeness delay and backoff policy.
    pacing: PacingPolicy,
}

impl ScrapeEngine {
    /// Creates an engine for one query.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTarget`] when `target_count` is zero.
    #[instrument(level = "debug", skip(pacing))]
    pub fn new(
        query: impl Into<String> + std::fmt::Debug,
        mode: SearchMode,
        target_count: u64,
        pacing: PacingPolicy,
    ) -> Result<Self, EngineError> {
        if target_count == 0 {
            return Err(EngineError::InvalidTarget { value: 0 });
        }
        Ok(Self {
            query: query.into(),
            mode,
            target_count,
            pacing,
        })
    }

    /// Returns the configured target count.
    #[must_use]
    pub fn target_count(&self) -> u64 {
        self.target_count
    }

    /// Returns the configured search query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Runs the retrieval loop to one of its terminal conditions.
    ///
    /// Every record produced has been handed to the sink before this
    /// returns, including on failure. Individual fetch rate limits do not
    /// fail the run; any other session or sink failure ends it with
    /// [`StopReason::Failed`] and the partial count.
    #[instrument(skip(self, provider, sink), fields(query = %self.query, target = self.target_count))]
    pub async fn run<P, S>(&self, provider: &P, sink: &mut S) -> ScrapeSummary
    where
        P: SessionProvider + ?Sized,
        S: RecordSink + ?Sized,
    {
        let mut state = RunState::default();
        let mut pages_fetched = 0u32;

        info!("starting collection");

        let stop = loop {
            if state.records_collected >= self.target_count {
                break StopReason::TargetReached;
            }
            if state.cursor.is_exhausted() {
                info!("cursor exhausted");
                break StopReason::SourceExhausted;
            }

            let page = match self.fetch_page(provider, &state.cursor).await {
                Ok(page) => page,
                Err(e) => {
                    error!(error = %e, "page fetch failed");
                    break StopReason::Failed(ScrapeError::Fetch(e));
                }
            };
            pages_fetched += 1;

            if page.items.is_empty() {
                info!("no more tweets found");
                break StopReason::SourceExhausted;
            }

            debug!(items = page.items.len(), "processing page");
            if let Err(e) = Self::write_page(page.items, &mut state, sink) {
                error!(error = %e, "record sink failed");
                break StopReason::Failed(ScrapeError::Sink(e));
            }
            info!(collected = state.records_collected, "collected tweets");

            state.cursor = SearchCursor::advance(page.next);
        };

        let summary = ScrapeSummary {
            records_collected: state.records_collected,
            pages_fetched,
            stop,
        };
        info!(
            collected = summary.records_collected,
            pages = summary.pages_fetched,
            success = summary.stop.is_success(),
            "collection finished"
        );
        summary
    }

    /// Fetches the page addressed by `cursor`, retrying rate limits forever.
    ///
    /// A politeness delay precedes every fetch that continues an existing
    /// result set, including retries after a backoff; the initial fetch is
    /// issued immediately. Rate-limit handling never consumes a cursor
    /// transition: the retried fetch uses the identical cursor.
    async fn fetch_page<P>(
        &self,
        provider: &P,
        cursor: &SearchCursor,
    ) -> Result<Page, FetchError>
    where
        P: SessionProvider + ?Sized,
    {
        loop {
            let attempt = match cursor {
                SearchCursor::Unstarted => {
                    debug!("getting initial tweets");
                    provider.initial_page(&self.query, self.mode).await
                }
                SearchCursor::Active(token) => {
                    self.pacing.politeness_pause().await;
                    provider.next_page(token).await
                }
                // Checked by the caller before fetching.
                SearchCursor::Exhausted => {
                    return Ok(Page {
                        items: Vec::new(),
                        next: None,
                    });
                }
            };

            match attempt {
                Err(FetchError::RateLimited { retry_at }) => {
                    self.pacing.backoff_pause(retry_at).await;
                }
                other => return other,
            }
        }
    }

    /// Normalizes and appends every item of a page, in the order received.
    fn write_page<S>(
        items: Vec<RawTweet>,
        state: &mut RunState,
        sink: &mut S,
    ) -> Result<(), SinkError>
    where
        S: RecordSink + ?Sized,
    {
        for raw in items {
            let sequence_number = state.records_collected + 1;
            let record = TweetRecord::normalize(raw, sequence_number);
            sink.append(&record)?;
            state.records_collected += 1;
        }
        Ok(())
    }
}
