//! Pagination engine for rate-limited tweet retrieval.
//!
//! This module is the heart of the tool: it turns a page-at-a-time search
//! session into a reliable stream of normalized records written incrementally
//! to a sink.
//!
//! # Features
//!
//! - Randomized politeness delay between successive page fetches
//! - Hard backoff against the server-provided reset time on rate limiting
//! - Gapless run-scoped sequence numbers assigned at normalization time
//! - Page-granular stopping (a fetched page is always fully written)
//!
//! # Example
//!
//! ```no_run
//! use tweetgrab_core::scrape::{PacingPolicy, ScrapeEngine};
//! use tweetgrab_core::session::{SearchMode, XSession};
//! use tweetgrab_core::sink::MemorySink;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = XSession::new(std::sync::Arc::new(reqwest::cookie::Jar::default()), None);
//! let engine = ScrapeEngine::new("rustlang", SearchMode::Top, 50, PacingPolicy::default())?;
//! let mut sink = MemorySink::new();
//! let summary = engine.run(&session, &mut sink).await;
//! println!("collected {}", summary.records_collected);
//! # Ok(())
//! # }
//! ```

mod cursor;
mod engine;
mod error;
pub mod pacing;
mod record;

pub use cursor::{PageCursor, SearchCursor};
pub use engine::{DEFAULT_TARGET_COUNT, EngineError, RunState, ScrapeEngine};
pub use error::{ScrapeError, ScrapeSummary, StopReason};
pub use pacing::{PacingError, PacingPolicy, backoff_duration};
pub use record::{RawTweet, TweetRecord, collapse_newlines};
