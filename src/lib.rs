//! Tweetgrab Core Library
//!
//! This library provides the core functionality for the tweetgrab tool,
//! which collects tweets matching a search query from an authenticated
//! session and appends them incrementally to a CSV file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`scrape`] - Pagination engine with politeness pacing and rate-limit backoff
//! - [`session`] - Authenticated search session (trait + X web API implementation)
//! - [`sink`] - Append-only record sinks (CSV, in-memory)
//! - [`auth`] - Cookie store persistence for session reuse
//! - [`config`] - Credentials config file loading

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod scrape;
pub mod session;
pub mod sink;

// Re-export commonly used types
pub use auth::CookieStore;
pub use config::{Config, Credentials};
pub use scrape::{
    DEFAULT_TARGET_COUNT, PacingPolicy, RawTweet, ScrapeEngine, ScrapeError, ScrapeSummary,
    SearchCursor, StopReason, TweetRecord,
};
pub use session::{FetchError, Page, PageCursor, SearchMode, SessionProvider, XSession};
pub use sink::{CsvSink, MemorySink, RecordSink, SinkError};
