//! Error types for search session calls.
//!
//! Rate limiting is a value, not control flow: a throttled call returns
//! [`FetchError::RateLimited`] carrying the server-reported reset time, and
//! the retrieval loop pattern-matches on it. Every other variant is fatal
//! to the run - deliberately including authentication failures, so an
//! expired session mid-run stops the run instead of triggering a hidden
//! re-login.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while fetching a search page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server throttled the request (HTTP 429). Recoverable: wait
    /// until `retry_at`, then retry the identical fetch.
    #[error("rate limited until {retry_at}")]
    RateLimited {
        /// Server-reported reset time.
        retry_at: DateTime<Utc>,
    },

    /// Network-level error (DNS resolution, connection refused, TLS, ...).
    #[error("network error calling {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP response other than 429.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be interpreted as a search timeline.
    #[error("could not decode search response: {reason}")]
    Decode {
        /// Description of what was missing or malformed.
        reason: String,
    },

    /// `next_page` was called before any `initial_page` established a
    /// search context.
    #[error("no active search to continue")]
    NoActiveSearch,
}

impl FetchError {
    /// Creates a rate-limited error.
    #[must_use]
    pub fn rate_limited(retry_at: DateTime<Utc>) -> Self {
        Self::RateLimited { retry_at }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Returns `true` for the recoverable rate-limit variant.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

// Note on From trait implementations:
// No blanket `From<reqwest::Error>` - the variants need the request URL for
// context, which the source error does not reliably carry. The helper
// constructors are the intended construction path.
