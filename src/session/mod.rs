//! Authenticated search session for paginated tweet retrieval.
//!
//! The engine only depends on the [`SessionProvider`] trait: a "first page"
//! search call and a "next page" call on a prior continuation token. The
//! production implementation is [`XSession`], which talks to the X web API
//! (GraphQL `SearchTimeline`) with a cookie-authenticated reqwest client;
//! [`login`] bootstraps those cookies from credentials when no saved session
//! exists.

mod api;
mod constants;
mod error;
pub mod login;
mod wire;

pub use api::XSession;
pub use error::FetchError;
pub use login::{LoginError, login};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

pub use crate::scrape::PageCursor;
use crate::scrape::RawTweet;

/// One batch of items returned by a single paginated fetch call, plus the
/// continuation token for the page after it (`None` marks exhaustion).
#[derive(Debug, Clone)]
pub struct Page {
    /// Items in the order the source returned them.
    pub items: Vec<RawTweet>,
    /// Continuation token for the next page, if any.
    pub next: Option<PageCursor>,
}

/// Result ordering requested from the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Most-relevant ordering.
    #[default]
    Top,
    /// Most-recent ordering.
    Latest,
}

impl SearchMode {
    /// Returns the wire value for the `product` request variable.
    #[must_use]
    pub fn as_product(&self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::Latest => "Latest",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_product())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "latest" => Ok(Self::Latest),
            _ => Err(format!("invalid search mode '{s}' (expected top or latest)")),
        }
    }
}

/// An authenticated handle capable of issuing paginated search calls.
///
/// Implementations must be cheap to call repeatedly; the engine issues one
/// call per page, strictly sequentially.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Fetches the first page for a query.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RateLimited`] when throttled (the caller is
    /// expected to wait and retry), or another variant on fatal failure.
    async fn initial_page(&self, query: &str, mode: SearchMode) -> Result<Page, FetchError>;

    /// Fetches the page after a prior continuation token.
    ///
    /// # Errors
    ///
    /// Same contract as [`initial_page`](Self::initial_page).
    async fn next_page(&self, cursor: &PageCursor) -> Result<Page, FetchError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_default_is_top() {
        assert_eq!(SearchMode::default(), SearchMode::Top);
    }

    #[test]
    fn test_search_mode_product_values() {
        assert_eq!(SearchMode::Top.as_product(), "Top");
        assert_eq!(SearchMode::Latest.as_product(), "Latest");
    }

    #[test]
    fn test_search_mode_from_str_case_insensitive() {
        assert_eq!("top".parse::<SearchMode>().unwrap(), SearchMode::Top);
        assert_eq!("Latest".parse::<SearchMode>().unwrap(), SearchMode::Latest);
        assert_eq!("TOP".parse::<SearchMode>().unwrap(), SearchMode::Top);
    }

    #[test]
    fn test_search_mode_from_str_invalid() {
        let err = "newest".parse::<SearchMode>().unwrap_err();
        assert!(err.contains("newest"));
    }

    #[test]
    fn test_search_mode_display_roundtrip() {
        assert_eq!(SearchMode::Latest.to_string(), "Latest");
    }
}
