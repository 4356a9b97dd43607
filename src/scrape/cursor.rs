//! Pagination cursor state machine.
//!
//! A [`SearchCursor`] records where in the paginated result set the run is.
//! It is owned exclusively by the engine and replaced (never mutated) on
//! every successful page fetch.

use std::fmt;

/// Opaque continuation token returned by the session for the next page.
///
/// The engine never inspects the token; it only hands it back to the
/// session on the next fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wraps a raw continuation token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for the session implementation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the run is within the paginated result set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchCursor {
    /// No page fetched yet; the next call must request the first page.
    #[default]
    Unstarted,
    /// A continuation token capable of producing the next page.
    Active(PageCursor),
    /// The source reported no further pages.
    Exhausted,
}

impl SearchCursor {
    /// Builds the successor cursor from the continuation token of a
    /// fetched page (`None` marks exhaustion).
    #[must_use]
    pub fn advance(next: Option<PageCursor>) -> Self {
        match next {
            Some(cursor) => Self::Active(cursor),
            None => Self::Exhausted,
        }
    }

    /// Returns `true` when no further pages can be fetched.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}
