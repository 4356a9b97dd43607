//! reqwest-backed search session against the X web API.
//!
//! Authentication rides on the cookie jar (`auth_token` plus friends) with
//! the `ct0` cookie value mirrored into the `x-csrf-token` header, exactly
//! as the web client does. The session remembers the query of the last
//! `initial_page` call so continuation fetches can re-send it alongside the
//! cursor, which is how the search endpoint paginates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::constants;
use super::error::FetchError;
use super::wire;
use super::{Page, PageCursor, SearchMode, SessionProvider};
use crate::auth::CookieStore;

/// Connect timeout for API calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall request timeout for API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Query and ordering of the search currently being paginated.
#[derive(Debug, Clone)]
struct SearchContext {
    query: String,
    mode: SearchMode,
}

/// Cookie-authenticated session against the x.com search timeline.
///
/// Create it once and reuse it for the whole run; the underlying reqwest
/// client pools connections.
#[derive(Debug)]
pub struct XSession {
    client: Client,
    base: Url,
    /// Set by `initial_page`, read by `next_page`. Guarded by an async
    /// mutex so the session stays shareable across tasks even though the
    /// engine only ever uses it sequentially.
    context: Mutex<Option<SearchContext>>,
}

impl XSession {
    /// Creates a session from a cookie jar and the matching CSRF token
    /// (the value of the `ct0` cookie, when present).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(cookie_jar: Arc<Jar>, csrf_token: Option<&str>) -> Self {
        let base = Url::parse("https://x.com").expect("static base URL is valid");
        Self::with_base_url(cookie_jar, csrf_token, base)
    }

    /// Creates a session pointed at an explicit base URL.
    ///
    /// Used by integration tests to target a local mock server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_base_url(cookie_jar: Arc<Jar>, csrf_token: Option<&str>, base: Url) -> Self {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", constants::BEARER_TOKEN);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).expect("bearer token is valid header value"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT));
        headers.insert("x-twitter-active-user", HeaderValue::from_static("yes"));
        headers.insert(
            "x-twitter-client-language",
            HeaderValue::from_static("en"),
        );
        if let Some(token) = csrf_token {
            if let Ok(value) = HeaderValue::from_str(token) {
                headers.insert("x-csrf-token", value);
            }
        }

        let client = Client::builder()
            .cookie_provider(cookie_jar)
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");

        Self {
            client,
            base,
            context: Mutex::new(None),
        }
    }

    /// Creates a session from a persisted cookie store, mirroring its
    /// `ct0` cookie into the CSRF header.
    #[must_use]
    pub fn from_cookie_store(store: &CookieStore) -> Self {
        Self::new(store.to_jar(), store.get("ct0"))
    }

    /// Issues one `SearchTimeline` call.
    #[instrument(level = "debug", skip(self), fields(has_cursor = cursor.is_some()))]
    async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        cursor: Option<&PageCursor>,
    ) -> Result<Page, FetchError> {
        let url = self
            .base
            .join(&format!(
                "/i/api/graphql/{}/SearchTimeline",
                constants::SEARCH_TIMELINE_QUERY_ID
            ))
            .map_err(|e| FetchError::decode(format!("invalid search URL: {e}")))?;

        let mut variables = json!({
            "rawQuery": query,
            "count": constants::PAGE_SIZE,
            "querySource": "typed_query",
            "product": mode.as_product(),
        });
        if let Some(cursor) = cursor {
            variables["cursor"] = Value::String(cursor.as_str().to_string());
        }

        let response = self
            .client
            .get(url.clone())
            .query(&[
                ("variables", variables.to_string().as_str()),
                ("features", constants::SEARCH_FEATURES),
            ])
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_at = wire::rate_limit_reset(response.headers());
            debug!(%retry_at, "search throttled");
            return Err(FetchError::rate_limited(retry_at));
        }
        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::decode(format!("response body is not JSON: {e}")))?;
        wire::parse_search_page(&body)
    }
}

#[async_trait]
impl SessionProvider for XSession {
    #[instrument(level = "debug", skip(self))]
    async fn initial_page(&self, query: &str, mode: SearchMode) -> Result<Page, FetchError> {
        let page = self.search(query, mode, None).await?;
        *self.context.lock().await = Some(SearchContext {
            query: query.to_string(),
            mode,
        });
        Ok(page)
    }

    #[instrument(level = "debug", skip(self, cursor))]
    async fn next_page(&self, cursor: &PageCursor) -> Result<Page, FetchError> {
        let context = self
            .context
            .lock()
            .await
            .clone()
            .ok_or(FetchError::NoActiveSearch)?;
        self.search(&context.query, context.mode, Some(cursor)).await
    }
}
