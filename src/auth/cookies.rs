//! JSON cookie file load/save and reqwest jar conversion.
//!
//! The file is a plain JSON array of cookie objects, written after a
//! successful login and read on later runs to rebuild the authenticated
//! session without logging in again.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use reqwest::Url;
use reqwest::cookie::Jar;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// A single persisted cookie.
///
/// The value field is intentionally redacted in Debug output to prevent
/// accidental logging of sensitive session tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value (sensitive - never log).
    value: String,
    /// The domain the cookie belongs to (e.g. `.x.com`).
    pub domain: String,
    /// The URL path scope for the cookie.
    pub path: String,
    /// Whether the cookie should only be sent over HTTPS.
    #[serde(default)]
    pub secure: bool,
}

impl StoredCookie {
    /// Creates a new cookie entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
        secure: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
            secure,
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive - avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for StoredCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .finish()
    }
}

/// Errors that can occur while loading or saving the cookie file.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// I/O error reading or writing the cookie file.
    #[error("failed to access cookie file: {0}")]
    Io(#[from] std::io::Error),

    /// The cookie file is not valid JSON of the expected shape.
    #[error("cookie file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The file parsed but contains no cookies.
    #[error("cookie file contains no cookies")]
    Empty,
}

/// An ordered set of persisted session cookies.
#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    cookies: Vec<StoredCookie>,
}

impl CookieStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a cookie, replacing any prior cookie of the same name.
    pub fn upsert(&mut self, cookie: StoredCookie) {
        if let Some(existing) = self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }

    /// Returns the value of the named cookie, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(StoredCookie::value)
    }

    /// Returns the number of cookies in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns `true` when the store holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Loads a store from a JSON cookie file.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError::Io`] when the file cannot be read (a missing
    /// file surfaces as `NotFound`), [`CookieError::Malformed`] on bad
    /// JSON, or [`CookieError::Empty`] when the file holds zero cookies.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CookieError> {
        let data = fs::read_to_string(path.as_ref())?;
        let cookies: Vec<StoredCookie> = serde_json::from_str(&data)?;
        if cookies.is_empty() {
            return Err(CookieError::Empty);
        }
        debug!(cookies = cookies.len(), "loaded cookie file");
        Ok(Self { cookies })
    }

    /// Saves the store to a JSON cookie file, replacing any prior content.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError::Io`] on write failure.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CookieError> {
        let data = serde_json::to_string_pretty(&self.cookies)?;
        fs::write(path.as_ref(), data)?;
        debug!(cookies = self.cookies.len(), "saved cookie file");
        Ok(())
    }

    /// Builds a reqwest cookie jar holding every cookie in the store.
    ///
    /// Cookies with an unusable domain are skipped with a warning rather
    /// than failing the whole session.
    #[must_use]
    pub fn to_jar(&self) -> Arc<Jar> {
        let jar = Jar::default();
        for cookie in &self.cookies {
            let host = cookie.domain.trim_start_matches('.');
            let Ok(url) = Url::parse(&format!("https://{host}/")) else {
                warn!(name = %cookie.name, domain = %cookie.domain, "skipping cookie with unusable domain");
                continue;
            };
            let mut header = format!(
                "{}={}; Domain={}; Path={}",
                cookie.name, cookie.value, cookie.domain, cookie.path
            );
            if cookie.secure {
                header.push_str("; Secure");
            }
            jar.add_cookie_str(&header, &url);
        }
        Arc::new(jar)
    }
}
