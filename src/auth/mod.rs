//! Session cookie persistence.
//!
//! A successful login is saved to a JSON cookie file so later runs can
//! skip the credential flow entirely and build the session straight from
//! the stored cookies.

mod cookies;

pub use cookies::{CookieError, CookieStore, StoredCookie};
