//! Credential login against the X onboarding flow.
//!
//! Used only when no saved cookie store exists. The flow is the one the
//! web client walks: activate a guest token, start the `login` flow, then
//! answer each subtask (JS instrumentation, user identifier, optional
//! alternate identifier, password, duplication check) until the server
//! reports success. Cookies set along the way - `auth_token` and `ct0` in
//! particular - are captured into a [`CookieStore`] for persistence.
//!
//! Login happens once, before the retrieval loop starts. A session that
//! expires mid-run is a fatal error there, never a re-login.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, SET_COOKIE, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::constants;
use crate::auth::{CookieStore, StoredCookie};
use crate::config::Credentials;

/// Hard cap on flow steps; the normal flow takes five or six.
const MAX_FLOW_STEPS: usize = 10;

/// Errors that can occur during credential login.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Network-level error talking to the login endpoints.
    #[error("network error calling {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP response from a login endpoint.
    #[error("HTTP {status} from {url} during login")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The account is locked and must be unlocked in a browser.
    #[error("account is locked; unlock it at https://x.com/account/access")]
    AccountLocked,

    /// The server rejected the login attempt.
    #[error("login denied: {reason}")]
    Denied {
        /// Server-side reason, as far as it can be determined.
        reason: String,
    },

    /// The flow returned something this client does not know how to
    /// answer.
    #[error("login flow error: {reason}")]
    Flow {
        /// Description of the unexpected flow state.
        reason: String,
    },
}

impl LoginError {
    fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    fn flow(reason: impl Into<String>) -> Self {
        Self::Flow {
            reason: reason.into(),
        }
    }
}

/// Logs in with credentials and returns the captured session cookies.
///
/// # Errors
///
/// Returns a [`LoginError`] when any flow step fails; no partial session
/// is usable in that case.
#[instrument(skip(credentials), fields(username = %credentials.username))]
pub async fn login(credentials: &Credentials) -> Result<CookieStore, LoginError> {
    #[allow(clippy::expect_used)]
    let base = Url::parse("https://api.x.com").expect("static base URL is valid");
    login_with_base_url(credentials, base).await
}

/// Logs in against an explicit base URL (integration tests use a mock
/// server here).
///
/// # Errors
///
/// Same contract as [`login`].
pub async fn login_with_base_url(
    credentials: &Credentials,
    base: Url,
) -> Result<CookieStore, LoginError> {
    let mut flow = LoginFlow::start(base).await?;

    for _ in 0..MAX_FLOW_STEPS {
        let Some(subtask) = flow.current_subtask() else {
            break; // No further subtasks: the flow is complete.
        };
        debug!(subtask = %subtask, "answering login subtask");

        let answer = match subtask.as_str() {
            "LoginJsInstrumentationSubtask" => json!({
                "subtask_id": subtask,
                "js_instrumentation": { "response": "{}", "link": "next_link" }
            }),
            "LoginEnterUserIdentifierSSO" => json!({
                "subtask_id": subtask,
                "settings_list": {
                    "setting_responses": [{
                        "key": "user_identifier",
                        "response_data": {
                            "text_data": { "result": credentials.username }
                        }
                    }],
                    "link": "next_link"
                }
            }),
            // Asked when the username alone is ambiguous or suspicious.
            "LoginEnterAlternateIdentifierSubtask" => json!({
                "subtask_id": subtask,
                "enter_text": { "text": credentials.email, "link": "next_link" }
            }),
            "LoginEnterPassword" => json!({
                "subtask_id": subtask,
                "enter_password": {
                    "password": credentials.password,
                    "link": "next_link"
                }
            }),
            "AccountDuplicationCheck" => json!({
                "subtask_id": subtask,
                "check_logged_in_account": {
                    "link": "AccountDuplicationCheck_false"
                }
            }),
            "LoginSuccessSubtask" => break,
            "LoginAcid" => {
                return Err(LoginError::Denied {
                    reason: "a confirmation code was sent to the account email".to_string(),
                });
            }
            "AccessTaskSubtask" | "ArkoseLogin" => return Err(LoginError::AccountLocked),
            "DenyLoginSubtask" => {
                return Err(LoginError::Denied {
                    reason: "the server denied this login attempt".to_string(),
                });
            }
            other => {
                return Err(LoginError::flow(format!("unhandled login subtask {other}")));
            }
        };

        flow.submit(answer).await?;
    }

    let store = flow.finish()?;
    info!(cookies = store.len(), "login completed");
    Ok(store)
}

/// One in-progress walk through the onboarding flow.
struct LoginFlow {
    client: Client,
    base: Url,
    guest_token: String,
    flow_token: String,
    subtasks: Vec<String>,
    store: CookieStore,
}

impl LoginFlow {
    /// Activates a guest token and issues the flow-start call.
    async fn start(base: Url) -> Result<Self, LoginError> {
        let client = build_flow_client()?;
        let guest_token = activate_guest_token(&client, &base).await?;

        let mut flow = Self {
            client,
            base,
            guest_token,
            flow_token: String::new(),
            subtasks: Vec::new(),
            store: CookieStore::new(),
        };

        let url = flow.task_url(Some("login"))?;
        let body = json!({
            "input_flow_data": {
                "flow_context": {
                    "debug_overrides": {},
                    "start_location": { "location": "splash_screen" }
                }
            },
            "subtask_versions": {}
        });
        flow.post_task(&url, &body).await?;
        Ok(flow)
    }

    /// Returns the subtask the server expects an answer to next.
    fn current_subtask(&self) -> Option<String> {
        self.subtasks.first().cloned()
    }

    /// Submits one subtask answer.
    async fn submit(&mut self, answer: Value) -> Result<(), LoginError> {
        let url = self.task_url(None)?;
        let body = json!({
            "flow_token": self.flow_token,
            "subtask_inputs": [answer]
        });
        self.post_task(&url, &body).await
    }

    /// Validates the completed flow and hands back the captured cookies.
    fn finish(self) -> Result<CookieStore, LoginError> {
        if self.store.get("auth_token").is_none() {
            return Err(LoginError::flow(
                "login flow completed without an auth_token cookie",
            ));
        }
        Ok(self.store)
    }

    fn task_url(&self, flow_name: Option<&str>) -> Result<Url, LoginError> {
        let mut url = self
            .base
            .join("/1.1/onboarding/task.json")
            .map_err(|e| LoginError::flow(format!("invalid task URL: {e}")))?;
        if let Some(name) = flow_name {
            url.query_pairs_mut().append_pair("flow_name", name);
        }
        Ok(url)
    }

    /// Posts to `task.json` and folds the response into the flow state.
    async fn post_task(&mut self, url: &Url, body: &Value) -> Result<(), LoginError> {
        let mut request = self
            .client
            .post(url.clone())
            .header("x-guest-token", &self.guest_token)
            .json(body);
        if let Some(ct0) = self.store.get("ct0") {
            request = request.header("x-csrf-token", ct0);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LoginError::network(url.as_str(), e))?;

        record_set_cookies(&mut self.store, response.headers());

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            // The flow answers 403 when it wants the account unlocked.
            return Err(LoginError::AccountLocked);
        }
        if !status.is_success() {
            return Err(LoginError::HttpStatus {
                url: url.as_str().to_string(),
                status: status.as_u16(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| LoginError::flow(format!("task response is not JSON: {e}")))?;

        self.flow_token = payload
            .get("flow_token")
            .and_then(Value::as_str)
            .ok_or_else(|| LoginError::flow("task response has no flow_token"))?
            .to_string();
        self.subtasks = subtask_ids(&payload);
        Ok(())
    }
}

/// Builds the client used only for the login flow. Cookie handling is on
/// so intermediate flow cookies (e.g. `att`) ride along automatically.
fn build_flow_client() -> Result<Client, LoginError> {
    let mut headers = HeaderMap::new();
    let bearer = format!("Bearer {}", constants::BEARER_TOKEN);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&bearer)
            .map_err(|e| LoginError::flow(format!("invalid bearer header: {e}")))?,
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT));

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .map_err(|e| LoginError::flow(format!("failed to build login client: {e}")))
}

/// Fetches a guest token for the pre-authentication flow calls.
async fn activate_guest_token(client: &Client, base: &Url) -> Result<String, LoginError> {
    let url = base
        .join("/1.1/guest/activate.json")
        .map_err(|e| LoginError::flow(format!("invalid activate URL: {e}")))?;

    let response = client
        .post(url.clone())
        .send()
        .await
        .map_err(|e| LoginError::network(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoginError::HttpStatus {
            url: url.as_str().to_string(),
            status: status.as_u16(),
        });
    }

    let payload: Value = response
        .json()
        .await
        .map_err(|e| LoginError::flow(format!("activate response is not JSON: {e}")))?;
    payload
        .get("guest_token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LoginError::flow("activate response has no guest_token"))
}

/// Extracts the pending subtask ids from a task response.
fn subtask_ids(payload: &Value) -> Vec<String> {
    payload
        .get("subtasks")
        .and_then(Value::as_array)
        .map(|subtasks| {
            subtasks
                .iter()
                .filter_map(|s| s.get("subtask_id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Records every `Set-Cookie` header of a response into the store.
fn record_set_cookies(store: &mut CookieStore, headers: &HeaderMap) {
    for value in headers.get_all(SET_COOKIE) {
        let Ok(raw) = value.to_str() else {
            warn!("skipping non-UTF8 Set-Cookie header");
            continue;
        };
        match parse_set_cookie(raw) {
            Some(cookie) => store.upsert(cookie),
            None => warn!("skipping unparseable Set-Cookie header"),
        }
    }
}

/// Parses one `Set-Cookie` header value into a [`StoredCookie`].
///
/// Only the attributes the store persists are read; everything else
/// (Expires, SameSite, ...) is ignored.
fn parse_set_cookie(raw: &str) -> Option<StoredCookie> {
    let mut parts = raw.split(';');

    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut domain = ".x.com".to_string();
    let mut path = "/".to_string();
    let mut secure = false;
    for part in parts {
        let part = part.trim();
        if let Some((key, attr)) = part.split_once('=') {
            match key.trim().to_ascii_lowercase().as_str() {
                "domain" => domain = attr.trim().to_string(),
                "path" => path = attr.trim().to_string(),
                _ => {}
            }
        } else if part.eq_ignore_ascii_case("secure") {
            secure = true;
        }
    }

    Some(StoredCookie::new(
        name,
        value.trim(),
        domain,
        path,
        secure,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_cookie_full_attributes() {
        let cookie = parse_set_cookie(
            "auth_token=abc123; Domain=.x.com; Path=/; Secure; HttpOnly; SameSite=None",
        )
        .unwrap();
        assert_eq!(cookie.name, "auth_token");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.domain, ".x.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
    }

    #[test]
    fn test_parse_set_cookie_minimal() {
        let cookie = parse_set_cookie("ct0=deadbeef").unwrap();
        assert_eq!(cookie.name, "ct0");
        assert_eq!(cookie.value(), "deadbeef");
        assert_eq!(cookie.domain, ".x.com");
        assert_eq!(cookie.path, "/");
        assert!(!cookie.secure);
    }

    #[test]
    fn test_parse_set_cookie_no_pair_is_none() {
        assert!(parse_set_cookie("garbage").is_none());
        assert!(parse_set_cookie("=value").is_none());
    }

    #[test]
    fn test_subtask_ids_extracts_in_order() {
        let payload = serde_json::json!({
            "flow_token": "t1",
            "subtasks": [
                { "subtask_id": "LoginJsInstrumentationSubtask" },
                { "subtask_id": "LoginEnterUserIdentifierSSO" }
            ]
        });
        assert_eq!(
            subtask_ids(&payload),
            vec![
                "LoginJsInstrumentationSubtask".to_string(),
                "LoginEnterUserIdentifierSSO".to_string()
            ]
        );
    }

    #[test]
    fn test_subtask_ids_missing_is_empty() {
        assert!(subtask_ids(&serde_json::json!({ "flow_token": "t" })).is_empty());
    }

    #[test]
    fn test_login_error_account_locked_display() {
        let msg = LoginError::AccountLocked.to_string();
        assert!(msg.contains("x.com/account/access"), "got: {msg}");
    }
}
