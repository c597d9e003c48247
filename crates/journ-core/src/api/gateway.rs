//! Authenticated request gateway.
//!
//! Every request made on behalf of the signed-in user goes through
//! [`Gateway`]. It attaches the current bearer token on the way out, and on
//! the way back it turns a 401 into a login redirect before handing the
//! error to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;

use super::navigation::{Navigator, Route};
use super::ApiError;

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// What a 401 does to the stored session besides redirecting to login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthorizedPolicy {
    /// Redirect only; the stored token is left in place
    #[default]
    RedirectOnly,
    /// Sign out, then redirect
    ClearSession,
}

#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub unauthorized_policy: UnauthorizedPolicy,
    /// Reject responses to requests issued before the session last changed
    pub reject_stale: bool,
    pub max_rate_limit_retries: u32,
    pub initial_backoff: Duration,
}

impl GatewayOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            unauthorized_policy: UnauthorizedPolicy::default(),
            reject_stale: true,
            max_rate_limit_retries: MAX_RATE_LIMIT_RETRIES,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }
}

/// Which credential a request carries, and whether the interceptors apply.
#[derive(Clone, Copy)]
enum Credential<'a> {
    /// Token from the session store; 401 and stale handling apply
    Session,
    /// No token and no interception, like a plain fetch
    Public,
    /// An explicit token, with no interception
    Bearer(&'a str),
}

/// What the store looked like when a request was issued
struct Ticket {
    token: Option<String>,
    generation: u64,
}

/// Clone is cheap - reqwest::Client and the store are both Arc inside.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    unauthorized_policy: UnauthorizedPolicy,
    reject_stale: bool,
    max_rate_limit_retries: u32,
    initial_backoff: Duration,
}

impl Gateway {
    pub fn new(
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        options: GatewayOptions,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(options.timeout).build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            store,
            navigator,
            unauthorized_policy: options.unauthorized_policy,
            reject_stale: options.reject_stale,
            max_rate_limit_retries: options.max_rate_limit_retries,
            initial_backoff: options.initial_backoff,
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn navigate(&self, route: Route) {
        self.navigator.replace(route);
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ===== Authenticated requests =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::GET, path, None, Credential::Session)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, Some(body), Credential::Session)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, Some(body), Credential::Session)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::DELETE, path, None, Credential::Session)
            .await
    }

    // ===== Requests outside the session =====

    /// POST without the stored token and without 401 handling. Used for
    /// login and signup, where a 401 means bad credentials, not expiry.
    pub async fn post_public<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, Some(body), Credential::Public)
            .await
    }

    /// GET with an explicit token instead of the session's, without 401 handling
    pub async fn get_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::GET, path, None, Credential::Bearer(token))
            .await
    }

    fn ticket(&self, credential: Credential<'_>) -> Ticket {
        match credential {
            Credential::Session => {
                let snapshot = self.store.snapshot();
                Ticket {
                    token: snapshot.access_token().map(str::to_string),
                    generation: snapshot.generation,
                }
            }
            Credential::Public => Ticket {
                token: None,
                generation: 0,
            },
            Credential::Bearer(token) => Ticket {
                token: Some(token.to_string()),
                generation: 0,
            },
        }
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        credential: Credential<'_>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let intercept = matches!(credential, Credential::Session);
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let ticket = self.ticket(credential);

            let mut request = self
                .client
                .request(method.clone(), &url)
                .header(header::ACCEPT, "application/json");
            if let Some(ref token) = ticket.token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(%method, url = %url, authenticated = ticket.token.is_some(), "Sending request");
            let response = request.send().await?;
            let status = response.status();
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) if status.is_success() => return Err(e.into()),
                Err(_) => String::new(),
            };

            // Checked after the whole body arrived, so a session change during the read counts
            if intercept && self.is_stale(&ticket) {
                debug!(%method, url = %url, %status, "Discarding response from before a session change");
                return Err(ApiError::SessionChanged);
            }

            if status.is_success() {
                return serde_json::from_str(&text).map_err(|e| {
                    ApiError::InvalidResponse(format!("{} {}: {}", method, url, e))
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > self.max_rate_limit_retries {
                    return Err(ApiError::RateLimited);
                }
                warn!(url = %url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                tokio::time::sleep(backoff).await;
                backoff *= 2; // Exponential backoff
                continue;
            }

            let error = ApiError::from_status(status, &text);
            if intercept && status == StatusCode::UNAUTHORIZED {
                self.handle_unauthorized(&ticket).await?;
            } else {
                debug!(%method, url = %url, %status, "Request failed");
            }
            return Err(error);
        }
    }

    fn is_stale(&self, ticket: &Ticket) -> bool {
        self.reject_stale && self.store.generation() != ticket.generation
    }

    /// Apply the 401 policy, then redirect. A session that changed since the
    /// request was issued is left alone and reported as `SessionChanged`.
    async fn handle_unauthorized(&self, ticket: &Ticket) -> Result<(), ApiError> {
        let current = match (self.unauthorized_policy, self.reject_stale) {
            (UnauthorizedPolicy::ClearSession, true) => {
                self.store.sign_out_if_current(ticket.generation).await
            }
            (UnauthorizedPolicy::ClearSession, false) => {
                self.store.sign_out().await;
                true
            }
            (UnauthorizedPolicy::RedirectOnly, _) => !self.is_stale(ticket),
        };
        if !current {
            debug!("Session changed before the 401 was handled");
            return Err(ApiError::SessionChanged);
        }

        warn!(policy = ?self.unauthorized_policy, "Request unauthorized, redirecting to login");
        self.navigate(Route::Login);
        Ok(())
    }
}
