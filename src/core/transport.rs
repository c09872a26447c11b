//! Transport client: the single choke point for every outgoing call.
//!
//! Each request runs through a fixed pipeline:
//!
//! 1. **pre-request** - body transformed to wire casing; unless the call is
//!    public, a valid access credential is obtained (refreshing if needed)
//!    and attached as a bearer header;
//! 2. **post-response** - the success envelope `{ success, data, message? }`
//!    is unwrapped, `data` transformed back to internal casing, and
//!    deserialized into the caller's type;
//! 3. **on-error** - a 401 on an authenticated call triggers one refresh and
//!    one retry of the original request; a second rejection clears the
//!    credential store, signals navigation, and surfaces
//!    [`ApiError::AuthorizationExpired`]. Every other error status is mapped
//!    into the common error shape and propagated, never swallowed.
//!
//! Public calls skip all credential logic but keep both payload transforms.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::casing::{to_internal_case, to_wire_case};
use crate::core::credentials::CredentialStore;
use crate::core::session::{Navigator, SessionRefresher};
use crate::error::{ApiError, Result};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a configured HTTP client.
///
/// Timeouts surface as [`ApiError::Timeout`] and are treated as ordinary
/// network failures, never retried here.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("emasgo-client/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ApiError::Network {
            message: e.to_string(),
        })
}

/// Whether a call attaches (and if needed refreshes) the access credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach a bearer credential, refreshing transparently.
    Required,
    /// Unauthenticated endpoint; no credential attached, no refresh
    /// triggered.
    Public,
}

/// Authenticated HTTP client for the EmasGo API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionRefresher,
    store: Arc<CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Build a client rooted at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        session: SessionRefresher,
        store: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
            store,
            navigator,
        }
    }

    /// Authenticated GET.
    ///
    /// # Errors
    ///
    /// Propagates transport, session, and remote errors per the module
    /// contract.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None, Auth::Required).await
    }

    /// Public GET (no credential attached).
    ///
    /// # Errors
    ///
    /// Propagates transport and remote errors.
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None, Auth::Public).await
    }

    /// Authenticated POST with a JSON body.
    ///
    /// # Errors
    ///
    /// Propagates transport, session, and remote errors.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(serde_json::to_value(body)?), Auth::Required)
            .await
    }

    /// Public POST with a JSON body (login, register).
    ///
    /// # Errors
    ///
    /// Propagates transport and remote errors.
    pub async fn post_public<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(serde_json::to_value(body)?), Auth::Public)
            .await
    }

    /// Authenticated POST with a body, discarding any response data.
    ///
    /// # Errors
    ///
    /// Propagates transport, session, and remote errors.
    pub async fn post_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<()> {
        self.request::<Value>(Method::POST, path, Some(serde_json::to_value(body)?), Auth::Required)
            .await
            .map(|_| ())
    }

    /// Authenticated bodyless POST (logout and similar actions).
    ///
    /// # Errors
    ///
    /// Propagates transport, session, and remote errors.
    pub async fn post_action(&self, path: &str) -> Result<()> {
        self.request::<Value>(Method::POST, path, None, Auth::Required)
            .await
            .map(|_| ())
    }

    /// Authenticated PATCH with a JSON body.
    ///
    /// # Errors
    ///
    /// Propagates transport, session, and remote errors.
    pub async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PATCH, path, Some(serde_json::to_value(body)?), Auth::Required)
            .await
    }

    /// Authenticated PUT with a JSON body.
    ///
    /// # Errors
    ///
    /// Propagates transport, session, and remote errors.
    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PUT, path, Some(serde_json::to_value(body)?), Auth::Required)
            .await
    }

    /// Authenticated DELETE, discarding any response data.
    ///
    /// # Errors
    ///
    /// Propagates transport, session, and remote errors.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request::<Value>(Method::DELETE, path, None, Auth::Required)
            .await
            .map(|_| ())
    }

    /// Run one request through the full pipeline.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> Result<T> {
        // Pre-request: wire casing for the outgoing body, once.
        let wire_body = body.map(to_wire_case);
        let url = format!("{}{}", self.base_url, path);
        let mut retried = false;

        loop {
            let mut request = self.http.request(method.clone(), &url);
            if auth == Auth::Required {
                let credential = self.session.ensure_valid_access().await?;
                request = request.bearer_auth(&credential.access_token);
            }
            if let Some(wire_body) = &wire_body {
                request = request.json(wire_body);
            }

            tracing::debug!(%method, %url, "sending request");
            let response = request.send().await.map_err(ApiError::from)?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && auth == Auth::Required {
                if retried {
                    // Rejected again after a fresh credential: terminal.
                    tracing::warn!(%url, "credential rejected after refresh; expiring session");
                    self.store.clear();
                    self.navigator.to_login(None);
                    return Err(ApiError::AuthorizationExpired);
                }
                retried = true;
                tracing::debug!(%url, "credential rejected; refreshing and retrying once");
                self.session.refresh_now().await?;
                continue;
            }

            if !status.is_success() {
                return Err(map_error_response(status, response).await);
            }

            // Post-response: unwrap envelope, restore internal casing.
            let raw: Value = response.json().await.map_err(ApiError::from)?;
            return parse_envelope(raw);
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Unwrap a success envelope and deserialize its `data` field.
fn parse_envelope<T: DeserializeOwned>(raw: Value) -> Result<T> {
    let success = raw
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !success {
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        return Err(ApiError::Api {
            status: 200,
            message,
        });
    }
    let data = raw.get("data").cloned().unwrap_or(Value::Null);
    serde_json::from_value(to_internal_case(data)).map_err(Into::into)
}

/// Map an error status into the common error shape.
///
/// The error envelope is `{ success: false, message, errors? }`; field names
/// inside `errors` arrive in wire casing and are transformed like any other
/// payload.
async fn map_error_response(status: StatusCode, response: reqwest::Response) -> ApiError {
    let raw: Option<Value> = response.json().await.ok();
    let message = raw
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();
    let errors = raw
        .as_ref()
        .and_then(|v| v.get("errors"))
        .filter(|v| v.is_object())
        .map(|v| to_internal_case(v.clone()))
        .and_then(|v| serde_json::from_value(v).ok());

    if errors.is_some() || status == StatusCode::UNPROCESSABLE_ENTITY {
        ApiError::Validation { message, errors }
    } else {
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
