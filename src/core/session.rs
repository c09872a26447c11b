//! Session refresher: at most one in-flight credential refresh.
//!
//! Arbitrarily many concurrent requests may discover an expired access
//! credential at once. The refresher guarantees exactly one refresh call is
//! made: the first caller registers a shared future as the single pending
//! refresh, every later caller awaits that same future, and the registry is
//! cleared on every completion path. All waiters observe the same outcome,
//! success or failure.
//!
//! A started refresh always runs to completion; there is no cancellation
//! path, so credential state can never be left half-updated.

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::json;

use crate::core::casing::to_internal_case;
use crate::core::credentials::{Credential, CredentialStore};
use crate::error::{ApiError, Result};

/// Navigation collaborator, signalled once per terminal session expiry.
pub trait Navigator: Send + Sync {
    /// Route the user to the login entry point, optionally with a
    /// return-to hint.
    fn to_login(&self, return_to: Option<&str>);
}

/// Navigator that ignores the signal (headless use, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn to_login(&self, _return_to: Option<&str>) {}
}

type SharedRefresh = Shared<BoxFuture<'static, Result<Credential>>>;

/// Coordinates credential refresh across concurrent callers.
#[derive(Clone)]
pub struct SessionRefresher {
    inner: Arc<RefresherInner>,
}

struct RefresherInner {
    http: reqwest::Client,
    refresh_url: String,
    store: Arc<CredentialStore>,
    navigator: Arc<dyn Navigator>,
    /// The single pending refresh; 0 or 1 entries at all times.
    pending: Mutex<Option<SharedRefresh>>,
}

impl SessionRefresher {
    /// Build a refresher posting to `refresh_url` and owning mutation of
    /// `store`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        refresh_url: impl Into<String>,
        store: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                http,
                refresh_url: refresh_url.into(),
                store,
                navigator,
                pending: Mutex::new(None),
            }),
        }
    }

    /// Return a currently valid access credential, refreshing if needed.
    ///
    /// A valid credential returns immediately without suspending. An
    /// invalid one joins (or starts) the single pending refresh.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthorizationExpired`] if no refresh is possible
    /// or the refresh call fails; the credential store has been cleared and
    /// the navigator signalled by the time this surfaces.
    pub async fn ensure_valid_access(&self) -> Result<Credential> {
        if let Some(credential) = self.inner.store.current()
            && credential.access_is_valid()
        {
            return Ok(credential);
        }
        self.refresh_now().await
    }

    /// Force a refresh even if the stored access credential still looks
    /// valid locally (used after a server-side rejection). Joins any
    /// refresh already in flight instead of starting a second one.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::ensure_valid_access`].
    pub async fn refresh_now(&self) -> Result<Credential> {
        let shared = {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = pending.as_ref() {
                tracing::debug!("joining in-flight credential refresh");
                existing.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let fut: SharedRefresh = async move {
                    let result = inner.run_refresh().await;
                    // Clear the registry on every path before waiters resume.
                    inner
                        .pending
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .take();
                    result
                }
                .boxed()
                .shared();
                *pending = Some(fut.clone());
                fut
            }
        };
        shared.await
    }
}

impl std::fmt::Debug for SessionRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("SessionRefresher")
            .field("refresh_url", &self.inner.refresh_url)
            .field("refresh_in_flight", &pending)
            .finish()
    }
}

impl RefresherInner {
    async fn run_refresh(&self) -> Result<Credential> {
        let refresh_token = match self.store.current() {
            Some(c) if c.refresh_is_valid() => c.refresh_token,
            Some(_) => return Err(self.expire_session("refresh credential expired")),
            None => return Err(self.expire_session("no credentials present")),
        };

        tracing::info!("access credential invalid; refreshing session");
        // The refresh credential travels in the request body, never as a
        // bearer header.
        let body = json!({ "refresh_token": refresh_token });
        let response = match self.http.post(&self.refresh_url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => return Err(self.expire_session(&format!("refresh call failed: {e}"))),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(self.expire_session(&format!("refresh rejected with {status}")));
        }

        let raw: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => return Err(self.expire_session(&format!("refresh response unreadable: {e}"))),
        };
        let data = raw.get("data").cloned().unwrap_or(serde_json::Value::Null);
        let credential: Credential = match serde_json::from_value(to_internal_case(data)) {
            Ok(c) => c,
            Err(e) => return Err(self.expire_session(&format!("refresh payload malformed: {e}"))),
        };

        if let Err(e) = self.store.set(credential.clone()) {
            tracing::warn!(error = %e, "refreshed credentials could not be persisted");
        }
        tracing::info!("session refreshed");
        Ok(credential)
    }

    /// Terminal expiry: clear the store, signal navigation, and produce the
    /// error every waiter will observe.
    fn expire_session(&self, reason: &str) -> ApiError {
        tracing::warn!(reason, "session expired; clearing credentials");
        self.store.clear();
        self.navigator.to_login(None);
        ApiError::AuthorizationExpired
    }
}
