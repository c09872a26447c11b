//! Credential pair storage with defined expiry semantics.
//!
//! The [`CredentialStore`] is the single owner of the access/refresh token
//! pair. Only the session refresher and explicit login/logout mutate it;
//! every other component reads through its public operations. The pair is
//! persisted through the key/value collaborator so a session survives
//! process restarts.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::KvStore;

/// Storage key for the persisted credential pair.
const CREDENTIALS_KEY: &str = "auth.credentials";

/// Safety margin before nominal expiry. A token this close to expiring is
/// treated as expired so it cannot be rejected mid-flight by clock skew.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Access/refresh credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Short-lived token attached as a bearer header.
    pub access_token: String,
    /// Longer-lived token used solely to obtain a new access token.
    /// Never attached to an authorization header.
    pub refresh_token: String,
    /// Expiry of the access token.
    pub access_expires_at: DateTime<Utc>,
    /// Expiry of the refresh token.
    pub refresh_expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the access token can still be attached to a request.
    #[must_use]
    pub fn access_is_valid(&self) -> bool {
        !self.access_token.is_empty() && !expired(self.access_expires_at)
    }

    /// Whether the refresh token can still be presented to the refresh
    /// endpoint.
    #[must_use]
    pub fn refresh_is_valid(&self) -> bool {
        !self.refresh_token.is_empty() && !expired(self.refresh_expires_at)
    }
}

fn expired(at: DateTime<Utc>) -> bool {
    Utc::now() + TimeDelta::seconds(EXPIRY_MARGIN_SECS) >= at
}

/// Process-wide owner of the current [`Credential`].
pub struct CredentialStore {
    kv: Arc<dyn KvStore>,
    current: Mutex<Option<Credential>>,
}

impl CredentialStore {
    /// Build a store over the key/value collaborator, restoring any
    /// persisted credential pair.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        let restored = kv
            .get(CREDENTIALS_KEY)
            .and_then(|v| serde_json::from_value(v).ok());
        if restored.is_some() {
            tracing::debug!("restored persisted credentials");
        }
        Self {
            kv,
            current: Mutex::new(restored),
        }
    }

    /// The current credential pair, if any.
    #[must_use]
    pub fn current(&self) -> Option<Credential> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a usable access token is currently held.
    #[must_use]
    pub fn access_is_valid(&self) -> bool {
        self.current().is_some_and(|c| c.access_is_valid())
    }

    /// Replace the credential pair (login, register, refresh).
    ///
    /// # Errors
    ///
    /// Returns error if persisting through the key/value store fails; the
    /// in-memory pair is updated regardless so the session keeps working.
    pub fn set(&self, credential: Credential) -> Result<()> {
        let persisted = serde_json::to_value(&credential)?;
        *self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
        self.kv.set(CREDENTIALS_KEY, persisted)
    }

    /// Clear the pair entirely (logout, terminal session expiry).
    pub fn clear(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Err(e) = self.kv.remove(CREDENTIALS_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted credentials");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_credential", &self.current().is_some())
            .finish()
    }
}
