//! Error types for emasgo-client.
//!
//! Uses `thiserror` for structured error types shared across the whole
//! client core.
//!
//! ## Error Taxonomy
//!
//! - **Network**: transport-level failure (timeout, DNS, connection reset).
//!   Never retried automatically inside this core; the caller decides.
//! - **AuthorizationExpired**: the access credential was rejected or absent
//!   and the refresh path failed or was unavailable. Always terminal for the
//!   current session: the credential store is cleared and the navigator is
//!   signalled before this error surfaces.
//! - **Validation**: remote-reported field errors, mapped 1:1 from the API
//!   error envelope `{ success: false, message, errors? }`.
//! - **Api**: any other non-success status from the remote endpoint.
//! - **Decode / Storage**: local failures deserializing payloads or talking
//!   to the key/value store collaborator.
//!
//! A cache miss is not an error anywhere in this crate - it is the normal
//! trigger for a fetch.
//!
//! All variants are `Clone` so a single failure can be broadcast to every
//! caller waiting on a shared in-flight future (see `core::session` and
//! `core::cache`).

use std::collections::HashMap;

use thiserror::Error;

/// Main error type for emasgo-client operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // ==========================================================================
    // Network errors
    // ==========================================================================
    /// Transport-level failure (DNS, connection reset, malformed response).
    #[error("network error: {message}")]
    Network {
        message: String,
    },

    /// Request timed out at the transport level. Treated as a normal network
    /// failure, not a distinguished path.
    #[error("request timed out")]
    Timeout,

    // ==========================================================================
    // Session errors
    // ==========================================================================
    /// Access credential rejected or absent and refresh failed/unavailable.
    /// The credential store has already been cleared when this surfaces.
    #[error("authorization expired; sign in again")]
    AuthorizationExpired,

    // ==========================================================================
    // Remote API errors
    // ==========================================================================
    /// Remote-reported validation failure with optional per-field errors.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: Option<HashMap<String, Vec<String>>>,
    },

    /// Any other error status from the remote endpoint.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
    },

    // ==========================================================================
    // Local errors
    // ==========================================================================
    /// Response payload could not be deserialized into the expected shape.
    #[error("decode error: {message}")]
    Decode {
        message: String,
    },

    /// Key/value store collaborator failed.
    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

impl ApiError {
    /// Field errors carried by a [`ApiError::Validation`], if any.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&HashMap<String, Vec<String>>> {
        match self {
            Self::Validation { errors: Some(e), .. } => Some(e),
            _ => None,
        }
    }

    /// Whether this failure terminated the session.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::AuthorizationExpired)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

/// Result type alias for emasgo-client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
