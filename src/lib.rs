//! emasgo-client - EmasGo gold savings ledger API client
//!
//! State-management core over the EmasGo remote API: transparent bearer
//! credential attach/refresh, wire-casing normalization at the transport
//! boundary, and TTL-bounded per-resource caches kept consistent with
//! mutations.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod core;
pub mod error;
pub mod models;
pub mod storage;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::EmasClient;
pub use error::{ApiError, Result};

// Re-export test utilities for external test crates
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::*;
