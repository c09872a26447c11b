//! Test utilities for emasgo-client.
//!
//! Provides shared test data factories and collaborator stubs for use
//! across unit and integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::credentials::{Credential, CredentialStore};
use crate::core::session::Navigator;
use crate::models::{
    DashboardData, Pocket, PocketWithRelations, Transaction, TypePocket, User,
};
use crate::storage::{JsonFileStore, KvStore, MemoryStore};

// =============================================================================
// Test Data Factories
// =============================================================================

fn test_epoch() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-05T00:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Create a credential pair with the given offsets (seconds from now) for
/// access and refresh expiry. Negative offsets produce expired tokens.
#[must_use]
pub fn make_test_credential(access_secs: i64, refresh_secs: i64) -> Credential {
    Credential {
        access_token: "access-token".to_string(),
        refresh_token: "refresh-token".to_string(),
        access_expires_at: Utc::now() + TimeDelta::seconds(access_secs),
        refresh_expires_at: Utc::now() + TimeDelta::seconds(refresh_secs),
    }
}

/// Credential store over a fresh in-memory kv store, optionally seeded.
#[must_use]
pub fn make_test_credential_store(credential: Option<Credential>) -> Arc<CredentialStore> {
    let store = Arc::new(CredentialStore::new(Arc::new(MemoryStore::new())));
    if let Some(credential) = credential {
        store.set(credential).expect("seed credential");
    }
    store
}

/// Shared in-memory kv store handle.
#[must_use]
pub fn make_test_kv() -> Arc<dyn KvStore> {
    Arc::new(MemoryStore::new())
}

/// File-backed kv store in a temp directory. The directory lives as long as
/// the returned guard.
#[must_use]
pub fn make_temp_file_store() -> (Arc<dyn KvStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = JsonFileStore::open(dir.path().join("store.json"));
    (Arc::new(store), dir)
}

/// Create a test user.
#[must_use]
pub fn make_test_user() -> User {
    User {
        id: "u1".to_string(),
        full_name: "Siti Rahma".to_string(),
        email: "siti@example.com".to_string(),
        phone: "+62811111111".to_string(),
        created_at: test_epoch(),
        updated_at: test_epoch(),
    }
}

/// Create a test pocket with the given id and aggregates.
#[must_use]
pub fn make_test_pocket(id: &str, total_weight: f64, total_price: f64) -> Pocket {
    Pocket {
        id: id.to_string(),
        type_pocket_id: "t1".to_string(),
        name: format!("Pocket {id}"),
        description: String::new(),
        aggregate_total_price: total_price,
        aggregate_total_weight: total_weight,
        target_weight: None,
        created_at: test_epoch(),
        updated_at: test_epoch(),
    }
}

/// Create a test pocket category.
#[must_use]
pub fn make_test_type_pocket(id: &str) -> TypePocket {
    TypePocket {
        id: id.to_string(),
        name: "Emergency Fund".to_string(),
        description: String::new(),
        icon: "shield-check".to_string(),
        color: "blue".to_string(),
        created_at: test_epoch(),
        updated_at: test_epoch(),
    }
}

/// Create a test pocket detail with relations.
#[must_use]
pub fn make_test_pocket_detail(id: &str) -> PocketWithRelations {
    PocketWithRelations {
        pocket: make_test_pocket(id, 12.5, 15_000_000.0),
        type_pocket: make_test_type_pocket("t1"),
        transaction_count: 3,
    }
}

/// Create a test transaction for the given pocket.
#[must_use]
pub fn make_test_transaction(id: &str, pocket_id: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        pocket_id: pocket_id.to_string(),
        transaction_date: test_epoch(),
        brand: "Antam".to_string(),
        weight: 5.0,
        price_per_gram: 1_250_000.0,
        total_price: 6_250_000.0,
        description: None,
        receipt_image: None,
        created_at: test_epoch(),
        updated_at: test_epoch(),
    }
}

/// Create empty dashboard statistics.
#[must_use]
pub fn make_test_dashboard() -> DashboardData {
    DashboardData {
        total_pockets: 2,
        total_weight: 17.5,
        total_invested: 21_250_000.0,
        current_value: 23_000_000.0,
        profit_loss: 1_750_000.0,
        profit_loss_percentage: 8.2,
        recent_transactions: Vec::new(),
    }
}

// =============================================================================
// Collaborator Stubs
// =============================================================================

/// Navigator that records every `to_login` signal.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<Option<String>>>,
}

impl RecordingNavigator {
    /// Create a fresh recorder.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of times navigation to login was signalled.
    #[must_use]
    pub fn login_signals(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The recorded return-to hints, in order.
    #[must_use]
    pub fn hints(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn to_login(&self, return_to: Option<&str>) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(return_to.map(str::to_owned));
    }
}
