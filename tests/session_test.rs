//! Session refresher integration tests against a wiremock refresh endpoint.
//!
//! Covers refresh de-duplication under concurrency, causally-consistent
//! outcomes for all waiters, and terminal session expiry.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use emasgo_client::core::{DEFAULT_TIMEOUT, SessionRefresher, build_client};
use emasgo_client::core::credentials::CredentialStore;
use emasgo_client::error::ApiError;
use emasgo_client::{RecordingNavigator, make_test_credential, make_test_credential_store};

use common::{ok_envelope, wire_credentials};

const REFRESH_PATH: &str = "/api/auth/refresh";

fn refresher(
    server: &MockServer,
    store: Arc<CredentialStore>,
    navigator: Arc<RecordingNavigator>,
) -> SessionRefresher {
    common::init_tracing();
    SessionRefresher::new(
        build_client(DEFAULT_TIMEOUT).expect("client build"),
        format!("{}{REFRESH_PATH}", server.uri()),
        store,
        navigator,
    )
}

#[tokio::test]
async fn valid_access_returns_without_network_call() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let session = refresher(&server, Arc::clone(&store), RecordingNavigator::new());

    let credential = session.ensure_valid_access().await.expect("valid access");
    assert_eq!(credential.access_token, "access-token");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_expired_callers_share_one_refresh() {
    let server = MockServer::start().await;
    // Expired access, valid refresh.
    let store = make_test_credential_store(Some(make_test_credential(-60, 86400)));
    let session = refresher(&server, Arc::clone(&store), RecordingNavigator::new());

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_envelope(wire_credentials("new-access", "new-refresh")))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let results = join_all((0..5).map(|_| {
        let session = session.clone();
        async move { session.ensure_valid_access().await }
    }))
    .await;

    for result in results {
        assert_eq!(result.expect("refreshed").access_token, "new-access");
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    // The store now holds the refreshed pair.
    let current = store.current().expect("credential present");
    assert_eq!(current.access_token, "new-access");
    assert_eq!(current.refresh_token, "new-refresh");
}

#[tokio::test]
async fn failed_refresh_is_terminal_for_every_waiter() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(-60, 86400)));
    let navigator = RecordingNavigator::new();
    let session = refresher(&server, Arc::clone(&store), Arc::clone(&navigator));

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({
                    "success": false,
                    "message": "refresh token expired",
                }))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let results = join_all((0..3).map(|_| {
        let session = session.clone();
        async move { session.ensure_valid_access().await }
    }))
    .await;

    for result in results {
        assert_eq!(result.expect_err("terminal"), ApiError::AuthorizationExpired);
    }

    // Both credentials cleared, navigation signalled exactly once.
    assert!(store.current().is_none());
    assert_eq!(navigator.login_signals(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    // No residual pending refresh: the next attempt fails on the empty
    // store without touching the endpoint again.
    let err = session.ensure_valid_access().await.expect_err("still expired");
    assert_eq!(err, ApiError::AuthorizationExpired);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn expired_refresh_credential_skips_network() {
    let server = MockServer::start().await;
    // Both tokens expired.
    let store = make_test_credential_store(Some(make_test_credential(-60, -60)));
    let navigator = RecordingNavigator::new();
    let session = refresher(&server, Arc::clone(&store), Arc::clone(&navigator));

    let err = session.ensure_valid_access().await.expect_err("expired");
    assert_eq!(err, ApiError::AuthorizationExpired);
    assert!(store.current().is_none());
    assert_eq!(navigator.login_signals(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_credentials_skip_network() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(None);
    let navigator = RecordingNavigator::new();
    let session = refresher(&server, store, Arc::clone(&navigator));

    let err = session.ensure_valid_access().await.expect_err("logged out");
    assert_eq!(err, ApiError::AuthorizationExpired);
    assert_eq!(navigator.login_signals(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn refresh_now_joins_in_flight_refresh() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(-60, 86400)));
    let session = refresher(&server, store, RecordingNavigator::new());

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_envelope(wire_credentials("new-access", "new-refresh")))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    // One caller discovers expiry, the other forces; both share one call.
    let (a, b) = tokio::join!(session.ensure_valid_access(), session.refresh_now());
    assert_eq!(a.expect("refreshed").access_token, "new-access");
    assert_eq!(b.expect("refreshed").access_token, "new-access");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
