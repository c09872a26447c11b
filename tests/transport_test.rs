//! Transport pipeline integration tests with a wiremock server.
//!
//! Covers wire-casing in both directions, public calls, the single
//! refresh-then-retry on a rejected credential, and error envelope mapping.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use emasgo_client::core::credentials::CredentialStore;
use emasgo_client::core::{ApiClient, DEFAULT_TIMEOUT, SessionRefresher, build_client};
use emasgo_client::error::ApiError;
use emasgo_client::{RecordingNavigator, make_test_credential, make_test_credential_store};

use common::{error_response, ok_envelope, ok_response, requests_for, wire_credentials};

const REFRESH_PATH: &str = "/api/auth/refresh";

fn api_client(
    server: &MockServer,
    store: Arc<CredentialStore>,
    navigator: Arc<RecordingNavigator>,
) -> ApiClient {
    common::init_tracing();
    let http = build_client(DEFAULT_TIMEOUT).expect("client build");
    let session = SessionRefresher::new(
        http.clone(),
        format!("{}{REFRESH_PATH}", server.uri()),
        Arc::clone(&store),
        Arc::clone(&navigator) as _,
    );
    ApiClient::new(http, server.uri(), session, store, navigator)
}

#[tokio::test]
async fn bodies_go_out_wire_cased_and_come_back_internal_cased() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let client = api_client(&server, store, RecordingNavigator::new());

    // The mock only matches the snake_case form of the outgoing body.
    Mock::given(method("POST"))
        .and(path("/api/pockets"))
        .and(body_json(json!({
            "type_pocket_id": "t1",
            "name": "Emergency",
            "target_weight": 10.0,
        })))
        .respond_with(ok_response(json!({
            "id": "p1",
            "type_pocket_id": "t1",
            "aggregate_total_weight": 0.0,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result: Value = client
        .post(
            "/api/pockets",
            &json!({ "typePocketId": "t1", "name": "Emergency", "targetWeight": 10.0 }),
        )
        .await
        .expect("post");

    assert_eq!(
        result,
        json!({ "id": "p1", "typePocketId": "t1", "aggregateTotalWeight": 0.0 })
    );
}

#[tokio::test]
async fn authenticated_calls_attach_bearer_header() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let client = api_client(&server, store, RecordingNavigator::new());

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(ok_response(json!({ "id": "u1" })))
        .expect(1)
        .mount(&server)
        .await;

    let user: Value = client.get("/api/auth/me").await.expect("get");
    assert_eq!(user["id"], "u1");
}

#[tokio::test]
async fn public_calls_skip_credentials_but_keep_transforms() {
    let server = MockServer::start().await;
    // Empty store: a public call must not trigger any refresh.
    let store = make_test_credential_store(None);
    let navigator = RecordingNavigator::new();
    let client = api_client(&server, store, Arc::clone(&navigator));

    Mock::given(method("GET"))
        .and(path("/api/gold-price/current"))
        .respond_with(ok_response(json!({ "price_per_gram": 1_250_000.0 })))
        .expect(1)
        .mount(&server)
        .await;

    let price: Value = client
        .get_public("/api/gold-price/current")
        .await
        .expect("public get");
    assert_eq!(price, json!({ "pricePerGram": 1_250_000.0 }));

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(navigator.login_signals(), 0);
}

#[tokio::test]
async fn rejected_credential_refreshes_and_retries_exactly_once() {
    let server = MockServer::start().await;
    // Locally valid but revoked server-side.
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let client = api_client(&server, Arc::clone(&store), RecordingNavigator::new());

    Mock::given(method("GET"))
        .and(path("/api/pockets"))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(error_response(401, "token revoked", None))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ok_response(wire_credentials("fresh-access", "fresh-refresh")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pockets"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ok_response(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let pockets: Value = client.get("/api/pockets").await.expect("retried get");
    assert_eq!(pockets, json!([]));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests_for(&requests, "/api/pockets").len(), 2);
    assert_eq!(requests_for(&requests, REFRESH_PATH).len(), 1);
    assert_eq!(
        store.current().expect("refreshed pair").access_token,
        "fresh-access"
    );
}

#[tokio::test]
async fn second_rejection_surfaces_without_third_attempt() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let navigator = RecordingNavigator::new();
    let client = api_client(&server, Arc::clone(&store), Arc::clone(&navigator));

    // Every credential is rejected, even the freshly refreshed one.
    Mock::given(method("GET"))
        .and(path("/api/pockets"))
        .respond_with(error_response(401, "session revoked", None))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ok_response(wire_credentials("fresh-access", "fresh-refresh")))
        .mount(&server)
        .await;

    let err = client
        .get::<Value>("/api/pockets")
        .await
        .expect_err("terminal");
    assert_eq!(err, ApiError::AuthorizationExpired);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests_for(&requests, "/api/pockets").len(), 2);
    assert_eq!(requests_for(&requests, REFRESH_PATH).len(), 1);
    assert!(store.current().is_none());
    assert_eq!(navigator.login_signals(), 1);
}

#[tokio::test]
async fn validation_errors_map_with_internal_cased_fields() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let client = api_client(&server, store, RecordingNavigator::new());

    Mock::given(method("POST"))
        .and(path("/api/pockets"))
        .respond_with(error_response(
            422,
            "validation failed",
            Some(json!({ "type_pocket_id": ["is required"], "target_weight": ["must be positive"] })),
        ))
        .mount(&server)
        .await;

    let err = client
        .post::<Value, _>("/api/pockets", &json!({ "name": "x" }))
        .await
        .expect_err("validation");
    match err {
        ApiError::Validation { message, errors } => {
            assert_eq!(message, "validation failed");
            let errors = errors.expect("field errors");
            assert_eq!(errors["typePocketId"], vec!["is required".to_string()]);
            assert_eq!(errors["targetWeight"], vec!["must be positive".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn other_error_statuses_propagate_untouched() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let client = api_client(&server, store, RecordingNavigator::new());

    Mock::given(method("GET"))
        .and(path("/api/pockets"))
        .respond_with(error_response(503, "maintenance window", None))
        .mount(&server)
        .await;

    let err = client
        .get::<Value>("/api/pockets")
        .await
        .expect_err("api error");
    assert_eq!(
        err,
        ApiError::Api {
            status: 503,
            message: "maintenance window".to_string(),
        }
    );
}

#[tokio::test]
async fn transport_timeout_surfaces_as_timeout() {
    let server = MockServer::start().await;
    let store = make_test_credential_store(Some(make_test_credential(3600, 86400)));
    let navigator = RecordingNavigator::new();

    let http = build_client(Duration::from_millis(100)).expect("client build");
    let session = SessionRefresher::new(
        http.clone(),
        format!("{}{REFRESH_PATH}", server.uri()),
        Arc::clone(&store),
        Arc::clone(&navigator) as _,
    );
    let client = api_client_with(http, &server, store, navigator, session);

    Mock::given(method("GET"))
        .and(path("/api/pockets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_envelope(json!([])))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client
        .get::<Value>("/api/pockets")
        .await
        .expect_err("timeout");
    assert_eq!(err, ApiError::Timeout);
}

fn api_client_with(
    http: reqwest::Client,
    server: &MockServer,
    store: Arc<CredentialStore>,
    navigator: Arc<RecordingNavigator>,
    session: SessionRefresher,
) -> ApiClient {
    ApiClient::new(http, server.uri(), session, store, navigator)
}
