//! Shared helpers for integration tests.
#![allow(dead_code)]

use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use wiremock::{Request, ResponseTemplate};

/// Route tracing output through the test harness. Safe to call repeatedly;
/// only the first call installs a subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("emasgo_client=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Wrap `data` in the API success envelope.
pub fn ok_envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// Build the API error envelope.
pub fn error_envelope(message: &str, errors: Option<Value>) -> Value {
    let mut envelope = json!({ "success": false, "message": message });
    if let Some(errors) = errors {
        envelope["errors"] = errors;
    }
    envelope
}

/// 200 response with a success envelope around `data`.
pub fn ok_response(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(ok_envelope(data))
}

/// Error response with the API error envelope.
pub fn error_response(status: u16, message: &str, errors: Option<Value>) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(error_envelope(message, errors))
}

/// Wire-cased credential payload for the refresh and login endpoints, with
/// expiries comfortably in the future.
pub fn wire_credentials(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "access_expires_at": (Utc::now() + TimeDelta::hours(1)).to_rfc3339(),
        "refresh_expires_at": (Utc::now() + TimeDelta::days(30)).to_rfc3339(),
    })
}

/// Wire-cased authentication payload (login/register responses).
pub fn wire_auth() -> Value {
    let mut auth = wire_credentials("access-token", "refresh-token");
    auth["user"] = wire_user();
    auth
}

/// Wire-cased user payload.
pub fn wire_user() -> Value {
    json!({
        "id": "u1",
        "full_name": "Siti Rahma",
        "email": "siti@example.com",
        "phone": "+62811111111",
        "created_at": "2026-01-05T00:00:00Z",
        "updated_at": "2026-01-05T00:00:00Z",
    })
}

/// Wire-cased pocket payload.
pub fn wire_pocket(id: &str) -> Value {
    json!({
        "id": id,
        "type_pocket_id": "t1",
        "name": format!("Pocket {id}"),
        "description": "",
        "aggregate_total_price": 15_000_000.0,
        "aggregate_total_weight": 12.5,
        "created_at": "2026-01-05T00:00:00Z",
        "updated_at": "2026-01-05T00:00:00Z",
    })
}

/// Wire-cased pocket detail payload.
pub fn wire_pocket_detail(id: &str) -> Value {
    let mut detail = wire_pocket(id);
    detail["type_pocket"] = json!({
        "id": "t1",
        "name": "Emergency Fund",
        "description": "",
        "icon": "shield-check",
        "color": "blue",
        "created_at": "2026-01-05T00:00:00Z",
        "updated_at": "2026-01-05T00:00:00Z",
    });
    detail["transaction_count"] = json!(3);
    detail
}

/// Wire-cased transaction payload.
pub fn wire_transaction(id: &str, pocket_id: &str) -> Value {
    json!({
        "id": id,
        "pocket_id": pocket_id,
        "transaction_date": "2026-01-05T00:00:00Z",
        "brand": "Antam",
        "weight": 5.0,
        "price_per_gram": 1_250_000.0,
        "total_price": 6_250_000.0,
        "created_at": "2026-01-05T00:00:00Z",
        "updated_at": "2026-01-05T00:00:00Z",
    })
}

/// Wire-cased dashboard payload.
pub fn wire_dashboard() -> Value {
    json!({
        "total_pockets": 2,
        "total_weight": 17.5,
        "total_invested": 21_250_000.0,
        "current_value": 23_000_000.0,
        "profit_loss": 1_750_000.0,
        "profit_loss_percentage": 8.2,
        "recent_transactions": [],
    })
}

/// The requests the mock server received for a given path (query string
/// ignored).
pub fn requests_for<'a>(requests: &'a [Request], path: &str) -> Vec<&'a Request> {
    requests.iter().filter(|r| r.url.path() == path).collect()
}
