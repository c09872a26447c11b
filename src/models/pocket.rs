//! Pockets (individual gold savings accounts) and their categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category for gold savings pockets (reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypePocket {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Individual gold savings account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pocket {
    pub id: String,
    pub type_pocket_id: String,
    pub name: String,
    pub description: String,
    /// Server-maintained sum of entry prices, in IDR.
    pub aggregate_total_price: f64,
    /// Server-maintained sum of entry weights, in grams.
    pub aggregate_total_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pocket creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PocketCreate {
    pub type_pocket_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
}

/// Partial pocket update payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PocketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_pocket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
}

/// Pocket detail with relations, served by the per-pocket endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PocketWithRelations {
    #[serde(flatten)]
    pub pocket: Pocket,
    pub type_pocket: TypePocket,
    pub transaction_count: u64,
}
