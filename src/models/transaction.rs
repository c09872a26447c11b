//! Ledger entries: gold purchase transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::pocket::Pocket;

/// Gold purchase transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub pocket_id: String,
    pub transaction_date: DateTime<Utc>,
    pub brand: String,
    /// Weight in grams.
    pub weight: f64,
    /// Price per gram in IDR.
    pub price_per_gram: f64,
    /// Total price in IDR.
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction detail with its owning pocket, served by the per-transaction
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithPocket {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub pocket: Pocket,
}

/// Transaction creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreate {
    pub pocket_id: String,
    pub transaction_date: DateTime<Utc>,
    pub brand: String,
    pub weight: f64,
    pub price_per_gram: f64,
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_image: Option<String>,
}

/// Partial transaction update payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_gram: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_image: Option<String>,
}
