//! Read-only aggregates: dashboard, portfolio, trends, gold price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dashboard statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_pockets: u64,
    pub total_weight: f64,
    pub total_invested: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
    pub recent_transactions: Vec<RecentTransaction>,
}

/// Condensed transaction row on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransaction {
    pub id: String,
    pub pocket_name: String,
    pub weight: f64,
    pub total_price: f64,
    pub transaction_date: DateTime<Utc>,
}

/// Portfolio analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioData {
    pub pockets: Vec<PortfolioPocket>,
    pub total_weight: f64,
    pub total_value: f64,
}

/// One pocket's share of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPocket {
    pub id: String,
    pub name: String,
    pub type_pocket_name: String,
    pub weight: f64,
    pub value: f64,
    pub percentage: f64,
}

/// Trend aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendPeriod {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "all")]
    All,
}

impl TrendPeriod {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1m",
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::OneYear => "1y",
            Self::All => "all",
        }
    }
}

/// Trend bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendGroupBy {
    Day,
    Week,
    Month,
    Year,
}

impl TrendGroupBy {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// One trend data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period: String,
    pub weight: f64,
    pub value: f64,
    pub average_price: f64,
}

/// Trends response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub data: Vec<TrendPoint>,
    pub period: TrendPeriod,
    pub group_by: TrendGroupBy,
}

/// Current gold price (public endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldPrice {
    /// Price per gram in IDR.
    pub price_per_gram: f64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}
