//! Read-only aggregate operations.
//!
//! Aggregates parameterized by a current gold price or a trend window cache
//! one entry per parameter combination, so switching parameters in the UI
//! does not evict the previous view's data.

use crate::api::EmasClient;
use crate::api::endpoints;
use crate::error::Result;
use crate::models::{
    DashboardData, GoldPrice, PortfolioData, TrendGroupBy, TrendPeriod, Trends,
};

impl EmasClient {
    /// Dashboard statistics (cached per gold-price parameter).
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn dashboard(
        &self,
        current_gold_price: Option<f64>,
        force_refresh: bool,
    ) -> Result<DashboardData> {
        let transport = self.transport.clone();
        let path = endpoints::with_gold_price(endpoints::ANALYTICS_DASHBOARD, current_gold_price);
        let key = current_gold_price.map(|p| p.to_string());
        self.dashboard
            .get_with(key.as_deref(), force_refresh, async move {
                transport.get(&path).await
            })
            .await
    }

    /// Portfolio analytics (cached per gold-price parameter).
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn portfolio(
        &self,
        current_gold_price: Option<f64>,
        force_refresh: bool,
    ) -> Result<PortfolioData> {
        let transport = self.transport.clone();
        let path = endpoints::with_gold_price(endpoints::ANALYTICS_PORTFOLIO, current_gold_price);
        let key = current_gold_price.map(|p| p.to_string());
        self.portfolio
            .get_with(key.as_deref(), force_refresh, async move {
                transport.get(&path).await
            })
            .await
    }

    /// Trend summaries (cached per period/grouping combination).
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn trends(
        &self,
        period: Option<TrendPeriod>,
        group_by: Option<TrendGroupBy>,
        force_refresh: bool,
    ) -> Result<Trends> {
        let transport = self.transport.clone();
        let mut query = Vec::new();
        if let Some(period) = period {
            query.push(format!("period={}", period.as_str()));
        }
        if let Some(group_by) = group_by {
            query.push(format!("group_by={}", group_by.as_str()));
        }
        let path = if query.is_empty() {
            endpoints::ANALYTICS_TRENDS.to_string()
        } else {
            format!("{}?{}", endpoints::ANALYTICS_TRENDS, query.join("&"))
        };
        let key = format!(
            "{}:{}",
            period.map_or("default", TrendPeriod::as_str),
            group_by.map_or("default", TrendGroupBy::as_str),
        );
        self.trends
            .get_with(Some(&key), force_refresh, async move {
                transport.get(&path).await
            })
            .await
    }

    /// Current gold price (public endpoint, cached).
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn gold_price(&self, force_refresh: bool) -> Result<GoldPrice> {
        let transport = self.transport.clone();
        self.gold_price
            .get_with(None, force_refresh, async move {
                transport.get_public(endpoints::GOLD_PRICE_CURRENT).await
            })
            .await
    }
}
