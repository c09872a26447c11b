//! EmasGo API endpoint paths.

pub const AUTH_LOGIN: &str = "/api/auth/login";
pub const AUTH_REGISTER: &str = "/api/auth/register";
pub const AUTH_LOGOUT: &str = "/api/auth/logout";
pub const AUTH_REFRESH: &str = "/api/auth/refresh";
pub const AUTH_ME: &str = "/api/auth/me";
pub const AUTH_FORGOT_PASSWORD: &str = "/api/auth/forgot-password";

pub const PROFILE: &str = "/api/profile";
pub const PROFILE_CHANGE_PASSWORD: &str = "/api/profile/change-password";

pub const POCKETS: &str = "/api/pockets";
pub const TYPE_POCKETS: &str = "/api/type-pockets";
pub const TRANSACTIONS: &str = "/api/transactions";

pub const ANALYTICS_DASHBOARD: &str = "/api/analytics/dashboard";
pub const ANALYTICS_PORTFOLIO: &str = "/api/analytics/portfolio";
pub const ANALYTICS_TRENDS: &str = "/api/analytics/trends";
pub const GOLD_PRICE_CURRENT: &str = "/api/gold-price/current";

/// Path for one pocket.
#[must_use]
pub fn pocket(id: &str) -> String {
    format!("{POCKETS}/{id}")
}

/// Path for one transaction.
#[must_use]
pub fn transaction(id: &str) -> String {
    format!("{TRANSACTIONS}/{id}")
}

/// Transaction listing, optionally filtered by pocket.
#[must_use]
pub fn transactions(pocket_id: Option<&str>) -> String {
    pocket_id.map_or_else(
        || TRANSACTIONS.to_string(),
        |id| format!("{TRANSACTIONS}?pocket_id={id}"),
    )
}

/// Aggregate path with an optional current-gold-price query parameter.
#[must_use]
pub fn with_gold_price(base: &str, current_gold_price: Option<f64>) -> String {
    current_gold_price.map_or_else(
        || base.to_string(),
        |price| format!("{base}?current_gold_price={price}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        assert_eq!(pocket("p1"), "/api/pockets/p1");
        assert_eq!(transactions(None), "/api/transactions");
        assert_eq!(
            transactions(Some("p1")),
            "/api/transactions?pocket_id=p1"
        );
        assert_eq!(
            with_gold_price(ANALYTICS_DASHBOARD, Some(1_250_000.0)),
            "/api/analytics/dashboard?current_gold_price=1250000"
        );
        assert_eq!(with_gold_price(ANALYTICS_DASHBOARD, None), ANALYTICS_DASHBOARD);
    }
}
