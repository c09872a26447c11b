//! Internal data model for the EmasGo API.
//!
//! All types serialize with camelCase field names; the snake_case wire form
//! exists only inside the transport layer, which converts in both
//! directions through `core::casing`.

pub mod analytics;
pub mod auth;
pub mod pocket;
pub mod transaction;

pub use analytics::{
    DashboardData, GoldPrice, PortfolioData, PortfolioPocket, RecentTransaction, TrendGroupBy,
    TrendPeriod, TrendPoint, Trends,
};
pub use auth::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, ProfileUpdateRequest,
    RegisterRequest, User,
};
pub use pocket::{Pocket, PocketCreate, PocketUpdate, PocketWithRelations, TypePocket};
pub use transaction::{Transaction, TransactionCreate, TransactionUpdate, TransactionWithPocket};
