//! High-level EmasGo API surface.
//!
//! [`EmasClient`] composes the transport client, the per-resource caches,
//! and the consistency coordinator into one injected context object with an
//! explicit construction/teardown lifecycle: build it at session start,
//! [`EmasClient::logout`] tears the session down. Nothing here is ambient
//! global state.

pub mod analytics;
pub mod auth;
pub mod endpoints;
pub mod pockets;
pub mod transactions;

use std::sync::Arc;
use std::time::Duration;

use crate::core::cache::{AGGREGATE_TTL, REFERENCE_TTL, ResourceCache};
use crate::core::consistency::{ConsistencyCoordinator, ResourceKind, default_edges};
use crate::core::credentials::CredentialStore;
use crate::core::session::{Navigator, SessionRefresher};
use crate::core::transport::{ApiClient, DEFAULT_TIMEOUT, build_client};
use crate::error::Result;
use crate::models::{
    DashboardData, GoldPrice, Pocket, PocketWithRelations, PortfolioData, Transaction, Trends,
    TypePocket,
};
use crate::storage::KvStore;

/// Client configuration with per-cache TTL overrides.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, no trailing slash.
    pub base_url: String,
    /// Transport-level timeout applied to every call.
    pub timeout: Duration,
    /// TTL for frequently-changing aggregates (pockets, analytics).
    pub aggregate_ttl: Duration,
    /// TTL for rarely-changing reference data (categories).
    pub reference_ttl: Duration,
    /// Persist cache entries through the key/value store so they survive
    /// restarts.
    pub persist_caches: bool,
}

impl ClientConfig {
    /// Configuration with default timeouts and TTLs.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            aggregate_ttl: AGGREGATE_TTL,
            reference_ttl: REFERENCE_TTL,
            persist_caches: false,
        }
    }
}

/// EmasGo API client: session, transport, caches, and consistency in one
/// handle. Cheap to clone.
#[derive(Clone)]
pub struct EmasClient {
    pub(crate) transport: ApiClient,
    pub(crate) store: Arc<CredentialStore>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) coordinator: Arc<ConsistencyCoordinator>,
    pub(crate) pockets: ResourceCache<Vec<Pocket>>,
    pub(crate) pocket_detail: ResourceCache<PocketWithRelations>,
    pub(crate) transactions: ResourceCache<Vec<Transaction>>,
    pub(crate) type_pockets: ResourceCache<Vec<TypePocket>>,
    pub(crate) dashboard: ResourceCache<DashboardData>,
    pub(crate) portfolio: ResourceCache<PortfolioData>,
    pub(crate) trends: ResourceCache<Trends>,
    pub(crate) gold_price: ResourceCache<GoldPrice>,
}

impl EmasClient {
    /// Build a client over the key/value store and navigation
    /// collaborators, restoring any persisted session.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(
        config: &ClientConfig,
        kv: Arc<dyn KvStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = build_client(config.timeout)?;
        let store = Arc::new(CredentialStore::new(Arc::clone(&kv)));
        let session = SessionRefresher::new(
            http.clone(),
            format!("{}{}", config.base_url, endpoints::AUTH_REFRESH),
            Arc::clone(&store),
            Arc::clone(&navigator),
        );
        let transport = ApiClient::new(
            http,
            config.base_url.clone(),
            session,
            Arc::clone(&store),
            Arc::clone(&navigator),
        );

        let aggregate = config.aggregate_ttl;
        let reference = config.reference_ttl;
        let cache = |name: &'static str, ttl: Duration| {
            if config.persist_caches {
                CacheSpec::Persisted(Arc::clone(&kv), ttl, name)
            } else {
                CacheSpec::Memory(ttl, name)
            }
        };

        let pockets = cache("pockets", aggregate).build();
        let pocket_detail = cache("pocket_detail", aggregate).build();
        let transactions = cache("transactions", aggregate).build();
        let type_pockets = cache("type_pockets", reference).build();
        let dashboard = cache("dashboard", aggregate).build();
        let portfolio = cache("portfolio", aggregate).build();
        let trends = cache("trends", aggregate).build();
        let gold_price = cache("gold_price", aggregate).build();

        let coordinator = Arc::new(
            ConsistencyCoordinator::new(default_edges())
                .with_cache(ResourceKind::Pockets, Arc::new(pockets.clone()))
                .with_cache(ResourceKind::PocketDetail, Arc::new(pocket_detail.clone()))
                .with_cache(ResourceKind::Transactions, Arc::new(transactions.clone()))
                .with_cache(ResourceKind::TypePockets, Arc::new(type_pockets.clone()))
                .with_cache(ResourceKind::Dashboard, Arc::new(dashboard.clone()))
                .with_cache(ResourceKind::Portfolio, Arc::new(portfolio.clone()))
                .with_cache(ResourceKind::Trends, Arc::new(trends.clone())),
        );

        Ok(Self {
            transport,
            store,
            navigator,
            coordinator,
            pockets,
            pocket_detail,
            transactions,
            type_pockets,
            dashboard,
            portfolio,
            trends,
            gold_price,
        })
    }

    /// Drop every cached resource; subsequent reads fetch.
    pub fn clear_caches(&self) {
        self.pockets.invalidate_all();
        self.pocket_detail.invalidate_all();
        self.transactions.invalidate_all();
        self.type_pockets.invalidate_all();
        self.dashboard.invalidate_all();
        self.portfolio.invalidate_all();
        self.trends.invalidate_all();
        self.gold_price.invalidate_all();
    }
}

impl std::fmt::Debug for EmasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmasClient")
            .field("transport", &self.transport)
            .finish()
    }
}

/// Cache construction choice for one resource kind.
enum CacheSpec {
    Memory(Duration, &'static str),
    Persisted(Arc<dyn KvStore>, Duration, &'static str),
}

impl CacheSpec {
    fn build<T>(self) -> ResourceCache<T>
    where
        T: Clone + Send + Sync + serde::Serialize + serde::de::DeserializeOwned + 'static,
    {
        match self {
            Self::Memory(ttl, name) => ResourceCache::new(name, ttl),
            Self::Persisted(kv, ttl, name) => {
                ResourceCache::with_storage(name, ttl, kv, format!("cache.{name}"))
            }
        }
    }
}
