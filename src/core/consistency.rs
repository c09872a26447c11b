//! Aggregate consistency coordinator.
//!
//! Mutating one resource kind makes cached aggregates derived from it stale:
//! recording a ledger entry changes its pocket's totals, the pocket list,
//! and every analytics aggregate. Rather than ad hoc cross-references
//! between resource modules, the dependencies are a static edge table
//! declared at composition time; after every *successful* mutation the
//! coordinator walks the table and invalidates dependents. A failed
//! mutation invalidates nothing.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::cache::ResourceCache;

/// The resource kinds tracked by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Pocket list.
    Pockets,
    /// Per-pocket detail with aggregate totals, keyed by pocket id.
    PocketDetail,
    /// Ledger entries, keyed by pocket id.
    Transactions,
    /// Pocket categories (reference data).
    TypePockets,
    /// Dashboard aggregate.
    Dashboard,
    /// Portfolio aggregate.
    Portfolio,
    /// Trend summaries.
    Trends,
}

/// How an invalidation reaches a dependent cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Invalidate only the entry under the mutated key.
    PropagateKey,
    /// Invalidate every entry in the dependent cache.
    All,
}

/// Mutation of `mutated` invalidates the cache registered for `dependent`.
#[derive(Debug, Clone, Copy)]
pub struct DependencyEdge {
    pub mutated: ResourceKind,
    pub dependent: ResourceKind,
    pub scope: InvalidationScope,
}

impl DependencyEdge {
    const fn new(mutated: ResourceKind, dependent: ResourceKind, scope: InvalidationScope) -> Self {
        Self {
            mutated,
            dependent,
            scope,
        }
    }
}

/// The EmasGo dependency table.
///
/// Ledger-entry mutations carry the affected pocket id as their key, so the
/// edge into the per-pocket detail cache propagates it; everything else is
/// aggregate-wide.
#[must_use]
pub fn default_edges() -> Vec<DependencyEdge> {
    use InvalidationScope::{All, PropagateKey};
    use ResourceKind::{
        Dashboard, PocketDetail, Pockets, Portfolio, Transactions, Trends, TypePockets,
    };

    vec![
        // Ledger entries feed every aggregate.
        DependencyEdge::new(Transactions, Transactions, All),
        DependencyEdge::new(Transactions, PocketDetail, PropagateKey),
        DependencyEdge::new(Transactions, Pockets, All),
        DependencyEdge::new(Transactions, Dashboard, All),
        DependencyEdge::new(Transactions, Portfolio, All),
        DependencyEdge::new(Transactions, Trends, All),
        // Pocket mutations reshape the list and the analytics aggregates.
        DependencyEdge::new(Pockets, Pockets, All),
        DependencyEdge::new(Pockets, PocketDetail, PropagateKey),
        DependencyEdge::new(Pockets, Dashboard, All),
        DependencyEdge::new(Pockets, Portfolio, All),
        // Category changes touch the list and pockets referencing them.
        DependencyEdge::new(TypePockets, TypePockets, All),
        DependencyEdge::new(TypePockets, Pockets, All),
    ]
}

/// Type-erased invalidation surface of a [`ResourceCache`].
pub trait InvalidateCache: Send + Sync {
    /// Invalidate one entry.
    fn purge(&self, key: Option<&str>);
    /// Invalidate every entry.
    fn purge_all(&self);
}

impl<T> InvalidateCache for ResourceCache<T>
where
    T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    fn purge(&self, key: Option<&str>) {
        self.invalidate(key);
    }

    fn purge_all(&self) {
        self.invalidate_all();
    }
}

/// Walks the dependency table after successful mutations.
pub struct ConsistencyCoordinator {
    edges: Vec<DependencyEdge>,
    caches: HashMap<ResourceKind, Arc<dyn InvalidateCache>>,
}

impl ConsistencyCoordinator {
    /// Create a coordinator over an edge table.
    #[must_use]
    pub fn new(edges: Vec<DependencyEdge>) -> Self {
        Self {
            edges,
            caches: HashMap::new(),
        }
    }

    /// Register the cache invalidated when `kind` appears as a dependent.
    #[must_use]
    pub fn with_cache(mut self, kind: ResourceKind, cache: Arc<dyn InvalidateCache>) -> Self {
        self.caches.insert(kind, cache);
        self
    }

    /// Record a successful mutation of `kind`; `key` is the affected
    /// resource identifier (the pocket id for ledger-entry mutations).
    ///
    /// Must be called only after the mutation completed successfully; the
    /// caller skips it on failure so a failed mutation has no partial
    /// effects.
    pub fn mutated(&self, kind: ResourceKind, key: Option<&str>) {
        tracing::debug!(?kind, ?key, "mutation committed; invalidating dependents");
        for edge in self.edges.iter().filter(|e| e.mutated == kind) {
            if let Some(cache) = self.caches.get(&edge.dependent) {
                match edge.scope {
                    InvalidationScope::PropagateKey => cache.purge(key),
                    InvalidationScope::All => cache.purge_all(),
                }
            }
        }
    }
}

impl std::fmt::Debug for ConsistencyCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistencyCoordinator")
            .field("edges", &self.edges.len())
            .field("caches", &self.caches.len())
            .finish()
    }
}
