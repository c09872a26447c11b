//! Session, transport, and cache coordination core.

pub mod cache;
pub mod casing;
pub mod consistency;
pub mod credentials;
pub mod session;
pub mod transport;

pub use cache::ResourceCache;
pub use casing::{camel_to_snake, snake_to_camel, to_internal_case, to_wire_case};
pub use consistency::{
    ConsistencyCoordinator, DependencyEdge, InvalidateCache, InvalidationScope, ResourceKind,
    default_edges,
};
pub use credentials::{Credential, CredentialStore};
pub use session::{Navigator, NoopNavigator, SessionRefresher};
pub use transport::{ApiClient, Auth, build_client, DEFAULT_TIMEOUT};
