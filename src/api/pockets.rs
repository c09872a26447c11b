//! Pocket and category operations.
//!
//! Reads go through the resource caches; mutations run first and report to
//! the consistency coordinator only on success, so a failed mutation leaves
//! every cache untouched.

use crate::api::EmasClient;
use crate::api::endpoints;
use crate::core::consistency::ResourceKind;
use crate::error::Result;
use crate::models::{Pocket, PocketCreate, PocketUpdate, PocketWithRelations, TypePocket};

impl EmasClient {
    /// List pockets (cached).
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors; coalesced callers share the
    /// outcome.
    pub async fn pockets(&self, force_refresh: bool) -> Result<Vec<Pocket>> {
        let transport = self.transport.clone();
        self.pockets
            .get_with(None, force_refresh, async move {
                transport.get(endpoints::POCKETS).await
            })
            .await
    }

    /// Fetch one pocket with relations and aggregate totals (cached per
    /// pocket id).
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn pocket(&self, id: &str, force_refresh: bool) -> Result<PocketWithRelations> {
        let transport = self.transport.clone();
        let path = endpoints::pocket(id);
        self.pocket_detail
            .get_with(Some(id), force_refresh, async move {
                transport.get(&path).await
            })
            .await
    }

    /// Create a pocket.
    ///
    /// # Errors
    ///
    /// Propagates validation failures, session, and transport errors.
    pub async fn create_pocket(&self, request: &PocketCreate) -> Result<Pocket> {
        let pocket: Pocket = self.transport.post(endpoints::POCKETS, request).await?;
        self.coordinator
            .mutated(ResourceKind::Pockets, Some(&pocket.id));
        Ok(pocket)
    }

    /// Update a pocket.
    ///
    /// # Errors
    ///
    /// Propagates validation failures, session, and transport errors.
    pub async fn update_pocket(&self, id: &str, request: &PocketUpdate) -> Result<Pocket> {
        let pocket: Pocket = self
            .transport
            .patch(&endpoints::pocket(id), request)
            .await?;
        self.coordinator.mutated(ResourceKind::Pockets, Some(id));
        Ok(pocket)
    }

    /// Delete a pocket.
    ///
    /// # Errors
    ///
    /// Propagates session and transport errors.
    pub async fn delete_pocket(&self, id: &str) -> Result<()> {
        self.transport.delete(&endpoints::pocket(id)).await?;
        self.coordinator.mutated(ResourceKind::Pockets, Some(id));
        Ok(())
    }

    /// List pocket categories (cached reference data).
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn type_pockets(&self, force_refresh: bool) -> Result<Vec<TypePocket>> {
        let transport = self.transport.clone();
        self.type_pockets
            .get_with(None, force_refresh, async move {
                transport.get(endpoints::TYPE_POCKETS).await
            })
            .await
    }
}
