//! Ledger entry operations.
//!
//! Every mutation reports the affected pocket id to the consistency
//! coordinator on success, invalidating that pocket's aggregates and the
//! analytics caches.

use crate::api::EmasClient;
use crate::api::endpoints;
use crate::core::consistency::ResourceKind;
use crate::error::Result;
use crate::models::{Transaction, TransactionCreate, TransactionUpdate, TransactionWithPocket};

impl EmasClient {
    /// List transactions, optionally filtered by pocket (cached per
    /// filter).
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn transactions(
        &self,
        pocket_id: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<Transaction>> {
        let transport = self.transport.clone();
        let path = endpoints::transactions(pocket_id);
        self.transactions
            .get_with(pocket_id, force_refresh, async move {
                transport.get(&path).await
            })
            .await
    }

    /// Fetch one transaction with its owning pocket.
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn transaction(&self, id: &str) -> Result<TransactionWithPocket> {
        self.transport.get(&endpoints::transaction(id)).await
    }

    /// Record a gold purchase.
    ///
    /// # Errors
    ///
    /// Propagates validation failures, session, and transport errors; no
    /// cache is invalidated on failure.
    pub async fn create_transaction(&self, request: &TransactionCreate) -> Result<Transaction> {
        let transaction: Transaction =
            self.transport.post(endpoints::TRANSACTIONS, request).await?;
        self.coordinator
            .mutated(ResourceKind::Transactions, Some(&transaction.pocket_id));
        Ok(transaction)
    }

    /// Update a transaction.
    ///
    /// # Errors
    ///
    /// Propagates validation failures, session, and transport errors.
    pub async fn update_transaction(
        &self,
        id: &str,
        request: &TransactionUpdate,
    ) -> Result<Transaction> {
        let transaction: Transaction = self
            .transport
            .patch(&endpoints::transaction(id), request)
            .await?;
        self.coordinator
            .mutated(ResourceKind::Transactions, Some(&transaction.pocket_id));
        Ok(transaction)
    }

    /// Delete a transaction. The caller supplies the owning pocket id since
    /// the delete response carries no payload.
    ///
    /// # Errors
    ///
    /// Propagates session and transport errors.
    pub async fn delete_transaction(&self, id: &str, pocket_id: &str) -> Result<()> {
        self.transport.delete(&endpoints::transaction(id)).await?;
        self.coordinator
            .mutated(ResourceKind::Transactions, Some(pocket_id));
        Ok(())
    }
}
