//! In-memory store
//!
//! Backs the test suites and local dry runs. Same trait surface as the
//! Firestore implementation, state held in tokio RwLock maps.

use crate::core::importer::types::{ImportBatch, ImportItem, Registration};
use crate::core::runner::types::{Batch, BatchUpdate, Item, ItemResult};
use crate::core::status::{BatchStatus, ItemStatus};
use crate::storage::BatchStore;
use crate::utils::error::{Result, RunnerError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory [`BatchStore`] implementation
#[derive(Default)]
pub struct MemoryStore {
    batches: RwLock<HashMap<String, Batch>>,
    items: RwLock<HashMap<String, Vec<Item>>>,
    import_batches: RwLock<HashMap<String, ImportBatch>>,
    import_items: RwLock<HashMap<String, Vec<ImportItem>>>,
    registrations: RwLock<HashMap<String, Registration>>,
    credits: RwLock<HashMap<String, i64>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a verification batch
    pub async fn insert_batch(&self, batch: Batch) {
        self.batches.write().await.insert(batch.id.clone(), batch);
    }

    /// Seed the items of a verification batch
    pub async fn insert_items(&self, batch_id: &str, items: Vec<Item>) {
        self.items.write().await.insert(batch_id.to_string(), items);
    }

    /// Seed an import batch
    pub async fn insert_import_batch(&self, batch: ImportBatch) {
        self.import_batches
            .write()
            .await
            .insert(batch.id.clone(), batch);
    }

    /// Seed the items of an import batch
    pub async fn insert_import_items(&self, batch_id: &str, items: Vec<ImportItem>) {
        self.import_items
            .write()
            .await
            .insert(batch_id.to_string(), items);
    }

    /// Seed a company credit balance
    pub async fn set_credits(&self, company_id: &str, credits: i64) {
        self.credits
            .write()
            .await
            .insert(company_id.to_string(), credits);
    }

    /// Snapshot a verification batch
    pub async fn batch(&self, batch_id: &str) -> Option<Batch> {
        self.batches.read().await.get(batch_id).cloned()
    }

    /// Snapshot the items of a verification batch
    pub async fn items(&self, batch_id: &str) -> Vec<Item> {
        self.items
            .read()
            .await
            .get(batch_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot an import batch
    pub async fn import_batch(&self, batch_id: &str) -> Option<ImportBatch> {
        self.import_batches.read().await.get(batch_id).cloned()
    }

    /// Snapshot all committed registrations
    pub async fn registrations(&self) -> Vec<Registration> {
        self.registrations.read().await.values().cloned().collect()
    }

    /// Snapshot a company credit balance
    pub async fn credits(&self, company_id: &str) -> i64 {
        self.credits
            .read()
            .await
            .get(company_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl BatchStore for MemoryStore {
    async fn get_batch(&self, batch_id: &str) -> Result<Batch> {
        self.batches
            .read()
            .await
            .get(batch_id)
            .cloned()
            .ok_or_else(|| RunnerError::NotFound(format!("batch {}", batch_id)))
    }

    async fn pending_items(&self, batch_id: &str) -> Result<Vec<Item>> {
        Ok(self
            .items
            .read()
            .await
            .get(batch_id)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.status == ItemStatus::PendingVerification)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn write_item_result(
        &self,
        batch_id: &str,
        item_id: &str,
        result: &ItemResult,
    ) -> Result<()> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(batch_id)
            .and_then(|items| items.iter_mut().find(|item| item.id == item_id))
            .ok_or_else(|| RunnerError::NotFound(format!("item {}/{}", batch_id, item_id)))?;

        item.result1 = Some(result.result1.clone());
        item.result2 = result.result2.clone();
        item.verified_at = Some(result.verified_at);
        item.status = ItemStatus::Verified;
        Ok(())
    }

    async fn update_batch_status(&self, batch_id: &str, update: &BatchUpdate) -> Result<()> {
        let mut batches = self.batches.write().await;
        let batch = batches
            .get_mut(batch_id)
            .ok_or_else(|| RunnerError::NotFound(format!("batch {}", batch_id)))?;

        batch.status = update.status;
        batch.error = update.error.clone();
        if update.status == BatchStatus::Completed {
            batch.completed_at = Some(update.at);
        }
        Ok(())
    }

    async fn get_import_batch(&self, batch_id: &str) -> Result<ImportBatch> {
        self.import_batches
            .read()
            .await
            .get(batch_id)
            .cloned()
            .ok_or_else(|| RunnerError::NotFound(format!("import batch {}", batch_id)))
    }

    async fn import_items(&self, batch_id: &str) -> Result<Vec<ImportItem>> {
        Ok(self
            .import_items
            .read()
            .await
            .get(batch_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_registrations(&self, registrations: &[Registration]) -> Result<()> {
        // Atomic unit: reject the whole commit on any duplicate order number.
        let mut stored = self.registrations.write().await;
        for registration in registrations {
            if stored.contains_key(&registration.order_number) {
                return Err(RunnerError::Store(format!(
                    "registration {} already exists",
                    registration.order_number
                )));
            }
        }
        for registration in registrations {
            stored.insert(registration.order_number.clone(), registration.clone());
        }
        Ok(())
    }

    async fn adjust_company_credits(&self, company_id: &str, delta: i64) -> Result<()> {
        let mut credits = self.credits.write().await;
        *credits.entry(company_id.to_string()).or_insert(0) += delta;
        Ok(())
    }

    async fn update_import_batch_status(
        &self,
        batch_id: &str,
        update: &BatchUpdate,
    ) -> Result<()> {
        let mut batches = self.import_batches.write().await;
        let batch = batches
            .get_mut(batch_id)
            .ok_or_else(|| RunnerError::NotFound(format!("import batch {}", batch_id)))?;
        batch.status = update.status;
        Ok(())
    }
}
