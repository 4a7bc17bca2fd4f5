//! Storage layer
//!
//! The store is a document database holding batch parents and item children.
//! All access goes through the [`BatchStore`] trait so tests can run against
//! the in-memory implementation while production uses Firestore.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::core::importer::types::{ImportBatch, ImportItem, Registration};
use crate::core::runner::types::{Batch, BatchUpdate, Item, ItemResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Document store operations the batch scripts need
///
/// Single-document writes only, except [`create_registrations`] which commits
/// its records atomically as one unit.
///
/// [`create_registrations`]: BatchStore::create_registrations
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Load a verification batch. `NotFound` when absent.
    async fn get_batch(&self, batch_id: &str) -> Result<Batch>;

    /// Items of the batch still in pending-verification status.
    async fn pending_items(&self, batch_id: &str) -> Result<Vec<Item>>;

    /// Write one item's results, verification timestamp, and verified status.
    async fn write_item_result(
        &self,
        batch_id: &str,
        item_id: &str,
        result: &ItemResult,
    ) -> Result<()>;

    /// Write a batch status transition.
    async fn update_batch_status(&self, batch_id: &str, update: &BatchUpdate) -> Result<()>;

    /// Load a staged import batch. `NotFound` when absent.
    async fn get_import_batch(&self, batch_id: &str) -> Result<ImportBatch>;

    /// All staged items of an import batch.
    async fn import_items(&self, batch_id: &str) -> Result<Vec<ImportItem>>;

    /// Commit new registrations atomically as a single unit.
    async fn create_registrations(&self, registrations: &[Registration]) -> Result<()>;

    /// Adjust a company's credit balance by `delta`.
    async fn adjust_company_credits(&self, company_id: &str, delta: i64) -> Result<()>;

    /// Write an import batch status transition.
    async fn update_import_batch_status(
        &self,
        batch_id: &str,
        update: &BatchUpdate,
    ) -> Result<()>;
}
