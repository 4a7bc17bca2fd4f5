//! Verification batch types

use crate::core::status::{BatchStatus, ItemStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named unit of work grouping items to be verified together
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Batch ID
    pub id: String,
    /// Owning company
    pub company_id: String,
    /// Notification recipient name
    pub customer_name: String,
    /// Notification recipient e-mail
    pub customer_email: String,
    /// Number of items the producer put into the batch
    pub item_count: u32,
    /// Lifecycle status
    pub status: BatchStatus,
    /// Creation timestamp (set by the producer)
    pub created_at: DateTime<Utc>,
    /// Completion timestamp (set by the runner)
    pub completed_at: Option<DateTime<Utc>>,
    /// Error text when the batch failed
    pub error: Option<String>,
}

/// A single record within a batch, carrying one or two verification subjects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Item ID
    pub id: String,
    /// First verification subject; may be blank
    pub imei1: String,
    /// Second verification subject; absent for single-IMEI devices
    pub imei2: Option<String>,
    /// Order this item belongs to, when the producer linked one
    pub order_number: Option<String>,
    /// Lifecycle status
    pub status: ItemStatus,
    /// Classification for the first subject
    pub result1: Option<String>,
    /// Classification for the second subject
    pub result2: Option<String>,
    /// When the item was verified
    pub verified_at: Option<DateTime<Utc>>,
}

/// Per-item write after verification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    /// Classification for the first subject
    pub result1: String,
    /// Classification for the second subject, when present on the item
    pub result2: Option<String>,
    /// Verification timestamp
    pub verified_at: DateTime<Utc>,
}

/// Status write for a batch document
#[derive(Debug, Clone)]
pub struct BatchUpdate {
    /// New status
    pub status: BatchStatus,
    /// Error text; set only for failed batches
    pub error: Option<String>,
    /// When the transition happened
    pub at: DateTime<Utc>,
}

impl BatchUpdate {
    /// The runner picked the batch up
    pub fn in_progress() -> Self {
        Self {
            status: BatchStatus::InProgress,
            error: None,
            at: Utc::now(),
        }
    }

    /// All eligible items were processed
    pub fn completed() -> Self {
        Self {
            status: BatchStatus::Completed,
            error: None,
            at: Utc::now(),
        }
    }

    /// The run aborted; canonical failure shape is status + error text +
    /// failure timestamp
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: BatchStatus::Failed,
            error: Some(error.into()),
            at: Utc::now(),
        }
    }
}

/// Summary of one run, reported by the binary
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Batch that was processed
    pub batch_id: String,
    /// Items verified during this run
    pub verified: usize,
}
