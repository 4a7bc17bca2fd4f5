//! Lifecycle statuses with a validated transition table
//!
//! Batches and items carry real enums instead of free-form strings, so an
//! illegal transition is an error at the call site rather than a silent
//! overwrite in the store.

use crate::utils::error::{Result, RunnerError};
use serde::{Deserialize, Serialize};

/// Batch processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchStatus {
    /// Created by the producer, not yet picked up
    Received,
    /// A runner is working on the batch
    InProgress,
    /// All eligible items were processed
    Completed,
    /// The run aborted; the batch carries the error text
    Failed,
}

impl BatchStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Received => "received",
            BatchStatus::InProgress => "in-progress",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        }
    }

    /// Parse a wire name back into a status
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "received" => Ok(BatchStatus::Received),
            "in-progress" => Ok(BatchStatus::InProgress),
            "completed" => Ok(BatchStatus::Completed),
            "failed" => Ok(BatchStatus::Failed),
            other => Err(RunnerError::Store(format!(
                "Unknown batch status: {}",
                other
            ))),
        }
    }

    /// Whether the batch can never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }

    /// Validated transition. `received -> in-progress -> completed | failed`.
    /// A failed batch may be picked up again (`failed -> in-progress`) so a
    /// scheduler retry can finish the pending remainder; completed is final.
    pub fn transition_to(self, next: BatchStatus) -> Result<BatchStatus> {
        let legal = matches!(
            (self, next),
            (BatchStatus::Received, BatchStatus::InProgress)
                | (BatchStatus::Received, BatchStatus::Failed)
                | (BatchStatus::InProgress, BatchStatus::Completed)
                | (BatchStatus::InProgress, BatchStatus::Failed)
                | (BatchStatus::Failed, BatchStatus::InProgress)
        );
        if legal {
            Ok(next)
        } else {
            Err(RunnerError::IllegalTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

/// Item verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    /// Waiting to be verified
    PendingVerification,
    /// Verified; the item is never reprocessed
    Verified,
}

impl ItemStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::PendingVerification => "pending-verification",
            ItemStatus::Verified => "verified",
        }
    }

    /// Parse a wire name back into a status
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "pending-verification" => Ok(ItemStatus::PendingVerification),
            "verified" => Ok(ItemStatus::Verified),
            other => Err(RunnerError::Store(format!("Unknown item status: {}", other))),
        }
    }

    /// Validated transition. Only `pending-verification -> verified` is legal.
    pub fn transition_to(self, next: ItemStatus) -> Result<ItemStatus> {
        match (self, next) {
            (ItemStatus::PendingVerification, ItemStatus::Verified) => Ok(next),
            _ => Err(RunnerError::IllegalTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            }),
        }
    }
}
