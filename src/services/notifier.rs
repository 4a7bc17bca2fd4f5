//! Completion notifications
//!
//! Fire-and-forget: a failed notification is logged by the caller and never
//! affects batch status.

use crate::utils::error::Result;
use async_trait::async_trait;

/// Which template the backend should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A verification batch finished
    VerificationCompleted,
    /// An import batch was converted into registrations
    ImportCompleted,
}

impl NoticeKind {
    /// Wire name understood by the e-mail endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::VerificationCompleted => "verification-batch-completed",
            NoticeKind::ImportCompleted => "registration-batch-completed",
        }
    }
}

/// Payload for a batch completion notice
#[derive(Debug, Clone)]
pub struct BatchNotice {
    /// Notice template
    pub kind: NoticeKind,
    /// Batch that finished
    pub batch_id: String,
    /// Owning company
    pub company_id: String,
    /// Recipient e-mail address
    pub recipient: String,
    /// Recipient display name
    pub recipient_name: String,
    /// Number of items the run handled
    pub item_count: usize,
}

/// Best-effort completion callback
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the owner that a batch finished.
    async fn batch_completed(&self, notice: &BatchNotice) -> Result<()>;
}
