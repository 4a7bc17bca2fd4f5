//! Batch runner
//!
//! One invocation processes one verification batch end to end: load the
//! batch, verify every pending item against the external service, write
//! per-item results, leave the batch in a terminal status, and fire the
//! best-effort completion notice.

pub mod types;

#[cfg(test)]
mod tests;

pub use types::{Batch, BatchUpdate, Item, ItemResult, RunOutcome};

use crate::core::classify;
use crate::core::status::{BatchStatus, ItemStatus};
use crate::services::notifier::{BatchNotice, NoticeKind, Notifier};
use crate::services::registration::OrderSink;
use crate::services::verifier::{VerifierClient, VerifyError};
use crate::storage::BatchStore;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Processes one verification batch per invocation
pub struct BatchRunner {
    store: Arc<dyn BatchStore>,
    verifier: Arc<dyn VerifierClient>,
    notifier: Option<Arc<dyn Notifier>>,
    orders: Option<Arc<dyn OrderSink>>,
    /// Fixed pause after each verification call (informal upstream rate limit)
    delay: Duration,
}

impl BatchRunner {
    /// Create a runner with the default one-second inter-call delay
    pub fn new(store: Arc<dyn BatchStore>, verifier: Arc<dyn VerifierClient>) -> Self {
        Self {
            store,
            verifier,
            notifier: None,
            orders: None,
            delay: Duration::from_secs(1),
        }
    }

    /// Attach a completion notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Attach an order status sink for registered devices
    pub fn with_orders(mut self, orders: Arc<dyn OrderSink>) -> Self {
        self.orders = Some(orders);
        self
    }

    /// Override the inter-call delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Process the batch and leave it in a terminal status.
    ///
    /// Any error is recorded on the batch (status failed + error text) and
    /// re-raised so the process exits non-zero for the scheduler.
    pub async fn run(&self, batch_id: &str) -> Result<RunOutcome> {
        match self.execute(batch_id).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!("batch {} failed: {}", batch_id, err);
                let update = BatchUpdate::failed(err.to_string());
                if let Err(write_err) = self.store.update_batch_status(batch_id, &update).await {
                    error!(
                        "could not mark batch {} as failed: {}",
                        batch_id, write_err
                    );
                }
                Err(err)
            }
        }
    }

    async fn execute(&self, batch_id: &str) -> Result<RunOutcome> {
        let batch = self.store.get_batch(batch_id).await?;
        info!(
            "processing batch {} for company {} (status {})",
            batch.id,
            batch.company_id,
            batch.status.as_str()
        );

        if batch.status == BatchStatus::Completed {
            // Re-run after full completion is a documented no-op.
            info!("batch {} is already completed", batch_id);
            return Ok(RunOutcome {
                batch_id: batch_id.to_string(),
                verified: 0,
            });
        }

        let mut status = batch.status;
        if status != BatchStatus::InProgress {
            status = status.transition_to(BatchStatus::InProgress)?;
            self.store
                .update_batch_status(batch_id, &BatchUpdate::in_progress())
                .await?;
        }

        let items = self.store.pending_items(batch_id).await?;
        if items.is_empty() {
            info!("batch {} has no pending items", batch_id);
        } else {
            info!("batch {}: {} pending items", batch_id, items.len());
        }

        let mut verified = 0usize;
        for item in &items {
            let result = self.verify_item(item).await;
            item.status.transition_to(ItemStatus::Verified)?;
            self.store
                .write_item_result(batch_id, &item.id, &result)
                .await?;
            verified += 1;

            self.push_order_status(item, &result).await;
        }

        status.transition_to(BatchStatus::Completed)?;
        self.store
            .update_batch_status(batch_id, &BatchUpdate::completed())
            .await?;
        info!("batch {} completed ({} items verified)", batch_id, verified);

        self.notify(&batch, verified).await;

        Ok(RunOutcome {
            batch_id: batch_id.to_string(),
            verified,
        })
    }

    /// Verify both subjects of an item, first subject first.
    async fn verify_item(&self, item: &Item) -> ItemResult {
        let result1 = self.verify_subject(&item.id, &item.imei1).await;
        let result2 = match &item.imei2 {
            Some(subject) => Some(self.verify_subject(&item.id, subject).await),
            None => None,
        };

        ItemResult {
            result1,
            result2,
            verified_at: chrono::Utc::now(),
        }
    }

    /// Verify one subject. Blank subjects short-circuit to the `empty`
    /// sentinel without a network call; call failures fold into sentinel
    /// results instead of aborting the run.
    async fn verify_subject(&self, item_id: &str, subject: &str) -> String {
        let trimmed = subject.trim();
        if trimmed.is_empty() {
            return classify::EMPTY.to_string();
        }

        let result = match self.verifier.verify(trimmed).await {
            Ok(raw) => classify::classify(&raw),
            Err(VerifyError::Transport(e)) => {
                warn!("item {}: transport error for {}: {}", item_id, trimmed, e);
                classify::CONNECTION_ERROR.to_string()
            }
            Err(VerifyError::Unexpected(e)) => {
                warn!("item {}: unexpected response for {}: {}", item_id, trimmed, e);
                classify::UNEXPECTED_RESPONSE.to_string()
            }
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        result
    }

    /// Push the linked order forward when a subject verified as registered.
    /// Best effort, like the notifier.
    async fn push_order_status(&self, item: &Item, result: &ItemResult) {
        let Some(orders) = &self.orders else {
            return;
        };
        let Some(order_number) = &item.order_number else {
            return;
        };

        let registered = result.result1 == classify::REGISTERED
            || result.result2.as_deref() == Some(classify::REGISTERED);
        if !registered {
            return;
        }

        if let Err(e) = orders.order_verified(order_number).await {
            warn!("could not update order {}: {}", order_number, e);
        }
    }

    /// Fire the completion notice. Failures are logged and swallowed.
    async fn notify(&self, batch: &Batch, verified: usize) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let notice = BatchNotice {
            kind: NoticeKind::VerificationCompleted,
            batch_id: batch.id.clone(),
            company_id: batch.company_id.clone(),
            recipient: batch.customer_email.clone(),
            recipient_name: batch.customer_name.clone(),
            item_count: verified,
        };

        if let Err(e) = notifier.batch_completed(&notice).await {
            warn!("completion notice for batch {} failed: {}", batch.id, e);
        }
    }
}
