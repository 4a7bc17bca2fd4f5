//! Import processor
//!
//! Converts a staged import batch into registration records committed
//! atomically as one unit, generating serial numbers where missing and
//! deducting company credits for internally processed batches.

pub mod types;


pub use types::{
    ImportBatch, ImportItem, ImportOutcome, PaymentMethod, ProcessingMethod, Registration,
    RegistrationStatus,
};

use crate::core::runner::types::BatchUpdate;
use crate::core::status::BatchStatus;
use crate::services::notifier::{BatchNotice, NoticeKind, Notifier};
use crate::services::registration::SerialNumbers;
use crate::storage::BatchStore;
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Device category whose items get a generated serial number when missing
const SERIAL_DEVICE_TYPE: &str = "smartphone";

/// Processes one staged import batch per invocation
pub struct ImportProcessor {
    store: Arc<dyn BatchStore>,
    serials: Option<Arc<dyn SerialNumbers>>,
    notifier: Option<Arc<dyn Notifier>>,
    /// Fixed pause after each serial generation call
    delay: Duration,
}

impl ImportProcessor {
    /// Create a processor with the default one-second inter-call delay
    pub fn new(store: Arc<dyn BatchStore>) -> Self {
        Self {
            store,
            serials: None,
            notifier: None,
            delay: Duration::from_secs(1),
        }
    }

    /// Attach a serial number source
    pub fn with_serials(mut self, serials: Arc<dyn SerialNumbers>) -> Self {
        self.serials = Some(serials);
        self
    }

    /// Attach a summary notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Override the inter-call delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Process the import batch and leave it in a terminal status.
    pub async fn run(&self, batch_id: &str) -> Result<ImportOutcome> {
        match self.execute(batch_id).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!("import batch {} failed: {}", batch_id, err);
                let update = BatchUpdate::failed(err.to_string());
                if let Err(write_err) = self
                    .store
                    .update_import_batch_status(batch_id, &update)
                    .await
                {
                    error!(
                        "could not mark import batch {} as failed: {}",
                        batch_id, write_err
                    );
                }
                Err(err)
            }
        }
    }

    async fn execute(&self, batch_id: &str) -> Result<ImportOutcome> {
        let batch = self.store.get_import_batch(batch_id).await?;
        info!(
            "processing import batch {} for company {} ({:?})",
            batch.id, batch.company_id, batch.processing_method
        );

        if batch.status == BatchStatus::Completed {
            info!("import batch {} is already completed", batch_id);
            return Ok(ImportOutcome {
                batch_id: batch_id.to_string(),
                created: 0,
                credits_deducted: 0,
            });
        }

        let mut status = batch.status;
        if status != BatchStatus::InProgress {
            status = status.transition_to(BatchStatus::InProgress)?;
            self.store
                .update_import_batch_status(batch_id, &BatchUpdate::in_progress())
                .await?;
        }

        let items = self.store.import_items(batch_id).await?;
        if items.is_empty() {
            warn!("import batch {} has no items", batch_id);
            status.transition_to(BatchStatus::Completed)?;
            self.store
                .update_import_batch_status(batch_id, &BatchUpdate::completed())
                .await?;
            return Ok(ImportOutcome {
                batch_id: batch_id.to_string(),
                created: 0,
                credits_deducted: 0,
            });
        }

        let mut registrations = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut registration = self.derive_registration(&batch, item, index);
            self.fill_serial_number(&mut registration).await;
            registrations.push(registration);
        }

        // One atomic commit for the whole batch.
        self.store.create_registrations(&registrations).await?;
        info!(
            "import batch {}: committed {} registrations",
            batch_id,
            registrations.len()
        );

        let credits_deducted = if batch.processing_method == ProcessingMethod::Internal {
            let delta = -(registrations.len() as i64);
            self.store
                .adjust_company_credits(&batch.company_id, delta)
                .await?;
            -delta
        } else {
            0
        };

        status.transition_to(BatchStatus::Completed)?;
        self.store
            .update_import_batch_status(batch_id, &BatchUpdate::completed())
            .await?;

        self.notify(&batch, registrations.len()).await;

        Ok(ImportOutcome {
            batch_id: batch_id.to_string(),
            created: registrations.len(),
            credits_deducted,
        })
    }

    /// Build the registration record for one staged item.
    fn derive_registration(
        &self,
        batch: &ImportBatch,
        item: &ImportItem,
        index: usize,
    ) -> Registration {
        let now = Utc::now();
        let internal = batch.processing_method == ProcessingMethod::Internal;

        Registration {
            order_number: format!("CR-{}-{}", now.timestamp_millis(), index),
            user_id: batch.user_id.clone(),
            company_id: batch.company_id.clone(),
            customer_name: batch.customer_name.clone(),
            customer_email: batch.customer_email.clone(),
            payment_method: if internal {
                PaymentMethod::Credits
            } else {
                PaymentMethod::Manual
            },
            status: if internal {
                RegistrationStatus::Received
            } else {
                RegistrationStatus::PendingSubmission
            },
            created_at: now,
            payment_date: internal.then_some(now),
            batch_id: batch.id.clone(),
            device_type: item.device_type.clone(),
            brand: item.brand.clone(),
            model: item.model.clone(),
            serial_number: item.serial_number.clone(),
            imei1: item.imei1.clone(),
            imei2: item.imei2.clone(),
        }
    }

    /// Generate a serial number for smartphones that lack one. Failure is
    /// non-fatal; the registration proceeds without a serial.
    async fn fill_serial_number(&self, registration: &mut Registration) {
        if registration.device_type.as_deref() != Some(SERIAL_DEVICE_TYPE)
            || registration.serial_number.is_some()
        {
            return;
        }
        let Some(serials) = &self.serials else {
            return;
        };

        let brand = registration.brand.clone().unwrap_or_default();
        let model = registration.model.clone().unwrap_or_default();

        match serials.generate(&brand, &model).await {
            Ok(serial) => {
                info!(
                    "generated serial {} for {} {} (order {})",
                    serial, brand, model, registration.order_number
                );
                registration.serial_number = Some(serial);
            }
            Err(e) => {
                warn!(
                    "serial generation failed for {} {}: {}; continuing without it",
                    brand, model, e
                );
            }
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Fire the summary notice. Failures are logged and swallowed.
    async fn notify(&self, batch: &ImportBatch, created: usize) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let notice = BatchNotice {
            kind: NoticeKind::ImportCompleted,
            batch_id: batch.id.clone(),
            company_id: batch.company_id.clone(),
            recipient: batch.customer_email.clone(),
            recipient_name: batch.customer_name.clone(),
            item_count: created,
        };

        if let Err(e) = notifier.batch_completed(&notice).await {
            warn!("summary notice for import batch {} failed: {}", batch.id, e);
        }
    }
}
