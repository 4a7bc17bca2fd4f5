//! Import batch types

use crate::core::status::BatchStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a staged import batch is paid for and released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingMethod {
    /// Paid from the company's credit balance; registrations start received
    Internal,
    /// Paid manually; registrations wait for submission
    Manual,
}

/// Payment method recorded on a derived registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Deducted from company credits
    Credits,
    /// Settled outside the system
    Manual,
}

/// Initial status of a derived registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationStatus {
    /// Ready for the verification pipeline
    Received,
    /// Waiting for manual payment/submission
    PendingSubmission,
}

/// A staged import batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    /// Batch ID
    pub id: String,
    /// Owning company
    pub company_id: String,
    /// User who uploaded the import
    pub user_id: String,
    /// Customer name for the derived registrations
    pub customer_name: String,
    /// Customer e-mail for the derived registrations and the summary notice
    pub customer_email: String,
    /// How the batch is paid for
    pub processing_method: ProcessingMethod,
    /// Lifecycle status
    pub status: BatchStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One staged device row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportItem {
    /// Item ID
    pub id: String,
    /// Device category, e.g. "smartphone"
    pub device_type: Option<String>,
    /// Device brand
    pub brand: Option<String>,
    /// Device model
    pub model: Option<String>,
    /// Serial number; generated when missing for smartphones
    pub serial_number: Option<String>,
    /// First IMEI
    pub imei1: Option<String>,
    /// Second IMEI
    pub imei2: Option<String>,
}

/// Registration record derived from one import item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Generated order number, also the document id
    pub order_number: String,
    /// User who uploaded the import
    pub user_id: String,
    /// Owning company
    pub company_id: String,
    /// Customer name
    pub customer_name: String,
    /// Customer e-mail
    pub customer_email: String,
    /// Payment method derived from the batch's processing method
    pub payment_method: PaymentMethod,
    /// Initial status derived from the batch's processing method
    pub status: RegistrationStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Payment timestamp; set for internally processed batches
    pub payment_date: Option<DateTime<Utc>>,
    /// Source import batch
    pub batch_id: String,
    /// Device category
    pub device_type: Option<String>,
    /// Device brand
    pub brand: Option<String>,
    /// Device model
    pub model: Option<String>,
    /// Serial number
    pub serial_number: Option<String>,
    /// First IMEI
    pub imei1: Option<String>,
    /// Second IMEI
    pub imei2: Option<String>,
}

/// Summary of one import run, reported by the binary
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Batch that was processed
    pub batch_id: String,
    /// Registrations committed
    pub created: usize,
    /// Credits deducted from the company balance
    pub credits_deducted: i64,
}
