//! Registration backend client
//!
//! One authenticated HTTP client covers the three backend endpoints the
//! batch scripts use: completion e-mails, serial number generation, and
//! pushing a new status onto an order.

use crate::config::RegistrationConfig;
use crate::services::notifier::{BatchNotice, Notifier};
use crate::utils::error::{Result, RunnerError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Order status pushed when a verified subject turns out to be registered.
pub const ORDER_STATUS_READY: &str = "ready";

/// Serial number source for imported devices that lack one
#[async_trait]
pub trait SerialNumbers: Send + Sync {
    /// Generate a serial number for a brand/model pair.
    async fn generate(&self, brand: &str, model: &str) -> Result<String>;
}

/// Downstream order status sink
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Record that the order's device was verified as registered.
    async fn order_verified(&self, order_number: &str) -> Result<()>;
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    to: &'a str,
    data: EmailData<'a>,
}

#[derive(Serialize)]
struct EmailData<'a> {
    name: &'a str,
    #[serde(rename = "batchId")]
    batch_id: &'a str,
    count: usize,
}

#[derive(Deserialize)]
struct SerialResponse {
    #[serde(rename = "serialNumber")]
    serial_number: Option<String>,
}

/// Client for the registration backend API
#[derive(Debug)]
pub struct RegistrationApi {
    client: reqwest::Client,
    host_url: String,
    api_key: String,
    timeout: Duration,
}

impl RegistrationApi {
    /// Create a new client. Returns a config error when no API key is set.
    pub fn new(client: reqwest::Client, config: &RegistrationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| RunnerError::Config("REGISTRATION_API_KEY is not set".to_string()))?;

        Ok(Self {
            client,
            host_url: config.host_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: config.timeout,
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.host_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RunnerError::External(format!(
                "{} returned status {}: {}",
                path, status, text
            )));
        }
        Ok(response)
    }

    /// Ask the backend for a fresh serial number
    pub async fn generate_serial_number(&self, brand: &str, model: &str) -> Result<String> {
        let response = self
            .post_json(
                "/api/generate-serial-number",
                &json!({ "brand": brand, "model": model }),
            )
            .await?;

        let body: SerialResponse = response.json().await?;
        body.serial_number.ok_or_else(|| {
            RunnerError::External("serial number missing from response".to_string())
        })
    }

    /// Push a new status onto an order
    pub async fn update_order_status(&self, order_number: &str, new_status: &str) -> Result<()> {
        self.post_json(
            "/api/update-wc-order",
            &json!({ "orderNumber": order_number, "newStatus": new_status }),
        )
        .await?;

        debug!("order {} pushed to status {}", order_number, new_status);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RegistrationApi {
    async fn batch_completed(&self, notice: &BatchNotice) -> Result<()> {
        let request = EmailRequest {
            kind: notice.kind.as_str(),
            to: &notice.recipient,
            data: EmailData {
                name: &notice.recipient_name,
                batch_id: &notice.batch_id,
                count: notice.item_count,
            },
        };

        self.post_json("/api/send-email", &request)
            .await
            .map_err(|e| RunnerError::Notification(e.to_string()))?;

        debug!("completion notice sent for batch {}", notice.batch_id);
        Ok(())
    }
}

#[async_trait]
impl SerialNumbers for RegistrationApi {
    async fn generate(&self, brand: &str, model: &str) -> Result<String> {
        self.generate_serial_number(brand, model).await
    }
}

#[async_trait]
impl OrderSink for RegistrationApi {
    async fn order_verified(&self, order_number: &str) -> Result<()> {
        self.update_order_status(order_number, ORDER_STATUS_READY)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifier::NoticeKind;

    #[test]
    fn test_email_request_wire_shape() {
        let request = EmailRequest {
            kind: NoticeKind::ImportCompleted.as_str(),
            to: "owner@example.com",
            data: EmailData {
                name: "Owner",
                batch_id: "B1",
                count: 7,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "registration-batch-completed",
                "to": "owner@example.com",
                "data": {"name": "Owner", "batchId": "B1", "count": 7}
            })
        );
    }

    #[test]
    fn test_serial_response_field_name() {
        let body: SerialResponse = serde_json::from_str(r#"{"serialNumber": "SN-1"}"#).unwrap();
        assert_eq!(body.serial_number.as_deref(), Some("SN-1"));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = RegistrationConfig {
            host_url: "https://example.com".to_string(),
            api_key: None,
            timeout: Duration::from_secs(20),
        };
        let err = RegistrationApi::new(reqwest::Client::new(), &config).unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));
    }
}
