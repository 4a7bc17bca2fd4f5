//! Item verification client
//!
//! One identifier in, one free-form classification string out. The production
//! implementation posts to the external verification service; the trait seam
//! lets tests script responses.

use crate::config::VerifierConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure modes of a single verification call.
///
/// These are data, not run failures: the runner records a sentinel result for
/// the affected subject and keeps going.
#[derive(Error, Debug, Clone)]
pub enum VerifyError {
    /// The request never produced a usable HTTP response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but could not be interpreted
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Result alias for verification calls
pub type VerifyResult = std::result::Result<String, VerifyError>;

/// Client for the external verification service
#[async_trait]
pub trait VerifierClient: Send + Sync {
    /// Verify one subject and return the raw classification text.
    ///
    /// The subject is already trimmed and non-empty; blank subjects are
    /// short-circuited by the caller without a network call.
    async fn verify(&self, subject: &str) -> VerifyResult;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    imei: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    resultado: Option<String>,
}

/// HTTP implementation against the verification service
pub struct HttpVerifier {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpVerifier {
    /// Create a new verifier from a shared HTTP client and config
    pub fn new(client: reqwest::Client, config: &VerifierConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/verificar", self.base_url)
    }
}

#[async_trait]
impl VerifierClient for HttpVerifier {
    async fn verify(&self, subject: &str) -> VerifyResult {
        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&VerifyRequest { imei: subject })
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Unexpected(e.to_string()))?;

        body.resultado
            .ok_or_else(|| VerifyError::Unexpected("missing `resultado` field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VERIFIER_URL;

    #[test]
    fn test_endpoint_has_no_double_slash() {
        let config = VerifierConfig {
            base_url: format!("{}/", DEFAULT_VERIFIER_URL),
            timeout: Duration::from_secs(20),
            delay: Duration::from_millis(0),
        };
        let verifier = HttpVerifier::new(reqwest::Client::new(), &config);
        assert_eq!(
            verifier.endpoint(),
            format!("{}/verificar", DEFAULT_VERIFIER_URL)
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(VerifyRequest { imei: "111111111111111" }).unwrap();
        assert_eq!(json, serde_json::json!({"imei": "111111111111111"}));
    }

    #[test]
    fn test_response_field_name() {
        let body: VerifyResponse =
            serde_json::from_str(r#"{"resultado": "Equipo se encuentra inscrito."}"#).unwrap();
        assert_eq!(body.resultado.as_deref(), Some("Equipo se encuentra inscrito."));

        let body: VerifyResponse = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(body.resultado.is_none());
    }
}
