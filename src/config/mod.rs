//! Configuration management for the batch runner
//!
//! All configuration comes from environment variables (a local `.env` file is
//! honored through dotenvy in the binary). The target batch id is a CLI/env
//! argument, not part of this struct.

use crate::utils::error::{Result, RunnerError};
use std::env;
use std::time::Duration;
use tracing::debug;

/// Default base URL of the external IMEI verification service.
pub const DEFAULT_VERIFIER_URL: &str = "https://verificador-imei.onrender.com";

/// Default base URL of the registration backend.
pub const DEFAULT_HOST_URL: &str = "https://registroimeimultibanda.cl";

/// Main configuration struct for the batch runner
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store configuration
    pub store: StoreConfig,
    /// Verification service configuration
    pub verifier: VerifierConfig,
    /// Registration backend configuration
    pub registration: RegistrationConfig,
}

/// Document store (Firestore) configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base64-encoded service account credentials JSON
    pub credentials_b64: String,
}

/// External verification service configuration
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Base URL of the verification service
    pub base_url: String,
    /// Per-call request timeout
    pub timeout: Duration,
    /// Fixed delay inserted after each verification call
    pub delay: Duration,
}

/// Registration backend configuration
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Base URL of the registration backend
    pub host_url: String,
    /// Bearer API key; notifications and serial generation are skipped when absent
    pub api_key: Option<String>,
    /// Per-call request timeout
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment variables");

        let credentials_b64 = env::var("FIREBASE_CREDENTIALS_B64").map_err(|_| {
            RunnerError::Config("FIREBASE_CREDENTIALS_B64 is not set".to_string())
        })?;

        let config = Self {
            store: StoreConfig { credentials_b64 },
            verifier: VerifierConfig {
                base_url: env::var("VERIFIER_URL")
                    .unwrap_or_else(|_| DEFAULT_VERIFIER_URL.to_string()),
                timeout: Duration::from_secs(parse_env_u64("VERIFIER_TIMEOUT_SECS", 20)?),
                delay: Duration::from_millis(parse_env_u64("VERIFY_DELAY_MS", 1000)?),
            },
            registration: RegistrationConfig {
                host_url: env::var("HOST_URL").unwrap_or_else(|_| DEFAULT_HOST_URL.to_string()),
                api_key: env::var("REGISTRATION_API_KEY").ok().filter(|k| !k.is_empty()),
                timeout: Duration::from_secs(parse_env_u64("REGISTRATION_TIMEOUT_SECS", 20)?),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.store.credentials_b64.trim().is_empty() {
            return Err(RunnerError::Config(
                "FIREBASE_CREDENTIALS_B64 must not be empty".to_string(),
            ));
        }
        if !self.verifier.base_url.starts_with("http") {
            return Err(RunnerError::Config(format!(
                "Invalid verifier URL: {}",
                self.verifier.base_url
            )));
        }
        if !self.registration.host_url.starts_with("http") {
            return Err(RunnerError::Config(format!(
                "Invalid registration host URL: {}",
                self.registration.host_url
            )));
        }
        if self.verifier.timeout.is_zero() {
            return Err(RunnerError::Config(
                "Verifier timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| RunnerError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
