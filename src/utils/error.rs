//! Error handling for the batch runner
//!
//! This module defines the error type shared across the crate.

use thiserror::Error;

/// Result type alias for the batch runner
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Main error type for the batch runner
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing batch or document
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document store errors
    #[error("Store error: {0}")]
    Store(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Illegal lifecycle transition
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        /// Status the record currently holds
        from: String,
        /// Status the caller tried to move to
        to: String,
    },

    /// Notification errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// External service errors
    #[error("External service error: {0}")]
    External(String),
}
