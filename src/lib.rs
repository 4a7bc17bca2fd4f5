//! # imei-batch-rs
//!
//! Batch processing for device registrations. One process invocation handles
//! one batch: verify every pending item against the external IMEI
//! verification service and record the results, or convert a staged import
//! batch into registration records. An external scheduler re-invokes the
//! binary; there is no long-running loop.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use imei_batch_rs::core::runner::BatchRunner;
//! use imei_batch_rs::services::HttpVerifier;
//! use imei_batch_rs::storage::FirestoreStore;
//! use imei_batch_rs::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = reqwest::Client::new();
//!
//!     let store = Arc::new(FirestoreStore::new(client.clone(), &config.store)?);
//!     let verifier = Arc::new(HttpVerifier::new(client, &config.verifier));
//!
//!     let runner = BatchRunner::new(store, verifier).with_delay(config.verifier.delay);
//!     let outcome = runner.run("B1").await?;
//!     println!("verified {} items", outcome.verified);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::importer::ImportProcessor;
pub use core::runner::BatchRunner;
pub use core::status::{BatchStatus, ItemStatus};
pub use utils::error::{Result, RunnerError};
