//! Batch runner entrypoint
//!
//! One invocation processes one batch and exits. Exit code is non-zero on
//! any fatal error so the external scheduler can alert on failures.

use clap::{Parser, Subcommand};
use imei_batch_rs::core::importer::ImportProcessor;
use imei_batch_rs::core::runner::BatchRunner;
use imei_batch_rs::services::{HttpVerifier, RegistrationApi};
use imei_batch_rs::storage::FirestoreStore;
use imei_batch_rs::utils::logging;
use imei_batch_rs::{Config, Result};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "batch-runner",
    about = "Batch verification and import processing for device registrations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify every pending item of a batch against the IMEI service
    Verify {
        /// Batch to process
        #[arg(long, env = "BATCH_ID")]
        batch_id: String,
    },
    /// Convert a staged import batch into registration records
    Import {
        /// Import batch to process
        #[arg(long, env = "BATCH_ID")]
        batch_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let client = reqwest::Client::new();

    let store = Arc::new(FirestoreStore::new(client.clone(), &config.store)?);

    // The registration backend is optional: without an API key the runner
    // still verifies, it just cannot notify or generate serial numbers.
    let registration = if config.registration.api_key.is_some() {
        Some(Arc::new(RegistrationApi::new(
            client.clone(),
            &config.registration,
        )?))
    } else {
        warn!("REGISTRATION_API_KEY not set; notifications and serial generation disabled");
        None
    };

    match cli.command {
        Command::Verify { batch_id } => {
            let verifier = Arc::new(HttpVerifier::new(client, &config.verifier));
            let mut runner =
                BatchRunner::new(store, verifier).with_delay(config.verifier.delay);
            if let Some(api) = &registration {
                runner = runner.with_notifier(api.clone()).with_orders(api.clone());
            }

            let outcome = runner.run(&batch_id).await?;
            info!(
                "batch {} done: {} items verified",
                outcome.batch_id, outcome.verified
            );
        }
        Command::Import { batch_id } => {
            let mut processor =
                ImportProcessor::new(store).with_delay(config.verifier.delay);
            if let Some(api) = &registration {
                processor = processor
                    .with_serials(api.clone())
                    .with_notifier(api.clone());
            }

            let outcome = processor.run(&batch_id).await?;
            info!(
                "import batch {} done: {} registrations created, {} credits deducted",
                outcome.batch_id, outcome.created, outcome.credits_deducted
            );
        }
    }

    Ok(())
}
