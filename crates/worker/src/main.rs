//! Batch worker binary.
//!
//! Loads a service profile from the environment, runs one batch of jobs
//! over the configured input, and exits non-zero if any job finished in
//! a non-normalized state.

mod config;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docrelay_core::job::JobStatus;
use docrelay_dispatch::{BatchInput, Batcher};
use docrelay_store::FsObjectStore;

use crate::config::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "docrelay_worker=info,docrelay_dispatch=info,docrelay_store=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(
        service = %config.descriptor.name,
        input = %config.input,
        is_async = config.descriptor.is_async,
        "Worker starting",
    );

    let store = match FsObjectStore::new(&config.mailbox_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(dir = %config.mailbox_dir, error = %e, "Cannot open mailbox directory");
            std::process::exit(1);
        }
    };
    let batcher = Batcher::new(store, config.poll);

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling batch");
            signal_token.cancel();
        }
    });

    let jobs = match batcher
        .run_with_cancel(
            &config.descriptor,
            BatchInput::from(config.input.as_str()),
            config.prompt.as_deref(),
            cancel,
        )
        .await
    {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!(error = %e, "Batch failed to start");
            std::process::exit(1);
        }
    };

    let mut failures = 0usize;
    for job in &jobs {
        match job.status {
            JobStatus::Normalized => {
                tracing::info!(
                    source = %job.source,
                    result = %job.result_path.display(),
                    "Job completed",
                );
            }
            status => {
                failures += 1;
                tracing::error!(
                    source = %job.source,
                    status = ?status,
                    error = job.error.as_deref().unwrap_or("unknown"),
                    "Job did not complete",
                );
            }
        }
    }

    tracing::info!(
        total = jobs.len(),
        failed = failures,
        "Worker finished",
    );
    if failures > 0 {
        std::process::exit(1);
    }
}
