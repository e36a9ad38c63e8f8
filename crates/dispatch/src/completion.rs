//! The two completion strategies that take a dispatched job to a
//! terminal state.
//!
//! Synchronous services return the full result in the dispatch response;
//! asynchronous services deliver it later into the shared object store
//! under the job's correlation id. In both cases the result file on disk
//! is normalized (stable key order, fixed indentation) before the job is
//! marked `Normalized`.
//!
//! Neither function marks a job `Failed` or `TimedOut` — classification
//! of errors onto the job is the batch worker's responsibility, so that
//! forward progress and terminal bookkeeping stay in one place.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use docrelay_core::error::CoreError;
use docrelay_core::files;
use docrelay_core::job::Job;
use docrelay_store::ObjectStore;

use crate::config::PollConfig;
use crate::error::DispatchError;

// ---------------------------------------------------------------------------
// Synchronous completion
// ---------------------------------------------------------------------------

/// Complete a synchronous-service job from its captured response body.
///
/// The body is reformatted via [`files::tidy_json_str`] and written to
/// the job's result path. No waiting, no store interaction.
pub async fn complete_sync(job: &mut Job) -> Result<(), DispatchError> {
    let body = match &job.response {
        Some(response) => response.body.clone(),
        None => {
            return Err(CoreError::InvalidJobState(
                "job has no dispatch response to normalize".to_string(),
            )
            .into())
        }
    };

    let pretty = files::tidy_json_str(&body)?;
    tokio::fs::create_dir_all(result_dir(job)).await?;
    tokio::fs::write(&job.result_path, pretty).await?;
    job.mark_normalized();

    tracing::info!(
        correlation_id = %job.correlation_id,
        result = %job.result_path.display(),
        "Saved response",
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Polling completion
// ---------------------------------------------------------------------------

/// Complete an asynchronous-service job by polling the object store.
///
/// Sleeps `poll_interval` between existence checks, at most
/// `floor(timeout_budget / poll_interval)` times. The wait is local to
/// this job's worker — no lock is shared with sibling jobs. On a hit the
/// blob is downloaded into the result directory, the remote copy deleted
/// (the store is a mailbox; a failed delete is logged, not job-fatal),
/// and the local file normalized in place.
///
/// Returns [`DispatchError::PollTimeout`] when the budget is exhausted
/// with no blob observed — no local file is produced in that case.
pub async fn complete_polling(
    store: &dyn ObjectStore,
    job: &mut Job,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<(), DispatchError> {
    job.mark_awaiting();

    let attempts = config.attempts();
    let started = Instant::now();
    tracing::info!(
        correlation_id = %job.correlation_id,
        attempts,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Waiting for async result",
    );

    let mut observed = false;
    for attempt in 1..=attempts {
        tokio::select! {
            _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
        if store.exists(&job.correlation_id).await? {
            tracing::info!(
                correlation_id = %job.correlation_id,
                attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Async result observed",
            );
            observed = true;
            break;
        }
        tracing::debug!(correlation_id = %job.correlation_id, attempt, "Result not yet available");
    }

    if !observed {
        return Err(DispatchError::PollTimeout);
    }

    let result_dir = result_dir(job);
    let (_, local) = store.download(&job.correlation_id, &result_dir).await?;
    job.mark_retrieved();

    match store.delete(&job.correlation_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(correlation_id = %job.correlation_id, "Remote blob was already gone")
        }
        Err(e) => {
            tracing::warn!(
                correlation_id = %job.correlation_id,
                error = %e,
                "Failed to delete remote blob",
            );
        }
    }

    if local != job.result_path {
        tokio::fs::rename(&local, &job.result_path).await?;
    }
    files::tidy_json_file(&job.result_path)?;
    job.mark_normalized();

    tracing::info!(
        correlation_id = %job.correlation_id,
        result = %job.result_path.display(),
        "Saved response",
    );
    Ok(())
}

/// Directory the job's result file lives in.
fn result_dir(job: &Job) -> PathBuf {
    match job.result_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
