//! Concurrent fan-out of one batch of inputs over a service descriptor.
//!
//! The batcher expands an input specification into concrete sources,
//! constructs one fresh [`Job`] per source, runs every job's full
//! dispatch + completion lifecycle on its own tokio task, and joins all
//! of them before returning. Jobs come back in construction order,
//! regardless of completion order, each in a terminal state.
//!
//! No job, and no mutable descriptor state, is ever shared between
//! workers: each task owns its job and a clone of the descriptor. The
//! join barrier is the only synchronization point.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use docrelay_core::descriptor::ServiceDescriptor;
use docrelay_core::files;
use docrelay_core::job::{Job, SourceRef};
use docrelay_store::ObjectStore;

use crate::client::DispatchClient;
use crate::completion;
use crate::config::PollConfig;
use crate::error::DispatchError;

// ---------------------------------------------------------------------------
// BatchInput
// ---------------------------------------------------------------------------

/// Input specification for one batch.
#[derive(Debug, Clone)]
pub enum BatchInput {
    /// A single path. A directory expands to its immediate
    /// (non-recursive) files; anything else is a one-element batch.
    Path(PathBuf),
    /// An explicit list of file paths, used as-is.
    Paths(Vec<PathBuf>),
    /// A single remote document URL.
    Url(String),
}

impl BatchInput {
    /// Resolve the specification to a concrete list of sources.
    pub fn resolve(&self) -> Result<Vec<SourceRef>, DispatchError> {
        match self {
            Self::Path(path) if path.is_dir() => Ok(files::immediate_files(path)?
                .into_iter()
                .map(SourceRef::Path)
                .collect()),
            Self::Path(path) => Ok(vec![SourceRef::Path(path.clone())]),
            Self::Paths(paths) => Ok(paths.iter().cloned().map(SourceRef::Path).collect()),
            Self::Url(url) => Ok(vec![SourceRef::Url(url.clone())]),
        }
    }
}

impl From<&str> for BatchInput {
    fn from(input: &str) -> Self {
        match SourceRef::parse(input) {
            SourceRef::Url(url) => Self::Url(url),
            SourceRef::Path(path) => Self::Path(path),
        }
    }
}

impl From<PathBuf> for BatchInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<PathBuf>> for BatchInput {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::Paths(paths)
    }
}

// ---------------------------------------------------------------------------
// Batcher
// ---------------------------------------------------------------------------

/// Runs batches of jobs against external document services.
pub struct Batcher {
    client: DispatchClient,
    store: Arc<dyn ObjectStore>,
    config: PollConfig,
}

impl Batcher {
    /// Create a batcher over the given object store and poll settings.
    pub fn new(store: Arc<dyn ObjectStore>, config: PollConfig) -> Self {
        Self {
            client: DispatchClient::new(),
            store,
            config,
        }
    }

    /// Create a batcher with a pre-built dispatch client (tests, custom
    /// timeouts).
    pub fn with_client(
        client: DispatchClient,
        store: Arc<dyn ObjectStore>,
        config: PollConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Run one batch to completion. See [`Self::run_with_cancel`].
    pub async fn run(
        &self,
        descriptor: &ServiceDescriptor,
        input: BatchInput,
        prompt: Option<&str>,
    ) -> Result<Vec<Job>, DispatchError> {
        self.run_with_cancel(descriptor, input, prompt, CancellationToken::new())
            .await
    }

    /// Run one batch to completion with an external cancellation signal.
    ///
    /// Returns `Err` only for batch-level problems (invalid descriptor,
    /// unreadable input directory) detected before any job is launched.
    /// Per-job failures and timeouts are recorded on the jobs themselves:
    /// the returned list always contains every constructed job, in
    /// construction order, each with a terminal status. One job's failure
    /// never cancels or blocks its siblings.
    pub async fn run_with_cancel(
        &self,
        descriptor: &ServiceDescriptor,
        input: BatchInput,
        prompt: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Vec<Job>, DispatchError> {
        descriptor.validate()?;
        let sources = input.resolve()?;
        tracing::info!(
            service = %descriptor.name,
            jobs = sources.len(),
            is_async = descriptor.is_async,
            "Starting batch",
        );

        // One worker per job, unbounded by batch size. Each task owns its
        // job; the snapshot lets a panicked task still be folded into the
        // result list as a Failed job.
        let mut snapshots = Vec::with_capacity(sources.len());
        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            let job = Job::new(source, &descriptor.name, prompt);
            snapshots.push(job.clone());

            let client = self.client.clone();
            let store = Arc::clone(&self.store);
            let descriptor = descriptor.clone();
            let config = self.config;
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                run_to_completion(client, store, descriptor, job, config, cancel).await
            }));
        }

        // Join barrier: every job is terminal before we return, in
        // construction order regardless of completion order.
        let results = futures::future::join_all(handles).await;
        let mut jobs = Vec::with_capacity(results.len());
        for (snapshot, result) in snapshots.into_iter().zip(results) {
            match result {
                Ok(job) => jobs.push(job),
                Err(e) => {
                    tracing::error!(
                        correlation_id = %snapshot.correlation_id,
                        error = %e,
                        "Worker task aborted",
                    );
                    let mut job = snapshot;
                    job.mark_failed(format!("worker task aborted: {e}"));
                    jobs.push(job);
                }
            }
        }

        let completed = jobs
            .iter()
            .filter(|j| j.status == docrelay_core::job::JobStatus::Normalized)
            .count();
        tracing::info!(
            service = %descriptor.name,
            total = jobs.len(),
            completed,
            "Batch finished",
        );
        Ok(jobs)
    }
}

/// One worker's full lifecycle: dispatch, then the completion strategy
/// selected by the descriptor. Every error is caught, classified, and
/// recorded on the job — nothing escapes the worker unrecorded.
async fn run_to_completion(
    client: DispatchClient,
    store: Arc<dyn ObjectStore>,
    descriptor: ServiceDescriptor,
    mut job: Job,
    config: PollConfig,
    cancel: CancellationToken,
) -> Job {
    tracing::info!(
        source = %job.source,
        correlation_id = %job.correlation_id,
        service = %descriptor.name,
        "Processing",
    );

    if let Err(e) = client.dispatch(&descriptor, &mut job, &cancel).await {
        tracing::error!(source = %job.source, error = %e, "Dispatch failed");
        job.mark_failed(e);
        return job;
    }

    let outcome = if descriptor.is_async {
        completion::complete_polling(store.as_ref(), &mut job, &config, &cancel).await
    } else {
        completion::complete_sync(&mut job).await
    };

    match outcome {
        Ok(()) => {}
        Err(DispatchError::PollTimeout) => {
            tracing::warn!(
                source = %job.source,
                correlation_id = %job.correlation_id,
                "No async result within the timeout budget",
            );
            job.mark_timed_out();
        }
        Err(e) => {
            tracing::error!(source = %job.source, error = %e, "Completion failed");
            job.mark_failed(e);
        }
    }

    job
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
