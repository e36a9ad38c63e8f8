//! HTTP dispatch client.
//!
//! One `POST` per job: headers `orgId` / `authKey` / `Content-Type:
//! application/json`, body built by the job's service descriptor. The
//! raw response is captured on the job regardless of outcome.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use docrelay_core::descriptor::ServiceDescriptor;
use docrelay_core::error::CoreError;
use docrelay_core::job::{Job, JobResponse, SourceRef};

use crate::error::DispatchError;

/// HTTP request timeout for a single dispatch attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Dispatches jobs to external document services.
///
/// Cheap to clone: the underlying [`reqwest::Client`] pools connections
/// across all concurrently dispatching workers.
#[derive(Debug, Clone)]
pub struct DispatchClient {
    client: reqwest::Client,
}

impl DispatchClient {
    /// Create a client with a pre-configured request timeout.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Dispatch one job to its service.
    ///
    /// Submit-time validation (source set, local file present and
    /// non-empty) fails with [`CoreError::InvalidJobState`] before any
    /// network call. On any HTTP response the job advances to
    /// `Dispatched` with the raw response captured; a non-success status
    /// is classified [`DispatchError::RequestFailure`] — a failed submit
    /// never proceeds to completion waiting and is not retried.
    pub async fn dispatch(
        &self,
        descriptor: &ServiceDescriptor,
        job: &mut Job,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        validate_source(&job.source)?;
        let payload = descriptor.build_payload(job)?;

        let request = self
            .client
            .post(&descriptor.endpoint)
            .header("orgId", &descriptor.org_id)
            .header("authKey", &descriptor.auth_key)
            .json(&payload)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            response = request => response?,
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        job.mark_dispatched(JobResponse {
            status: status.as_u16(),
            body: body.clone(),
        });

        if !status.is_success() {
            tracing::error!(
                source = %job.source,
                status = status.as_u16(),
                body = %body,
                "Dispatch returned non-success status",
            );
            return Err(DispatchError::RequestFailure {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            source = %job.source,
            correlation_id = %job.correlation_id,
            "Job dispatched",
        );
        Ok(())
    }
}

impl Default for DispatchClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Submit-time source validation, performed before any network call.
fn validate_source(source: &SourceRef) -> Result<(), DispatchError> {
    match source {
        SourceRef::Path(path) => {
            if path.as_os_str().is_empty() {
                return Err(CoreError::InvalidJobState(
                    "no source file or URL set".to_string(),
                )
                .into());
            }
            let metadata = std::fs::metadata(path).map_err(|_| {
                CoreError::InvalidJobState(format!(
                    "source file missing: {}",
                    path.display()
                ))
            })?;
            if metadata.len() == 0 {
                return Err(CoreError::InvalidJobState(format!(
                    "source file is empty: {}",
                    path.display()
                ))
                .into());
            }
            Ok(())
        }
        SourceRef::Url(url) if url.is_empty() => Err(CoreError::InvalidJobState(
            "no source file or URL set".to_string(),
        )
        .into()),
        SourceRef::Url(_) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
