use docrelay_core::error::CoreError;
use docrelay_store::StoreError;

/// Errors produced while driving a job from dispatch to completion.
///
/// Per-job errors are recorded on the job by the batch worker, never
/// propagated across the join barrier; the batch caller inspects each
/// job's terminal status instead.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Pre-dispatch validation or payload construction failure
    /// (missing/empty source, unreadable file). Raised before any
    /// network call.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The dispatch POST returned a non-success status code. Never
    /// retried; the job terminates `Failed` without completion waiting.
    #[error("Request failed with HTTP {status}: {body}")]
    RequestFailure {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The async result never appeared within the poll budget.
    #[error("request timed out")]
    PollTimeout,

    /// Object store failure after the blob was confirmed to exist.
    /// Job-fatal, but never fatal to sibling workers or the batch join.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Local filesystem failure while writing result files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The batch's cancellation token fired while this job was in flight.
    #[error("Batch cancelled")]
    Cancelled,
}
