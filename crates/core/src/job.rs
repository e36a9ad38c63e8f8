//! The job abstraction: one input document's dispatch/completion lifecycle.
//!
//! A [`Job`] is created fresh for every input file in a batch, is owned by
//! exactly one worker task from dispatch through completion, and becomes
//! immutable once its status reaches a terminal value.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::files;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// SourceRef
// ---------------------------------------------------------------------------

/// Where a job's input document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A file on the local filesystem, embedded base64 at dispatch time.
    Path(PathBuf),
    /// An http(s) URL the provider fetches itself.
    Url(String),
}

impl SourceRef {
    /// Classify a raw input string: anything starting with `http://` or
    /// `https://` is a URL, everything else a local path.
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::Path(PathBuf::from(input))
        }
    }

    /// File stem used in correlation ids and result file names.
    ///
    /// For URLs this is the stem of the last path segment, with any query
    /// string or fragment stripped. Falls back to `"document"` when the
    /// URL carries no usable segment.
    pub fn stem(&self) -> String {
        match self {
            Self::Path(p) => files::file_stem(p),
            Self::Url(u) => {
                // Host-only URLs have no path segment to name a file after.
                let rest = u.split_once("://").map_or(u.as_str(), |(_, r)| r);
                let rest = rest.split(['?', '#']).next().unwrap_or("");
                let segment = match rest.split_once('/') {
                    Some((_, path)) => path.trim_end_matches('/').rsplit('/').next().unwrap_or(""),
                    None => "",
                };
                let stem = files::file_stem(Path::new(segment));
                if stem.is_empty() {
                    "document".to_string()
                } else {
                    stem
                }
            }
        }
    }

    /// Directory the result file is written to: next to a local source
    /// file, the current directory for URL sources.
    pub fn result_dir(&self) -> PathBuf {
        match self {
            Self::Path(p) => match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
            Self::Url(_) => PathBuf::from("."),
        }
    }

    /// True when the source carries no path/URL at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Path(p) => p.as_os_str().is_empty(),
            Self::Url(u) => u.is_empty(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Per-job state machine.
///
/// `Created → Dispatched → {Normalized | AwaitingAsyncResult → Retrieved →
/// Normalized | TimedOut}`, with `Failed` reachable from pre-dispatch
/// validation and from any non-success dispatch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Created,
    Dispatched,
    AwaitingAsyncResult,
    Retrieved,
    Normalized,
    Failed,
    TimedOut,
}

impl JobStatus {
    /// Terminal statuses never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Normalized | Self::Failed | Self::TimedOut)
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Raw HTTP response captured at dispatch time.
#[derive(Debug, Clone)]
pub struct JobResponse {
    /// HTTP status code of the dispatch POST.
    pub status: u16,
    /// Raw response body text.
    pub body: String,
}

/// One unit of work: one input document bound to one service descriptor.
#[derive(Debug, Clone)]
pub struct Job {
    /// Input document; required, immutable once set.
    pub source: SourceRef,
    /// Optional instruction text forwarded to the provider.
    pub prompt: Option<String>,
    /// Unique across all concurrently outstanding jobs. Doubles as the
    /// callback `filename` parameter and the expected blob name in the
    /// remote store.
    pub correlation_id: String,
    /// Deterministic local destination for the normalized result.
    pub result_path: PathBuf,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Response captured at dispatch time, if the POST produced one.
    pub response: Option<JobResponse>,
    /// Populated on `Failed` / `TimedOut`.
    pub error: Option<String>,
    /// When the job was constructed by the batch dispatcher.
    pub created_at: Timestamp,
    /// When the job reached a terminal status.
    pub completed_at: Option<Timestamp>,
}

impl Job {
    /// Construct a fresh job for one input.
    ///
    /// The correlation id is `<stem>_<service>_<uuid4>` — unique per job,
    /// never derived solely from the filename, so retries and duplicate
    /// filenames in different directories cannot collide in the shared
    /// store. The result path is `<dir>/<stem>_<service>.json`.
    pub fn new(source: SourceRef, service_name: &str, prompt: Option<&str>) -> Self {
        let stem = source.stem();
        let correlation_id = format!(
            "{stem}_{service_name}_{}",
            uuid::Uuid::new_v4().simple()
        );
        let result_path = source
            .result_dir()
            .join(format!("{stem}_{service_name}.json"));

        Self {
            source,
            prompt: prompt.map(str::to_string),
            correlation_id,
            result_path,
            status: JobStatus::Created,
            response: None,
            error: None,
            created_at: chrono::Utc::now(),
            completed_at: None,
        }
    }

    /// Record the dispatch response and advance to `Dispatched`.
    pub fn mark_dispatched(&mut self, response: JobResponse) {
        self.response = Some(response);
        self.status = JobStatus::Dispatched;
    }

    /// Enter the async wait state after a successful dispatch.
    pub fn mark_awaiting(&mut self) {
        self.status = JobStatus::AwaitingAsyncResult;
    }

    /// The async result blob has been downloaded locally.
    pub fn mark_retrieved(&mut self) {
        self.status = JobStatus::Retrieved;
    }

    /// The result file has been written and normalized. Terminal.
    pub fn mark_normalized(&mut self) {
        self.status = JobStatus::Normalized;
        self.completed_at = Some(chrono::Utc::now());
    }

    /// Record an error and terminate the job as `Failed`.
    pub fn mark_failed(&mut self, error: impl fmt::Display) {
        self.error = Some(error.to_string());
        self.status = JobStatus::Failed;
        self.completed_at = Some(chrono::Utc::now());
    }

    /// The poll budget was exhausted with no blob observed. Terminal.
    pub fn mark_timed_out(&mut self) {
        self.error = Some("request timed out".to_string());
        self.status = JobStatus::TimedOut;
        self.completed_at = Some(chrono::Utc::now());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_urls_and_paths() {
        assert_eq!(
            SourceRef::parse("https://example.com/doc.pdf"),
            SourceRef::Url("https://example.com/doc.pdf".to_string())
        );
        assert_eq!(
            SourceRef::parse("/data/in/doc.pdf"),
            SourceRef::Path(PathBuf::from("/data/in/doc.pdf"))
        );
    }

    #[test]
    fn url_stem_strips_query_and_extension() {
        let src = SourceRef::parse("https://example.com/files/invoice.pdf?token=abc");
        assert_eq!(src.stem(), "invoice");
    }

    #[test]
    fn url_without_segment_falls_back() {
        let src = SourceRef::parse("https://example.com/");
        assert_eq!(src.stem(), "document");
    }

    #[test]
    fn result_path_is_sibling_of_local_source() {
        let job = Job::new(SourceRef::parse("/data/in/a.pdf"), "Extract", None);
        assert_eq!(job.result_path, PathBuf::from("/data/in/a_Extract.json"));
    }

    #[test]
    fn result_path_for_bare_filename_lands_in_cwd() {
        let job = Job::new(SourceRef::parse("a.pdf"), "Extract", None);
        assert_eq!(job.result_path, PathBuf::from("./a_Extract.json"));
    }

    #[test]
    fn correlation_ids_differ_for_identical_inputs() {
        let a = Job::new(SourceRef::parse("/data/a.pdf"), "Extract", None);
        let b = Job::new(SourceRef::parse("/data/a.pdf"), "Extract", None);
        assert_ne!(a.correlation_id, b.correlation_id);
        assert!(a.correlation_id.starts_with("a_Extract_"));
    }

    #[test]
    fn new_job_starts_created_without_error() {
        let job = Job::new(SourceRef::parse("/data/a.pdf"), "Extract", Some("total?"));
        assert_eq!(job.status, JobStatus::Created);
        assert!(job.response.is_none());
        assert!(job.error.is_none());
        assert!(job.completed_at.is_none());
        assert_eq!(job.prompt.as_deref(), Some("total?"));
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Normalized.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::TimedOut.is_terminal());
        assert!(!JobStatus::Created.is_terminal());
        assert!(!JobStatus::Dispatched.is_terminal());
        assert!(!JobStatus::AwaitingAsyncResult.is_terminal());
        assert!(!JobStatus::Retrieved.is_terminal());
    }

    #[test]
    fn mark_timed_out_records_error_and_completion() {
        let mut job = Job::new(SourceRef::parse("/data/a.pdf"), "Extract", None);
        job.mark_timed_out();
        assert_eq!(job.status, JobStatus::TimedOut);
        assert_eq!(job.error.as_deref(), Some("request timed out"));
        assert!(job.completed_at.is_some());
    }
}
