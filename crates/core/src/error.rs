#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The job is not in a state that permits the requested operation,
    /// e.g. payload construction with an empty source or dispatch of a
    /// missing local file. Raised before any network call is made.
    #[error("Invalid job state: {0}")]
    InvalidJobState(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
