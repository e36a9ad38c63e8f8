//! Remote object store abstraction.
//!
//! Asynchronous document services deliver their results by writing a blob
//! named after the job's correlation id into a store shared between this
//! process and the provider's webhook. The polling completion strategy is
//! the only consumer: it checks for the blob, downloads it, and deletes
//! the remote copy — the store is a mailbox, not long-term storage.
//!
//! Cloud providers (S3, GCS, Firebase, ...) are external implementations
//! of [`ObjectStore`]; this crate ships only the trait and a
//! directory-backed store ([`FsObjectStore`]) for local mailboxes and
//! tests.

use std::path::{Path, PathBuf};

mod fs;

pub use fs::FsObjectStore;

/// Errors from an object store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob does not exist in the store.
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// Filesystem-level failure (local stores, download targets).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure (network, auth, quota, ...).
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Existence-check, download, and delete of blobs by path.
///
/// Implementations must be safe to share across concurrently outstanding
/// jobs; callers disambiguate solely by blob path (the correlation id).
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether a blob exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StoreError>;

    /// Download the blob at `path` into `local_dir`.
    ///
    /// Returns the remote path and the local file it was written to.
    /// Fails with [`StoreError::NotFound`] when the blob does not exist.
    async fn download(&self, path: &str, local_dir: &Path)
        -> Result<(String, PathBuf), StoreError>;

    /// Delete the blob at `path`. Returns `false` when there was nothing
    /// to delete.
    async fn delete(&self, path: &str) -> Result<bool, StoreError>;
}
