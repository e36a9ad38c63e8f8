//! Directory-backed object store.
//!
//! Blobs are plain files under a root directory. Used as the local webhook
//! mailbox (a reverse proxy or sync agent lands provider deliveries there)
//! and as the store implementation in tests.

use std::path::{Path, PathBuf};

use crate::{ObjectStore, StoreError};

/// An [`ObjectStore`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Create a store rooted at `root`. The directory is created if it
    /// does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait::async_trait]
impl ObjectStore for FsObjectStore {
    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(self.blob_path(path)).await?)
    }

    async fn download(
        &self,
        path: &str,
        local_dir: &Path,
    ) -> Result<(String, PathBuf), StoreError> {
        let blob = self.blob_path(path);
        if !tokio::fs::try_exists(&blob).await? {
            return Err(StoreError::NotFound(path.to_string()));
        }

        tokio::fs::create_dir_all(local_dir).await?;
        let file_name = blob
            .file_name()
            .ok_or_else(|| StoreError::Backend(format!("Blob path has no file name: {path}")))?;
        let local = local_dir.join(file_name);
        tokio::fs::copy(&blob, &local).await?;

        tracing::debug!(blob = %path, local = %local.display(), "Downloaded blob");
        Ok((path.to_string(), local))
    }

    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(self.blob_path(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exists_reflects_blob_presence() {
        let root = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(root.path()).unwrap();

        assert!(!store.exists("missing").await.unwrap());
        std::fs::write(root.path().join("present"), b"{}").unwrap();
        assert!(store.exists("present").await.unwrap());
    }

    #[tokio::test]
    async fn download_copies_blob_into_local_dir() {
        let root = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(root.path()).unwrap();
        std::fs::write(root.path().join("result-1"), b"{\"a\":1}").unwrap();

        let (remote, local) = store.download("result-1", target.path()).await.unwrap();

        assert_eq!(remote, "result-1");
        assert_eq!(local, target.path().join("result-1"));
        assert_eq!(std::fs::read(&local).unwrap(), b"{\"a\":1}");
        // Remote copy is untouched by a download.
        assert!(store.exists("result-1").await.unwrap());
    }

    #[tokio::test]
    async fn download_of_missing_blob_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(root.path()).unwrap();

        let err = store.download("nope", target.path()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_reports_whether_blob_existed() {
        let root = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(root.path()).unwrap();
        std::fs::write(root.path().join("gone-soon"), b"{}").unwrap();

        assert!(store.delete("gone-soon").await.unwrap());
        assert!(!store.delete("gone-soon").await.unwrap());
        assert!(!store.exists("gone-soon").await.unwrap());
    }
}
