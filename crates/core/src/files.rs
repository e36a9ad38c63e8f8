//! Filesystem and JSON normalization helpers.
//!
//! Result files are always re-emitted through [`tidy_json_str`] so that
//! every artifact on disk has stable key ordering and indentation,
//! regardless of which completion path produced it.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

/// List the immediate (non-recursive) files of a directory, sorted by path.
///
/// Subdirectories are skipped; only plain files are returned. Sorting keeps
/// batch construction order deterministic across platforms.
pub fn immediate_files(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File name without its extension. Empty for paths with no file name.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// JSON normalization
// ---------------------------------------------------------------------------

/// Reformat a JSON document: stable (sorted) key order, 2-space indent,
/// trailing newline. Idempotent — tidying already-tidy text is a no-op.
pub fn tidy_json_str(raw: &str) -> Result<String, CoreError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let mut pretty = serde_json::to_string_pretty(&value)?;
    pretty.push('\n');
    Ok(pretty)
}

/// Reformat a JSON file in place via [`tidy_json_str`].
pub fn tidy_json_file(path: &Path) -> Result<(), CoreError> {
    let raw = std::fs::read_to_string(path)?;
    std::fs::write(path, tidy_json_str(&raw)?)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
