//! Storage layer for Trellis data.
//!
//! All state lives in a single JSON document: an array of project records
//! written verbatim under one key (`projects.json` in the data directory).
//! There is no version field; schema evolution is handled entirely by the
//! tolerant migration pass in [`crate::models::migrate`].
//!
//! Both `save_projects` and `load_projects` are best-effort. Failures are
//! logged to stderr and converted to a safe fallback (`save` becomes a no-op,
//! `load` returns an empty list); callers never see a propagated error from
//! this layer.

pub mod backend;

pub use backend::{FileBackend, MemoryBackend, StorageBackend, PROJECTS_FILE};

use crate::models::migrate::migrate_store;
use crate::models::Project;
use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the data directory (used by tests).
pub const DATA_DIR_ENV: &str = "TL_DATA_DIR";

/// Resolve the data directory: `TL_DATA_DIR` > `~/.local/share/trellis`.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|base| base.join("trellis"))
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))
}

/// Build the default file backend rooted at the data directory.
pub fn default_backend() -> Result<FileBackend> {
    Ok(FileBackend::new(data_dir()?))
}

/// Serialize the full project list and write it under the fixed key.
///
/// Whole-list replacement: any prior value is overwritten. Never fails;
/// serialization or write errors are logged and swallowed.
pub fn save_projects(backend: &mut dyn StorageBackend, projects: &[Project]) {
    let blob = match serde_json::to_string(projects) {
        Ok(blob) => blob,
        Err(e) => {
            eprintln!("Warning: failed to serialize projects: {}", e);
            return;
        }
    };
    if let Err(e) = backend.write_blob(&blob) {
        eprintln!(
            "Warning: failed to save projects to {}: {}",
            backend.location(),
            e
        );
    }
}

/// Read and migrate the full project list.
///
/// Returns an empty list when the blob is absent or unparseable; the parse
/// itself is lenient (every record passes through migration), so partial or
/// old-schema documents still load.
pub fn load_projects(backend: &dyn StorageBackend) -> Vec<Project> {
    let blob = match backend.read_blob() {
        Ok(Some(blob)) => blob,
        Ok(None) => return Vec::new(),
        Err(e) => {
            eprintln!(
                "Warning: failed to load projects from {}: {}",
                backend.location(),
                e
            );
            return Vec::new();
        }
    };

    match serde_json::from_str(&blob) {
        Ok(value) => migrate_store(&value),
        Err(e) => {
            eprintln!("Warning: failed to parse stored projects: {}", e);
            Vec::new()
        }
    }
}
