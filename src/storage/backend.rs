//! Storage backend trait and implementations.
//!
//! The whole project list is persisted as one JSON blob under a single
//! logical key; backends only need raw read/write of that blob:
//! - `FileBackend` - a file in the user data directory (default)
//! - `MemoryBackend` - in-process blob, used to test the store in isolation

use crate::Result;
use std::fs;
use std::path::PathBuf;

/// Name of the blob file holding the full project list.
pub const PROJECTS_FILE: &str = "projects.json";

/// Trait for storage backends that hold the persisted project blob.
pub trait StorageBackend: Send {
    /// Read the blob, or `None` if it has never been written.
    fn read_blob(&self) -> Result<Option<String>>;

    /// Write the blob, replacing any prior value.
    fn write_blob(&mut self, content: &str) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;
}

/// File-based backend rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn blob_path(&self) -> PathBuf {
        self.root.join(PROJECTS_FILE)
    }
}

impl StorageBackend for FileBackend {
    fn read_blob(&self) -> Result<Option<String>> {
        let path = self.blob_path();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write_blob(&mut self, content: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.blob_path(), content)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.blob_path().display().to_string()
    }
}

/// In-memory backend for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blob: Option<String>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-seeded with blob content.
    pub fn with_blob(content: impl Into<String>) -> Self {
        Self {
            blob: Some(content.into()),
        }
    }

    /// Inspect the current blob content.
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl StorageBackend for MemoryBackend {
    fn read_blob(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn write_blob(&mut self, content: &str) -> Result<()> {
        self.blob = Some(content.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
