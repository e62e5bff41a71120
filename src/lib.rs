//! Trellis - a single-user project tracker built around feature trees.
//!
//! This library provides the core functionality for the `tl` CLI tool:
//! projects holding an ordered tree of features, lifecycle tracking,
//! JSON persistence, and AI-assisted tree population.

pub mod action_log;
pub mod ai;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use tempfile::TempDir;

    use crate::storage::backend::FileBackend;

    /// Test environment with an isolated data directory.
    ///
    /// Store and storage tests inject a backend directly, so no
    /// environment variables are involved. Integration tests in
    /// `tests/` set `TL_DATA_DIR` per subprocess instead.
    pub struct TestEnv {
        /// Isolated data storage directory
        pub data_dir: TempDir,
    }

    impl TestEnv {
        /// Create a new test environment with an isolated directory.
        pub fn new() -> Self {
            Self {
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Build a file backend rooted at the isolated directory.
        pub fn file_backend(&self) -> FileBackend {
            FileBackend::new(self.data_dir.path().to_path_buf())
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for Trellis operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Import rejected: {0}")]
    InvalidImport(String),

    #[error("Suggestion service error: {0}")]
    Suggestion(#[from] crate::ai::SuggestionError),

    #[error("Aborted by user")]
    Aborted,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
