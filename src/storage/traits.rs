//! Storage traits and error types
//!
//! This module defines the trait interface for mirror output backends and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no parent directory: {0}")]
    NoParent(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for mirror output backends
///
/// Paths handed to a backend are already mapped from URLs; the backend only
/// decides how bytes reach them.
pub trait Storage {
    /// Returns true if something already exists at `path`
    ///
    /// Assets that exist are not downloaded again.
    fn exists(&self, path: &Path) -> bool;

    /// Creates `path` and every missing parent directory
    fn create_dir_all(&self, path: &Path) -> StorageResult<()>;

    /// Writes `contents` to `path`, replacing any existing file
    ///
    /// Parent directories are created as needed.
    fn write_file(&self, path: &Path, contents: &[u8]) -> StorageResult<()>;
}
