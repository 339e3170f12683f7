//! Filesystem storage implementation
//!
//! This module provides a `std::fs` based implementation of the Storage trait.

use crate::storage::traits::{Storage, StorageError, StorageResult};
use std::fs;
use std::path::Path;

/// Writes mirror output directly to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl FileStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FileStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        fs::create_dir_all(path).map_err(|source| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::NoParent(path.to_path_buf()))?;
        if !parent.as_os_str().is_empty() {
            self.create_dir_all(parent)?;
        }

        fs::write(path, contents).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
