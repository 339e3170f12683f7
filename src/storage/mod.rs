//! Storage module for persisting mirror output
//!
//! This module handles every write the mirror makes, including:
//! - Existence checks that let re-runs skip assets already on disk
//! - Creating the directory tree of a mapped path
//! - Writing rewritten pages and processed assets

mod fs;
mod traits;

pub use fs::FileStorage;
pub use traits::{Storage, StorageError, StorageResult};
