//! Output module for reporting mirror results
//!
//! This module handles:
//! - Counting what happened to every page and asset
//! - Logging and printing the end-of-run summary

pub mod stats;

pub use stats::{print_statistics, AssetOutcome, MirrorStatistics};
