//! Statistics gathered during a mirror run
//!
//! A run never fails as a whole once it has started, so these counters are how
//! a user learns how complete the mirror is.

use crate::state::{AssetKind, PageState};
use std::collections::HashMap;
use std::time::Duration;

/// What happened to an asset handed to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetOutcome {
    /// Fetched and written
    Downloaded,
    /// The mapped file was already on disk
    AlreadyOnDisk,
    /// Rejected by include/exclude patterns or an unsupported scheme
    Filtered,
    /// Fetch or write failed
    Failed,
}

impl AssetOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downloaded => "downloaded",
            Self::AlreadyOnDisk => "already on disk",
            Self::Filtered => "filtered",
            Self::Failed => "failed",
        }
    }
}

/// Mirror statistics summary
#[derive(Debug, Clone, Default)]
pub struct MirrorStatistics {
    /// Count of pages by terminal state
    pub pages_by_state: HashMap<PageState, u64>,

    /// Count of assets by outcome
    pub assets_by_outcome: HashMap<AssetOutcome, u64>,

    /// Downloaded assets per kind
    pub downloads_by_kind: HashMap<AssetKind, u64>,

    /// Bytes written to disk
    pub bytes_written: u64,

    pub elapsed: Duration,
}

impl MirrorStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    pub fn record_asset(&mut self, kind: AssetKind, outcome: AssetOutcome) {
        *self.assets_by_outcome.entry(outcome).or_insert(0) += 1;
        if outcome == AssetOutcome::Downloaded {
            *self.downloads_by_kind.entry(kind).or_insert(0) += 1;
        }
    }

    pub fn record_bytes(&mut self, bytes: usize) {
        self.bytes_written += bytes as u64;
    }

    pub fn pages(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn assets(&self, outcome: AssetOutcome) -> u64 {
        self.assets_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Logs the summary at `info` level
    pub fn log_summary(&self) {
        tracing::info!(
            pages_written = self.pages(PageState::RewrittenAndWritten),
            pages_failed = self.pages(PageState::Failed),
            elapsed = ?self.elapsed,
            "Mirror completed"
        );
        tracing::info!(
            downloaded = self.assets(AssetOutcome::Downloaded),
            already_on_disk = self.assets(AssetOutcome::AlreadyOnDisk),
            filtered = self.assets(AssetOutcome::Filtered),
            failed = self.assets(AssetOutcome::Failed),
            bytes_written = self.bytes_written,
            "Assets"
        );
    }
}

/// Prints statistics to the console in a formatted way
pub fn print_statistics(stats: &MirrorStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Pages:");
    for state in [PageState::RewrittenAndWritten, PageState::Failed] {
        println!("  {:<16} {:>8}", state.as_str(), stats.pages(state));
    }

    println!("\nAssets:");
    for outcome in [
        AssetOutcome::Downloaded,
        AssetOutcome::AlreadyOnDisk,
        AssetOutcome::Filtered,
        AssetOutcome::Failed,
    ] {
        println!("  {:<16} {:>8}", outcome.as_str(), stats.assets(outcome));
    }

    if !stats.downloads_by_kind.is_empty() {
        println!("\nDownloads by kind:");
        let mut kinds: Vec<_> = stats.downloads_by_kind.iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(a.1).then(a.0.as_str().cmp(b.0.as_str())));
        for (kind, count) in kinds {
            println!("  {:<16} {:>8}", kind.as_str(), count);
        }
    }

    println!("\nBytes written: {}", stats.bytes_written);
    println!("Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
}
