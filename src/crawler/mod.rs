//! Crawler module for fetching and mirroring a site
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching
//! - Reference discovery in fetched pages
//! - The asset pipeline (dedup, filter, fetch, process, write)
//! - Overall traversal coordination

mod assets;
mod coordinator;
mod fetcher;
mod parser;

pub use assets::{reencode_image, AssetPipeline, AssetProcessor};
pub use coordinator::Mirror;
pub use fetcher::{build_http_client, Fetched, Fetcher};
pub use parser::{discover_references, PageReferences};

use crate::config::Settings;
use crate::output::MirrorStatistics;
use crate::MirrorError;

/// Runs a complete mirror operation
///
/// This is the main entry point for mirroring a site. It will:
/// 1. Build the HTTP client
/// 2. Fetch the root page and adopt its final URL
/// 3. Download the assets each page references
/// 4. Rewrite and write every page within the depth limit
/// 5. Log a summary
pub async fn mirror(settings: Settings) -> Result<MirrorStatistics, MirrorError> {
    let mut mirror = Mirror::new(settings)?;
    let stats = mirror.run().await?;
    Ok(stats.clone())
}
