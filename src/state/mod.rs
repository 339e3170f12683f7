//! State module for tracking mirror progress
//!
//! This module provides the per-run state of a mirror.
//!
//! # Components
//!
//! - `PageState`: lifecycle of a single page (discovered, fetching, written, ...)
//! - `VisitedSet`: dedup sets for pages, internal assets and external assets
//! - `Asset`: a downloadable resource discovered on a page

mod asset;
mod page_state;
mod visited;

// Re-export main types
pub use asset::{Asset, AssetKind};
pub use page_state::PageState;
pub use visited::VisitedSet;
