//! Dedup sets owned by a single mirror run
//!
//! Pages and internal assets are keyed by URL path in separate namespaces;
//! external assets are keyed by their full URL since paths on other hosts are not
//! unique. An entry is inserted before anything is fetched, so re-discovering a
//! key never queues it twice, and failed entries are never retried.

use crate::url::page_key;
use std::collections::HashSet;
use url::Url;

/// Visited-state bookkeeping for one run
#[derive(Debug, Default)]
pub struct VisitedSet {
    /// Page paths
    pages: HashSet<String>,
    /// Internal asset paths
    assets: HashSet<String>,
    /// External asset URLs
    external_assets: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page path; returns false if it was already known
    pub fn insert_page(&mut self, url: &Url) -> bool {
        self.pages.insert(page_key(url))
    }

    /// Records an internal asset path; returns false if it was already known
    pub fn insert_asset(&mut self, url: &Url) -> bool {
        self.assets.insert(page_key(url))
    }

    /// Records an external asset URL; returns false if it was already known
    pub fn insert_external_asset(&mut self, url: &Url) -> bool {
        self.external_assets.insert(url.as_str().to_string())
    }
}
