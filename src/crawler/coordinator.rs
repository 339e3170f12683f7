//! Mirror coordinator - main traversal logic
//!
//! This module contains the main mirror loop that coordinates all aspects of
//! the run, including:
//! - Walking the site depth-first through an explicit work-list
//! - Adopting the root page's final URL after redirects
//! - Coordinating fetching, the asset pipeline, rewriting and writing
//! - Deciding which discovered links are eligible pages

use super::assets::AssetPipeline;
use super::fetcher::{Fetched, Fetcher};
use super::parser::{discover_references, PageReferences};
use crate::config::Settings;
use crate::output::MirrorStatistics;
use crate::rewrite::HtmlRewriter;
use crate::state::{PageState, VisitedSet};
use crate::storage::{FileStorage, Storage};
use crate::url::{is_web_scheme, PathMapper};
use crate::MirrorError;
use std::time::Instant;
use url::Url;

/// A page waiting on the work-list
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueuedPage {
    url: Url,
    depth: u32,
}

/// Main mirror structure
///
/// Owns every piece of per-run state: the settings, the transport, the dedup
/// sets and the statistics.
pub struct Mirror<S: Storage = FileStorage> {
    settings: Settings,
    fetcher: Fetcher,
    mapper: PathMapper,
    storage: S,
    visited: VisitedSet,
    stats: MirrorStatistics,
}

impl Mirror<FileStorage> {
    /// Creates a mirror writing to the local filesystem
    pub fn new(settings: Settings) -> Result<Self, MirrorError> {
        Self::with_storage(settings, FileStorage::new())
    }
}

impl<S: Storage> Mirror<S> {
    /// Creates a mirror writing through the given storage backend
    pub fn with_storage(settings: Settings, storage: S) -> Result<Self, MirrorError> {
        let fetcher = Fetcher::new(&settings)?;
        let mapper = PathMapper::new(settings.output_directory.clone(), &settings.root);

        Ok(Self {
            settings,
            fetcher,
            mapper,
            storage,
            visited: VisitedSet::new(),
            stats: MirrorStatistics::new(),
        })
    }

    /// The site root; after [`Self::run`] this is the URL the root page was served at
    pub fn root(&self) -> &Url {
        &self.settings.root
    }

    pub fn statistics(&self) -> &MirrorStatistics {
        &self.stats
    }

    /// Runs the mirror to completion
    ///
    /// Individual page and asset failures are logged and counted; only a failure
    /// to create the output directory ends the run early.
    pub async fn run(&mut self) -> Result<&MirrorStatistics, MirrorError> {
        let start_time = Instant::now();
        let root = self.settings.root.clone();

        tracing::info!(
            url = %root,
            output = %self.settings.output_directory.display(),
            max_depth = self.settings.max_depth,
            "Starting mirror"
        );
        self.storage.create_dir_all(&self.settings.output_directory)?;

        self.visited.insert_page(&root);
        let mut work_list = vec![QueuedPage { url: root, depth: 0 }];

        while let Some(page) = work_list.pop() {
            let children = self.crawl_page(&page).await;

            // Reversed so the first link on a page is the next one popped
            work_list.extend(children.into_iter().rev());
        }

        self.stats.elapsed = start_time.elapsed();
        self.stats.log_summary();
        Ok(&self.stats)
    }

    /// Fetches one page, runs its assets through the pipeline, then rewrites and
    /// writes it
    ///
    /// Only the root page is written at the URL it was served from; any other
    /// page stays at the URL it was requested as, which is what links to it were
    /// rewritten to.
    ///
    /// Returns the page's eligible links, already recorded in the page set.
    async fn crawl_page(&mut self, page: &QueuedPage) -> Vec<QueuedPage> {
        let mut state = PageState::Discovered;
        self.transition(&page.url, &mut state, PageState::Fetching);

        let fetched = match self.fetcher.fetch(&page.url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(url = %page.url, error = %e, "Failed to fetch page");
                self.transition(&page.url, &mut state, PageState::Failed);
                return Vec::new();
            }
        };
        self.transition(&page.url, &mut state, PageState::Fetched);

        let page_url = if page.depth == 0 {
            self.adopt_root(&fetched.final_url);
            fetched.final_url.clone()
        } else {
            page.url.clone()
        };

        let html = String::from_utf8_lossy(&fetched.body).into_owned();
        let references = discover_references(&html, &page_url);

        self.download_references(&references).await;

        match self.write_page(&page_url, &html, &fetched) {
            Ok(()) => self.transition(&page.url, &mut state, PageState::RewrittenAndWritten),
            Err(e) => {
                tracing::error!(url = %page_url, error = %e, "Failed to rewrite or write page");
                self.transition(&page.url, &mut state, PageState::Failed);
            }
        }

        // Eligibility is decided for every link before any of them is fetched
        references
            .links
            .into_iter()
            .filter_map(|url| self.check_page_url(url, page.depth + 1))
            .collect()
    }

    fn transition(&mut self, url: &Url, state: &mut PageState, next: PageState) {
        debug_assert!(state.can_transition_to(next), "{} -> {}", state, next);
        tracing::trace!(url = %url, from = %state, to = %next, "Page state");
        *state = next;
        if next.is_terminal() {
            self.stats.record_page(next);
        }
    }

    /// Makes the served URL of the root page the site root
    fn adopt_root(&mut self, final_url: &Url) {
        if *final_url != self.settings.root {
            tracing::info!(from = %self.settings.root, to = %final_url, "Root page redirected");
            self.settings.root = final_url.clone();
            self.mapper.set_root(final_url);
        }
        self.visited.insert_page(final_url);
    }

    /// Rewrites a page and writes it, replacing any previous copy
    ///
    /// External assets are only relinked when their copy is on disk.
    fn write_page(&self, page_url: &Url, html: &str, fetched: &Fetched) -> Result<(), MirrorError> {
        let is_mirrored = |url: &Url| self.storage.exists(&self.mapper.local_path(url, false));
        let rewriter = HtmlRewriter::new(
            &self.mapper,
            &self.settings.filters,
            &is_mirrored,
            self.settings.skip_index_rewrites,
        );
        let rewritten = rewriter.rewrite_document(page_url, html)?;

        let path = self.mapper.local_path(page_url, true);
        self.storage.write_file(&path, rewritten.as_bytes())?;

        tracing::info!(
            url = %page_url,
            file = %path.display(),
            status = fetched.status,
            "Wrote page"
        );
        Ok(())
    }

    /// Runs stylesheets, scripts and then images through the asset pipeline
    async fn download_references(&mut self, references: &PageReferences) {
        let mut pipeline = AssetPipeline {
            fetcher: &self.fetcher,
            mapper: &self.mapper,
            filters: &self.settings.filters,
            storage: &self.storage,
            visited: &mut self.visited,
            stats: &mut self.stats,
            image_quality: self.settings.image_quality,
        };

        let assets = references
            .stylesheets
            .iter()
            .chain(&references.scripts)
            .chain(&references.images);
        for asset in assets {
            pipeline.fetch_asset(asset).await;
        }
    }

    /// Decides whether a discovered link is crawled as a page
    ///
    /// Checks, in order: scheme, host, page dedup, depth and filters. The path is
    /// recorded in the page set before the depth check, so a link first seen
    /// beyond the depth limit is never crawled later either.
    fn check_page_url(&mut self, mut url: Url, depth: u32) -> Option<QueuedPage> {
        url.set_fragment(None);

        if !is_web_scheme(&url) {
            return None;
        }

        if !self.mapper.is_internal(&url) {
            tracing::debug!(url = %url, "Skipping external page");
            return None;
        }

        if !self.visited.insert_page(&url) {
            return None;
        }

        let max_depth = self.settings.max_depth;
        if max_depth != 0 && depth > max_depth {
            tracing::debug!(url = %url, depth, max_depth, "Skipping page beyond max depth");
            return None;
        }

        if !self.settings.filters.allows(&url) {
            tracing::debug!(url = %url, "Skipping filtered page");
            return None;
        }

        Some(QueuedPage { url, depth })
    }
}
