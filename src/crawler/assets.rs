//! Asset pipeline
//!
//! Every image, stylesheet and script a page references goes through
//! [`AssetPipeline::fetch_asset`]:
//!
//! 1. Dedup: internal assets by path, external assets by full URL
//! 2. Filter: include/exclude patterns and http(s) scheme
//! 3. Existence: files already in the mirror are not downloaded again
//! 4. Fetch, process, write
//!
//! Images referenced by a stylesheet are run through the same gates before the
//! stylesheet is relinked.
//!
//! Failures are logged and counted; they never abort the run.

use super::fetcher::Fetcher;
use super::parser::resolve_link;
use crate::css::{process_style, relink_style};
use crate::output::{AssetOutcome, MirrorStatistics};
use crate::rewrite::local_reference;
use crate::state::{Asset, AssetKind, VisitedSet};
use crate::storage::Storage;
use crate::url::{is_web_scheme, FilterSet, PathMapper};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use url::Url;

/// Per-kind transformation applied to an asset's bytes before it is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetProcessor {
    /// Relinks `url()` references and discovers the images they point at
    Stylesheet,
    /// Re-encodes JPEG and PNG images, keeping the result only when smaller
    Image { quality: u8 },
}

impl AssetProcessor {
    /// Picks the processor for an asset kind; scripts and other files have none
    pub fn for_kind(kind: AssetKind, image_quality: u8) -> Option<Self> {
        match kind {
            AssetKind::Stylesheet => Some(Self::Stylesheet),
            AssetKind::Image if image_quality > 0 => Some(Self::Image {
                quality: image_quality,
            }),
            _ => None,
        }
    }
}

/// Borrowed view of the mirror state the pipeline needs
pub struct AssetPipeline<'a, S: Storage> {
    pub fetcher: &'a Fetcher,
    pub mapper: &'a PathMapper,
    pub filters: &'a FilterSet,
    pub storage: &'a S,
    pub visited: &'a mut VisitedSet,
    pub stats: &'a mut MirrorStatistics,
    pub image_quality: u8,
}

impl<S: Storage> AssetPipeline<'_, S> {
    /// Runs one asset through the pipeline
    ///
    /// A stylesheet's images go through the pipeline before the stylesheet
    /// itself is relinked and written, so its references only point at copies
    /// that exist.
    pub async fn fetch_asset(&mut self, asset: &Asset) {
        match AssetProcessor::for_kind(asset.kind, self.image_quality) {
            Some(AssetProcessor::Stylesheet) => self.fetch_stylesheet(asset).await,
            processor => self.fetch_file(asset, processor).await,
        }
    }

    /// Whether the mapped file of an asset is on disk
    fn is_mirrored(&self, url: &Url) -> bool {
        self.storage.exists(&self.mapper.local_path(url, false))
    }

    async fn fetch_stylesheet(&mut self, asset: &Asset) {
        let Some((path, body)) = self.download(asset).await else {
            return;
        };

        let css_url = &asset.url;
        let text = String::from_utf8_lossy(&body).into_owned();
        let (_, references) = process_style(&text, &|raw: &str| resolve_link(raw, css_url));

        let image_processor = AssetProcessor::for_kind(AssetKind::Image, self.image_quality);
        for reference in &references {
            self.fetch_file(&reference.asset, image_processor).await;
        }

        let relative_to_root = self.mapper.relative_to_root(css_url, false);
        let relinked = relink_style(&text, |raw| {
            local_reference(
                self.mapper,
                self.filters,
                css_url,
                &relative_to_root,
                raw,
                false,
                &|target: &Url| self.is_mirrored(target),
            )
        });

        self.store(asset, &path, relinked.into_bytes());
    }

    async fn fetch_file(&mut self, asset: &Asset, processor: Option<AssetProcessor>) {
        let Some((path, body)) = self.download(asset).await else {
            return;
        };

        let bytes = match processor {
            Some(AssetProcessor::Image { quality }) => reencode_image(&asset.url, body, quality),
            _ => body,
        };

        self.store(asset, &path, bytes);
    }

    /// Dedup, filter and existence gates, then the fetch itself
    ///
    /// Returns the mapped path and the body when the asset has to be written.
    async fn download(&mut self, asset: &Asset) -> Option<(PathBuf, Vec<u8>)> {
        let url = &asset.url;

        let first_seen = if self.mapper.is_internal(url) {
            self.visited.insert_asset(url)
        } else {
            self.visited.insert_external_asset(url)
        };
        if !first_seen {
            return None;
        }

        if !is_web_scheme(url) || !self.filters.allows(url) {
            tracing::debug!(url = %url, kind = %asset.kind, "Skipping filtered asset");
            self.stats.record_asset(asset.kind, AssetOutcome::Filtered);
            return None;
        }

        let path = self.mapper.local_path(url, false);
        if self.storage.exists(&path) {
            tracing::debug!(url = %url, file = %path.display(), "Asset already on disk");
            self.stats.record_asset(asset.kind, AssetOutcome::AlreadyOnDisk);
            return None;
        }

        match self.fetcher.fetch(url).await {
            Ok(fetched) => Some((path, fetched.body)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to download asset");
                self.stats.record_asset(asset.kind, AssetOutcome::Failed);
                None
            }
        }
    }

    fn store(&mut self, asset: &Asset, path: &Path, bytes: Vec<u8>) {
        match self.storage.write_file(path, &bytes) {
            Ok(()) => {
                tracing::info!(url = %asset.url, file = %path.display(), kind = %asset.kind, "Downloaded asset");
                self.stats.record_asset(asset.kind, AssetOutcome::Downloaded);
                self.stats.record_bytes(bytes.len());
            }
            Err(e) => {
                tracing::error!(url = %asset.url, error = %e, "Failed to write asset");
                self.stats.record_asset(asset.kind, AssetOutcome::Failed);
            }
        }
    }
}

/// Re-encodes a JPEG at `quality` or recompresses a PNG
///
/// The original bytes are returned when the image cannot be decoded, is in
/// another format, or the re-encoded result is not smaller.
pub fn reencode_image(url: &Url, original: Vec<u8>, quality: u8) -> Vec<u8> {
    let format = match image::guess_format(&original) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        _ => return original,
    };

    let img = match image::load_from_memory_with_format(&original, format) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Failed to decode image, keeping original");
            return original;
        }
    };

    let mut encoded = Vec::new();
    let result = match format {
        ImageFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut encoded, quality).encode_image(&img.to_rgb8())
        }
        _ => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut encoded,
            CompressionType::Best,
            FilterType::Adaptive,
        )),
    };

    match result {
        Ok(()) if encoded.len() < original.len() => {
            tracing::debug!(
                url = %url,
                before = original.len(),
                after = encoded.len(),
                "Re-encoded image"
            );
            encoded
        }
        Ok(()) => original,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Failed to re-encode image, keeping original");
            original
        }
    }
}
