//! HTML parser for discovering what a page references
//!
//! This module handles a read-only parse of a fetched page to extract:
//! - Links to follow (from `<a>` tags, in document order)
//! - Images (from `<img src>`, every `<img srcset>` candidate and `url()` inside
//!   `<style>` blocks)
//! - Stylesheets (`<link rel="stylesheet">`)
//! - Scripts (`<script src>`)

use crate::css::process_style;
use crate::rewrite::parse_srcset;
use crate::state::{Asset, AssetKind};
use scraper::{Html, Selector};
use url::Url;

/// Everything a page refers to, resolved against the page URL
#[derive(Debug, Clone, Default)]
pub struct PageReferences {
    /// Links to other pages, in document order
    pub links: Vec<Url>,

    /// Images, including `srcset` candidates and `<style>` backgrounds
    pub images: Vec<Asset>,

    pub stylesheets: Vec<Asset>,

    pub scripts: Vec<Asset>,
}

/// Parses HTML content and extracts every reference the mirror follows
///
/// # Exclusions
///
/// - `javascript:`, `mailto:`, `tel:` and `data:` references
/// - Fragment-only links (same page anchors)
/// - References that do not resolve to an http(s) URL
///
/// # Example
///
/// ```
/// use sumi_mirror::crawler::discover_references;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a><img src="logo.png"></body></html>"#;
/// let base_url = Url::parse("https://example.com/docs/").unwrap();
/// let refs = discover_references(html, &base_url);
///
/// assert_eq!(refs.links[0].as_str(), "https://example.com/page");
/// assert_eq!(refs.images[0].url.as_str(), "https://example.com/docs/logo.png");
/// ```
pub fn discover_references(html: &str, base_url: &Url) -> PageReferences {
    let document = Html::parse_document(html);
    let mut refs = PageReferences::default();

    for href in select_attr(&document, "a[href]", "href") {
        if let Some(url) = resolve_link(&href, base_url) {
            refs.links.push(url);
        }
    }

    for src in select_attr(&document, "img[src]", "src") {
        push_asset(&mut refs.images, &src, base_url, AssetKind::Image);
    }

    for srcset in select_attr(&document, "img[srcset]", "srcset") {
        for candidate in parse_srcset(&srcset) {
            push_asset(&mut refs.images, candidate.url, base_url, AssetKind::Image);
        }
    }

    if let Ok(style_selector) = Selector::parse("style") {
        for element in document.select(&style_selector) {
            let text: String = element.text().collect();
            let (_, style_refs) = process_style(&text, &|raw: &str| resolve_link(raw, base_url));
            refs.images.extend(style_refs.into_iter().map(|r| r.asset));
        }
    }

    for href in select_attr(&document, "link[rel~=\"stylesheet\"][href]", "href") {
        push_asset(&mut refs.stylesheets, &href, base_url, AssetKind::Stylesheet);
    }

    for src in select_attr(&document, "script[src]", "src") {
        push_asset(&mut refs.scripts, &src, base_url, AssetKind::Script);
    }

    refs
}

/// Collects one attribute from every element matching `selector`
fn select_attr(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(|value| value.to_string())
        .collect()
}

fn push_asset(list: &mut Vec<Asset>, raw: &str, base_url: &Url, kind: AssetKind) {
    if let Some(url) = resolve_link(raw, base_url) {
        list.push(Asset::new(url, kind));
    }
}

/// Resolves a reference to an absolute URL and validates it
///
/// Returns None if the reference should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
