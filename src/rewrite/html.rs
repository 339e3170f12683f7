//! Rewrites the references of a page so the mirror resolves offline

use crate::css::relink_style;
use crate::rewrite::parse_srcset;
use crate::url::{is_inline_reference, is_web_scheme, FilterSet, PathMapper, PAGE_DIR_INDEX};
use crate::MirrorError;
use tl::{Node, NodeHandle, ParserOptions, VDom};
use url::Url;

/// Separator used when re-joining `srcset` candidates
const SRCSET_SEPARATOR: &str = ",\n";

/// Reports whether the local copy of an external asset exists
pub type IsMirrored<'a> = &'a dyn Fn(&Url) -> bool;

/// Rewrites `href`, `src`, `srcset` and `<style>` references in a page
#[derive(Clone, Copy)]
pub struct HtmlRewriter<'a> {
    mapper: &'a PathMapper,
    filters: &'a FilterSet,
    is_mirrored: IsMirrored<'a>,
    skip_index_rewrites: bool,
}

/// Where the page being rewritten lives
struct PageContext<'u> {
    url: &'u Url,
    relative_to_root: String,
}

impl<'a> HtmlRewriter<'a> {
    pub fn new(
        mapper: &'a PathMapper,
        filters: &'a FilterSet,
        is_mirrored: IsMirrored<'a>,
        skip_index_rewrites: bool,
    ) -> Self {
        Self {
            mapper,
            filters,
            is_mirrored,
            skip_index_rewrites,
        }
    }

    /// Rewrites every reference in `html`, which was served at `page_url`
    ///
    /// Attributes are only touched when the rewritten value differs from the
    /// original. Only stylesheet `<link>` elements are rewritten, as no other
    /// `<link>` target is downloaded. A document that cannot be parsed is an error for this page
    /// only.
    pub fn rewrite_document(&self, page_url: &Url, html: &str) -> Result<String, MirrorError> {
        let mut dom = tl::parse(html, ParserOptions::default()).map_err(|e| MirrorError::HtmlParse {
            url: page_url.to_string(),
            message: format!("{:?}", e),
        })?;

        let page = PageContext {
            url: page_url,
            relative_to_root: self.mapper.relative_to_root(page_url, true),
        };

        rewrite_attribute(&mut dom, "a", "href", |value| self.rewrite_page_link(&page, value));
        rewrite_attribute(&mut dom, "link[rel~=stylesheet]", "href", |value| self.resolve(&page, value, false));
        rewrite_attribute(&mut dom, "img", "src", |value| self.resolve(&page, value, false));
        rewrite_attribute(&mut dom, "img", "srcset", |value| self.rewrite_srcset(&page, value));
        rewrite_attribute(&mut dom, "script", "src", |value| self.resolve(&page, value, false));
        rewrite_style_blocks(&mut dom, |css| {
            relink_style(css, |raw| self.resolve(&page, raw, false))
        });

        Ok(dom.outer_html())
    }

    fn rewrite_page_link(&self, page: &PageContext<'_>, value: &str) -> Option<String> {
        let resolved = self.resolve(page, value, true)?;
        if !self.skip_index_rewrites {
            return Some(resolved);
        }

        match resolved.strip_suffix(PAGE_DIR_INDEX) {
            // A link to the site directory itself
            Some("") => Some("./".to_string()),
            Some(stripped) if stripped.ends_with('/') => Some(stripped.to_string()),
            _ => Some(resolved),
        }
    }

    fn rewrite_srcset(&self, page: &PageContext<'_>, value: &str) -> Option<String> {
        let candidates = parse_srcset(value);
        if candidates.is_empty() {
            return None;
        }

        let rewritten: Vec<String> = candidates
            .iter()
            .map(|candidate| {
                let url = self
                    .resolve(page, candidate.url, false)
                    .unwrap_or_else(|| candidate.url.to_string());
                format!("{}{}", url, candidate.descriptor)
            })
            .collect();

        Some(rewritten.join(SRCSET_SEPARATOR))
    }

    fn resolve(&self, page: &PageContext<'_>, raw: &str, is_page: bool) -> Option<String> {
        local_reference(
            self.mapper,
            self.filters,
            page.url,
            &page.relative_to_root,
            raw,
            is_page,
            self.is_mirrored,
        )
    }
}

/// Resolves a reference found in a file served at `base` to the relative path
/// of its local copy
///
/// `relative_to_root` is the prefix leading from that file back to the site
/// directory. Returns None when the reference must stay as written: inline
/// `data:` and `mailto:` references, fragment-only and non-web references,
/// external pages, and external assets that are filtered out or have no local
/// copy according to `is_mirrored`.
pub fn local_reference(
    mapper: &PathMapper,
    filters: &FilterSet,
    base: &Url,
    relative_to_root: &str,
    raw: &str,
    is_page: bool,
    is_mirrored: IsMirrored<'_>,
) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') || is_inline_reference(raw) {
        return None;
    }

    let target = base.join(raw).ok()?;
    if !is_web_scheme(&target) {
        return None;
    }

    if !mapper.is_internal(&target)
        && (is_page || !filters.allows(&target) || !is_mirrored(&target))
    {
        return None;
    }

    Some(mapper.relative_reference(relative_to_root, &target, is_page))
}

fn select_handles(dom: &VDom<'_>, selector: &'static str) -> Vec<NodeHandle> {
    dom.query_selector(selector)
        .map(|matches| matches.collect())
        .unwrap_or_default()
}

/// Applies `rewrite` to one attribute of every element matching `selector`
fn rewrite_attribute<F>(dom: &mut VDom<'_>, selector: &'static str, attr: &'static str, mut rewrite: F)
where
    F: FnMut(&str) -> Option<String>,
{
    let handles = select_handles(dom, selector);
    let parser = dom.parser_mut();

    for handle in handles {
        let Some(tag) = handle.get_mut(parser).and_then(|node| node.as_tag_mut()) else {
            continue;
        };

        let current = match tag.attributes().get(attr) {
            Some(Some(value)) => value.as_utf8_str().into_owned(),
            _ => continue,
        };

        let Some(replacement) = rewrite(&current) else {
            continue;
        };
        if replacement == current {
            continue;
        }

        if let Some(Some(value)) = tag.attributes_mut().get_mut(attr) {
            tracing::debug!(attr, from = %current, to = %replacement, "Rewriting reference");
            if value.set(replacement).is_err() {
                tracing::warn!(attr, value = %current, "Rewritten reference too large, keeping original");
            }
        }
    }
}

/// Replaces the text of every `<style>` element with `rewrite(text)`
fn rewrite_style_blocks<F>(dom: &mut VDom<'_>, mut rewrite: F)
where
    F: FnMut(&str) -> String,
{
    let handles = select_handles(dom, "style");
    let parser = dom.parser_mut();

    for handle in handles {
        let children: Vec<NodeHandle> = match handle.get(parser).and_then(|node| node.as_tag()) {
            Some(tag) => tag.children().top().as_slice().to_vec(),
            None => continue,
        };

        for child in children {
            if let Some(Node::Raw(text)) = child.get_mut(parser) {
                let css = text.as_utf8_str().into_owned();
                let relinked = rewrite(&css);
                if relinked != css && text.set(relinked).is_err() {
                    tracing::warn!("Rewritten style block too large, keeping original");
                }
            }
        }
    }
}
