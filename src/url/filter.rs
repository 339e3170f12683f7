use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Compiled include/exclude patterns
///
/// Patterns are matched against the URL's path component only; scheme, host and
/// query never take part. `data:` URLs count as both included and excluded, so any
/// caller applying an exclude list drops them as well.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::FilterSet;
/// use url::Url;
///
/// let filters = FilterSet::new(&["^/blog/".to_string()], &[]).unwrap();
/// assert!(filters.allows(&Url::parse("https://example.com/blog/post1").unwrap()));
/// assert!(!filters.allows(&Url::parse("https://example.com/about.html").unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl FilterSet {
    /// Compiles both pattern lists, collecting every invalid pattern
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, Vec<ConfigError>> {
        let mut errors = Vec::new();
        let includes = compile_patterns(includes, &mut errors);
        let excludes = compile_patterns(excludes, &mut errors);

        if errors.is_empty() {
            Ok(Self { includes, excludes })
        } else {
            Err(errors)
        }
    }

    pub fn has_includes(&self) -> bool {
        !self.includes.is_empty()
    }

    pub fn has_excludes(&self) -> bool {
        !self.excludes.is_empty()
    }

    /// True when no include pattern is configured, the path matches one, or the
    /// URL is a `data:` URL
    pub fn is_included(&self, url: &Url) -> bool {
        if url.scheme() == "data" || self.includes.is_empty() {
            return true;
        }

        match self.includes.iter().find(|re| re.is_match(url.path())) {
            Some(re) => {
                tracing::debug!(url = %url, pattern = %re, "Including URL");
                true
            }
            None => false,
        }
    }

    /// True when an exclude pattern matches the path, or the URL is a `data:` URL
    pub fn is_excluded(&self, url: &Url) -> bool {
        if url.scheme() == "data" {
            return true;
        }

        match self.excludes.iter().find(|re| re.is_match(url.path())) {
            Some(re) => {
                tracing::debug!(url = %url, pattern = %re, "Skipping excluded URL");
                true
            }
            None => false,
        }
    }

    /// Combined policy applied wherever a candidate is queued
    pub fn allows(&self, url: &Url) -> bool {
        if self.has_includes() && !self.is_included(url) {
            return false;
        }
        if self.has_excludes() && self.is_excluded(url) {
            return false;
        }
        true
    }
}

fn compile_patterns(patterns: &[String], errors: &mut Vec<ConfigError>) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                errors.push(ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                });
                None
            }
        })
        .collect()
}
