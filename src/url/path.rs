use crate::url::host_key;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::PathBuf;
use url::Url;

/// File name used for pages whose path is empty or ends in `/`
pub const PAGE_DIR_INDEX: &str = "index.html";

/// Characters escaped when a mapped path segment is written back into a reference
const SEGMENT_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Maps remote URLs onto the local mirror layout
///
/// Internal files live under `<output>/<site-host>/` and keep the site's own
/// directory structure. External assets are nested under `_<host>/` inside that
/// directory, so equal paths on different hosts never collide. Ports are folded
/// into the directory name as `host_port`.
#[derive(Debug, Clone)]
pub struct PathMapper {
    output_directory: PathBuf,
    site_host: String,
}

impl PathMapper {
    /// Creates a mapper for the given output directory and site root
    pub fn new(output_directory: impl Into<PathBuf>, root: &Url) -> Self {
        Self {
            output_directory: output_directory.into(),
            site_host: host_key(root).unwrap_or_default(),
        }
    }

    /// Re-targets the mapper at a new site root (after the root page redirected)
    pub fn set_root(&mut self, root: &Url) {
        self.site_host = host_key(root).unwrap_or_default();
    }

    /// Directory all mirrored files of this site are written under
    pub fn site_directory(&self) -> PathBuf {
        self.output_directory.join(host_directory(&self.site_host))
    }

    /// Returns true when the URL is served by the site being mirrored
    pub fn is_internal(&self, url: &Url) -> bool {
        host_key(url).as_deref() == Some(self.site_host.as_str())
    }

    /// Computes the local file path for a remote URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_mirror::url::PathMapper;
    /// use std::path::Path;
    /// use url::Url;
    ///
    /// let root = Url::parse("https://example.com/").unwrap();
    /// let mapper = PathMapper::new("/tmp/out", &root);
    ///
    /// let page = Url::parse("https://example.com/docs/").unwrap();
    /// assert_eq!(
    ///     mapper.local_path(&page, true),
    ///     Path::new("/tmp/out/example.com/docs/index.html")
    /// );
    /// ```
    pub fn local_path(&self, url: &Url, is_page: bool) -> PathBuf {
        let mut path = self.site_directory();
        for segment in self.mapped_segments(url, is_page) {
            path.push(segment);
        }
        path
    }

    /// The `../` prefix leading from a file's directory back to the site directory
    pub fn relative_to_root(&self, url: &Url, is_page: bool) -> String {
        let depth = self.mapped_segments(url, is_page).len().saturating_sub(1);
        "../".repeat(depth)
    }

    /// Builds the reference a mirrored file uses to reach `target`
    ///
    /// `relative_to_root` is the prefix returned by [`Self::relative_to_root`] for
    /// the referencing file. The reference is built from the same segments as
    /// [`Self::local_path`], re-encoded so it is itself a valid relative URL; the
    /// fragment is kept and the query dropped, as the local file has none.
    pub fn relative_reference(&self, relative_to_root: &str, target: &Url, is_page: bool) -> String {
        let segments: Vec<String> = self
            .mapped_segments(target, is_page)
            .iter()
            .map(|segment| utf8_percent_encode(segment, SEGMENT_ESCAPES).to_string())
            .collect();

        let mut reference = String::from(relative_to_root);
        reference.push_str(&segments.join("/"));

        if let Some(fragment) = target.fragment() {
            reference.push('#');
            reference.push_str(fragment);
        }

        reference
    }

    /// Path segments below the site directory, decoded and sanitized
    fn mapped_segments(&self, url: &Url, is_page: bool) -> Vec<String> {
        let mut segments = Vec::new();

        if !self.is_internal(url) {
            if let Some(host) = host_key(url) {
                segments.push(format!("_{}", host_directory(&host)));
            }
        }

        let file_name = mapped_file_name(url, is_page);
        segments.extend(
            file_name
                .split('/')
                .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
                .filter(|s| !s.is_empty() && s != "." && s != ".."),
        );

        segments
    }
}

/// The URL's path, with `index.html` appended to directory-style page paths
fn mapped_file_name(url: &Url, is_page: bool) -> String {
    let path = url.path();
    if is_page && (path.is_empty() || path.ends_with('/')) {
        format!("{}{}", path, PAGE_DIR_INDEX)
    } else {
        path.to_string()
    }
}

/// Directory name for a `host[:port]` key
fn host_directory(host: &str) -> String {
    host.replace(':', "_")
}
