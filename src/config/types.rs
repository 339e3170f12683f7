use crate::url::FilterSet;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// User agent presented when none is configured
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw configuration as read from a TOML file and/or the command line
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// The site root to mirror
    pub url: String,

    /// Path patterns a URL must match at least one of (empty = everything)
    pub includes: Vec<String>,

    /// Path patterns that reject a URL
    pub excludes: Vec<String>,

    /// JPEG/PNG re-encoding quality from 1 to 100, 0 disables re-encoding
    pub image_quality: u8,

    /// Maximum crawl depth, 0 for unlimited
    pub max_depth: u32,

    /// Per-request timeout in seconds, 0 disables the timeout
    pub timeout: u64,

    /// Directory the mirror is written into
    pub output_directory: PathBuf,

    /// Basic-auth user name
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// Strip a trailing `index.html` from rewritten page links
    pub skip_index_rewrites: bool,

    /// User agent sent with every request
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            image_quality: 0,
            max_depth: 0,
            timeout: DEFAULT_TIMEOUT_SECS,
            output_directory: PathBuf::from("."),
            username: None,
            password: None,
            skip_index_rewrites: false,
            user_agent: None,
        }
    }
}

/// Basic-auth credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

/// Validated settings the mirror runs with
#[derive(Debug, Clone)]
pub struct Settings {
    /// Starting URL; replaced by the served URL once the root page is fetched
    pub root: Url,

    /// Compiled include/exclude patterns
    pub filters: FilterSet,

    pub image_quality: u8,
    pub max_depth: u32,
    pub timeout: Option<Duration>,
    pub output_directory: PathBuf,
    pub credentials: Option<Credentials>,
    pub skip_index_rewrites: bool,
    pub user_agent: String,
}
