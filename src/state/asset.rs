/// Downloadable asset definitions
use std::fmt;
use url::Url;

/// What kind of resource an asset is; decides which processor it runs through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
    Other,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Stylesheet => "stylesheet",
            Self::Script => "script",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-HTML resource referenced by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Absolute URL of the resource
    pub url: Url,
    pub kind: AssetKind,
}

impl Asset {
    pub fn new(url: Url, kind: AssetKind) -> Self {
        Self { url, kind }
    }

    pub fn image(url: Url) -> Self {
        Self::new(url, AssetKind::Image)
    }
}
