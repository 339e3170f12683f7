//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirror, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Attaching basic-auth credentials to every request
//! - Following redirects and exposing the final URL
//! - Error classification

use crate::config::{Credentials, Settings};
use crate::FetchError;
use reqwest::{redirect::Policy, Client};
use url::Url;

/// Maximum number of redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched resource
#[derive(Debug)]
pub struct Fetched {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::{validate, Config};
/// use sumi_mirror::crawler::build_http_client;
///
/// let config = Config {
///     url: "https://example.com/".to_string(),
///     ..Config::default()
/// };
/// let settings = validate(&config).unwrap();
///
/// let client = build_http_client(&settings).unwrap();
/// ```
pub fn build_http_client(settings: &Settings) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(settings.user_agent.clone())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Transport used by the mirror for pages and assets alike
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    credentials: Option<Credentials>,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(settings)?,
            credentials: settings.credentials.clone(),
        })
    }

    /// Opens `url`, following redirects, and reads the whole body
    ///
    /// Any non-2xx final status is an error; the body of an error response is
    /// not read.
    pub async fn fetch(&self, url: &Url) -> Result<Fetched, FetchError> {
        let mut request = self.client.get(url.clone());
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_ref());
        }

        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: final_url.to_string(),
            source,
        })?;

        if final_url != *url {
            tracing::debug!(url = %url, final_url = %final_url, "Followed redirect");
        }

        Ok(Fetched {
            final_url,
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}
