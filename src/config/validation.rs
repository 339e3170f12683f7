use crate::config::types::{Config, Credentials, Settings, DEFAULT_USER_AGENT};
use crate::url::FilterSet;
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration and builds the run settings
///
/// Every problem found is collected so a user sees all of them at once; a single
/// problem is returned as-is, several are wrapped in [`ConfigError::Invalid`].
pub fn validate(config: &Config) -> Result<Settings, ConfigError> {
    let mut errors = Vec::new();

    let root = match parse_root_url(&config.url) {
        Ok(url) => Some(url),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let filters = match FilterSet::new(&config.includes, &config.excludes) {
        Ok(filters) => Some(filters),
        Err(mut pattern_errors) => {
            errors.append(&mut pattern_errors);
            None
        }
    };

    if config.image_quality > 100 {
        errors.push(ConfigError::Validation(format!(
            "image_quality must be between 0 and 100, got {}",
            config.image_quality
        )));
    }

    let credentials = match validate_credentials(config) {
        Ok(credentials) => credentials,
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match (root, filters) {
        (Some(root), Some(filters)) if errors.is_empty() => Ok(Settings {
            root,
            filters,
            image_quality: config.image_quality,
            max_depth: config.max_depth,
            timeout: (config.timeout > 0).then(|| Duration::from_secs(config.timeout)),
            output_directory: config.output_directory.clone(),
            credentials,
            skip_index_rewrites: config.skip_index_rewrites,
            user_agent: config
                .user_agent
                .clone()
                .filter(|ua| !ua.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }),
        _ if errors.len() == 1 => Err(errors.remove(0)),
        _ => Err(ConfigError::Invalid(errors)),
    }
}

/// Parses the site root, defaulting to `http` when no scheme was given
fn parse_root_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::InvalidUrl("no URL given".to_string()));
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", raw))
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?,
        Err(e) => return Err(ConfigError::InvalidUrl(format!("'{}': {}", raw, e))),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' must use http or https, got {}",
            raw,
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("'{}' has no host", raw)));
    }

    Ok(url)
}

fn validate_credentials(config: &Config) -> Result<Option<Credentials>, ConfigError> {
    match (&config.username, &config.password) {
        (Some(user), password) if !user.is_empty() => Ok(Some(Credentials {
            username: user.clone(),
            password: password.clone(),
        })),
        (_, Some(password)) if !password.is_empty() => Err(ConfigError::Validation(
            "password given without a username".to_string(),
        )),
        _ => Ok(None),
    }
}
