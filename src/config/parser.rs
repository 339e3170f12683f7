use crate::config::types::{Config, Settings};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The file is only parsed here; call [`validate`] (or use [`load_settings`])
/// once command-line overrides have been applied.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Max depth: {}", config.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Loads a configuration file and validates it into run settings
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let config = load_config(path)?;
    validate(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
url = "https://example.com/"
output-directory = "./mirror"
includes = ["^/blog/"]
excludes = ["^/blog/drafts/"]
image-quality = 80
max-depth = 3
timeout = 10
skip-index-rewrites = true
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.url, "https://example.com/");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.image_quality, 80);
        assert_eq!(config.includes, vec!["^/blog/".to_string()]);
        assert!(config.skip_index_rewrites);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let file = create_temp_config(r#"url = "https://example.com/""#);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.max_depth, 0);
        assert_eq!(config.timeout, 30);
        assert!(config.includes.is_empty());
        assert!(!config.skip_index_rewrites);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/mirror.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_settings_with_validation_error() {
        let config_content = r#"
url = "https://example.com/"
includes = ["(unclosed"]
"#;

        let file = create_temp_config(config_content);
        let result = load_settings(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidPattern { .. }
        ));
    }
}
