//! Configuration module for Sumi-Mirror
//!
//! This module handles loading a TOML configuration file and validating it
//! (together with any command-line overrides) into the [`Settings`] a mirror
//! run uses.
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring {}", settings.root);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, Credentials, Settings, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{load_config, load_settings};
pub use validation::validate;
