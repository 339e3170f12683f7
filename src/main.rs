//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror offline site mirror.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_mirror::config::{load_config, validate, Config};
use sumi_mirror::output::print_statistics;
use sumi_mirror::Mirror;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: an offline website mirror
///
/// Sumi-Mirror fetches a site's pages and the images, stylesheets and scripts
/// they use, rewrites every reference to point at the local copies and writes
/// the result to disk so it can be browsed without a network connection.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version = "1.0.0")]
#[command(about = "An offline website mirror", long_about = None)]
struct Cli {
    /// URL of the site to mirror (overrides the config file)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the mirror is written into
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Only follow URLs whose path matches this regex (repeatable)
    #[arg(short, long = "include", value_name = "REGEX")]
    includes: Vec<String>,

    /// Skip URLs whose path matches this regex (repeatable)
    #[arg(short, long = "exclude", value_name = "REGEX")]
    excludes: Vec<String>,

    /// Maximum link depth, 0 for unlimited
    #[arg(short, long, value_name = "N")]
    depth: Option<u32>,

    /// JPEG/PNG re-encoding quality (1-100), 0 disables re-encoding
    #[arg(long, value_name = "Q")]
    image_quality: Option<u8>,

    /// Per-request timeout in seconds, 0 for none
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Basic-auth user name
    #[arg(short, long)]
    user: Option<String>,

    /// Basic-auth password
    #[arg(short, long)]
    password: Option<String>,

    /// Strip a trailing index.html from rewritten page links
    #[arg(long)]
    skip_index_rewrites: bool,

    /// User agent sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Print a statistics table when the mirror completes
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line values on top of a file configuration
    fn apply_to(self, mut config: Config) -> Config {
        if let Some(url) = self.url {
            config.url = url;
        }
        if let Some(output) = self.output {
            config.output_directory = output;
        }
        config.includes.extend(self.includes);
        config.excludes.extend(self.excludes);
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(quality) = self.image_quality {
            config.image_quality = quality;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if self.user.is_some() {
            config.username = self.user;
        }
        if self.password.is_some() {
            config.password = self.password;
        }
        if self.skip_index_rewrites {
            config.skip_index_rewrites = true;
        }
        if self.user_agent.is_some() {
            config.user_agent = self.user_agent;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let print_stats = cli.stats;
    let config = cli.apply_to(config);
    let settings = validate(&config).context("Invalid configuration")?;

    let mut mirror = Mirror::new(settings)?;
    let stats = mirror.run().await?;

    if print_stats {
        print_statistics(stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
