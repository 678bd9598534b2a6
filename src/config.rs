use std::path::Path;
use std::{env, fs};

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_TARGET_URL: &str = "http://localhost:3001/";

/// Command-line flags. Every flag overrides the corresponding setting
/// from the config file and environment.
#[derive(Debug, Parser)]
#[command(name = "pummel", version, about = "Bounded-concurrency HTTP load generator")]
pub struct Cli {
    /// Target URL to issue GET requests against.
    #[arg(long)]
    pub url: Option<String>,

    /// Test duration in seconds.
    #[arg(long)]
    pub duration: Option<u64>,

    /// Maximum number of in-flight requests.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the final report as a single JSON line on stdout.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub target_url: String,
    pub duration_secs: u64,
    pub concurrency: usize,
    pub http_timeout_seconds: u64,
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Settings {
    /// Initializes logging at the configured level.
    pub fn init_logging(&self) {
        env::set_var("RUST_LOG", &self.log_level);
        env_logger::init();
    }
}

/// Loads the settings, layered lowest to highest precedence: built-in
/// defaults, an optional `config.{yaml,yml,toml}` found in `CONFIG_DIR`
/// (default `./config`), `APP__`-prefixed environment variables, then CLI
/// flags. A missing config file is fine; the defaults cover everything.
pub fn load_config(cli: &Cli) -> Result<Settings, ConfigError> {
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "./config".to_string());

    let mut builder = Config::builder()
        .set_default("target_url", DEFAULT_TARGET_URL)?
        .set_default("duration_secs", 30i64)?
        .set_default("concurrency", 10i64)?
        .set_default("http_timeout_seconds", 10i64)?
        .set_default("log_level", "info")?;

    for file in ["config.yaml", "config.yml", "config.toml"] {
        let path_str = format!("{}/{}", config_dir, file);
        let path = Path::new(&path_str);
        // Only non-empty files count; stop at the first one found.
        if let Ok(metadata) = fs::metadata(path) {
            if metadata.len() > 0 {
                builder = builder.add_source(File::with_name(&path_str).required(false));
                break;
            }
        }
    }

    builder = builder.add_source(Environment::with_prefix("APP").separator("__"));

    if let Some(url) = &cli.url {
        builder = builder.set_override("target_url", url.clone())?;
    }
    if let Some(duration) = cli.duration {
        builder = builder.set_override("duration_secs", duration as i64)?;
    }
    if let Some(concurrency) = cli.concurrency {
        builder = builder.set_override("concurrency", concurrency as i64)?;
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.set_override("http_timeout_seconds", timeout as i64)?;
    }
    if let Some(level) = &cli.log_level {
        builder = builder.set_override("log_level", level.clone())?;
    }
    if cli.json {
        builder = builder.set_override("json", true)?;
    }

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.target_url.is_empty() {
        return Err(ConfigError::Message(
            "target URL must not be empty".to_string(),
        ));
    }
    if !settings.target_url.starts_with("http://") && !settings.target_url.starts_with("https://") {
        return Err(ConfigError::Message(format!(
            "target URL '{}' must use http or https",
            settings.target_url
        )));
    }
    if settings.concurrency == 0 {
        return Err(ConfigError::Message(
            "concurrency must be at least 1".to_string(),
        ));
    }
    Ok(())
}
