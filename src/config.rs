use anyhow::{Context, Result};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:5000/api/upload";
pub const DEFAULT_UPLOAD_FIELD: &str = "file";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Tabular formats the analysis service understands. Advisory only.
pub static ALLOWED_EXTENSIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["csv", "xlsx", "xls"].into_iter().collect());

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub analysis_url: String,
    pub upload_field: String,
    pub request_timeout: Option<Duration>,
    pub bind_addr: SocketAddr,
    pub max_file_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_url: DEFAULT_ANALYSIS_URL.to_string(),
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
            request_timeout: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let analysis_url = lookup("ANALYSIS_SERVICE_URL").unwrap_or(defaults.analysis_url);
        let upload_field = lookup("ANALYSIS_UPLOAD_FIELD").unwrap_or(defaults.upload_field);

        let request_timeout = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 127.0.0.1:3000")?;

        let max_file_size = match lookup("MAX_FILE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_FILE_SIZE must be a byte count, got '{}'", raw))?,
            None => defaults.max_file_size,
        };

        Ok(Config {
            analysis_url,
            upload_field,
            request_timeout,
            bind_addr,
            max_file_size,
        })
    }

    /// Extension filter for file selection; the service remains the real gatekeeper.
    pub fn is_allowed_file(file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

pub fn load_config() -> Result<Config> {
    let config = Config::new()?;
    tracing::info!(
        "Analysis service: {}, upload field: {}, timeout: {:?}",
        config.analysis_url,
        config.upload_field,
        config.request_timeout
    );
    Ok(config)
}
