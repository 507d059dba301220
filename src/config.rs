//! Configuration types, constructed once at startup and never mutated.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

/// Base URL for the GoFile API.
pub const GOFILE_API: &str = "https://api.gofile.io";

/// File containing the list of URLs to process, one per line.
pub const URLS_FILE: &str = "URLs.txt";

/// File receiving session error lines, truncated at every session start.
pub const SESSION_LOG: &str = "session_log.txt";

/// Optional config file read from the working directory at startup.
pub const CONFIG_FILE: &str = "gofile-dl.toml";

/// Configuration for download operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Number of concurrent file downloads per URL.
    pub max_workers: usize,
    /// Live display refresh rate in ticks per second.
    pub refresh_per_second: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_workers: 3,
            refresh_per_second: 10,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of concurrent file downloads.
    #[must_use]
    pub const fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Returns the interval between live display redraws.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_per_second.max(1)
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Path configuration for the download root and session files.
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Directory where downloaded files are saved.
    pub download_dir: PathBuf,
    /// Path of the URL list file.
    pub urls_file: PathBuf,
    /// Path of the session log file.
    pub session_log: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            download_dir: dirs::download_dir().unwrap_or_else(|| cwd.join("Downloads")),
            urls_file: cwd.join(URLS_FILE),
            session_log: cwd.join(SESSION_LOG),
        }
    }
}

/// Web front-end configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8732,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Download configuration.
    pub download: DownloadConfig,
    /// Path configuration.
    pub paths: PathConfig,
    /// Web front-end configuration.
    pub web: WebConfig,
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base headers sent with every GoFile request.
#[must_use]
pub fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Accept", HeaderValue::from_static("*/*"));
    // No Accept-Encoding: bodies must arrive unencoded so byte counts line
    // up with Content-Length.
    headers.insert("User-Agent", HeaderValue::from_static("Mozilla/5.0"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));
    headers.insert("Pragma", HeaderValue::from_static("no-cache"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers
}
