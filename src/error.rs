//! Error types for the gofile-dl library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during resolution and download operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The GoFile API returned a non-ok status or unusable payload.
    #[error("GoFile API error: {0}")]
    Api(String),

    /// HTTP request error (connect, status, decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stream read failure mid-download. The partially written file is
    /// left on disk.
    #[error("network failure while downloading {url}: {source}")]
    Network {
        /// URL being downloaded when the stream failed.
        url: String,
        /// Underlying read error.
        source: std::io::Error,
    },

    /// Destination file could not be created or written.
    #[error("filesystem failure at {path}: {source}")]
    Filesystem {
        /// Destination path that failed.
        path: PathBuf,
        /// Underlying write error.
        source: std::io::Error,
    },

    /// Session-level I/O error (URL list, session log).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Short label for the error kind, used in log panels.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Api(_) => "API error",
            Self::Http(_) => "HTTP error",
            Self::Network { .. } => "Network error",
            Self::Filesystem { .. } => "Filesystem error",
            Self::Io(_) => "I/O error",
            Self::Config(_) => "Config error",
        }
    }
}

/// A specialized `Result` type for gofile-dl operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_distinguish_network_and_filesystem() {
        let net = Error::Network {
            url: "https://example.com/f".into(),
            source: std::io::Error::other("reset"),
        };
        let fs = Error::Filesystem {
            path: PathBuf::from("/tmp/x"),
            source: std::io::Error::other("full"),
        };
        assert_eq!(net.kind_label(), "Network error");
        assert_eq!(fs.kind_label(), "Filesystem error");
        assert_ne!(net.kind_label(), fs.kind_label());
    }
}
