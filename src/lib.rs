//! gofile-dl - a concurrent GoFile batch downloader.
//!
//! This library provides the core functionality for resolving GoFile share
//! links and downloading the resolved files concurrently while a live
//! terminal display tracks per-file and per-URL progress.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gofile_dl::{AppConfig, Downloader, GofileClient, LiveDisplay, session};
//!
//! # async fn example() -> gofile_dl::Result<()> {
//! let config = AppConfig::new();
//! let http = reqwest::Client::new();
//!
//! // Create a guest account and resolve/download everything in URLs.txt
//! let client = GofileClient::new_guest(http.clone()).await?;
//! let downloader = Downloader::new(http);
//!
//! let live = Arc::new(LiveDisplay::new(&config.download));
//! live.start();
//! session::run_session(&config, &client, &downloader, &live, None).await?;
//! live.stop().await;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod api;
pub mod chunk;
pub mod config;
pub mod download;
pub mod error;
pub mod eventlog;
pub mod format;
pub mod fs;
pub mod live;
pub mod progress;
pub mod session;
#[cfg(feature = "web")]
pub mod web;

// Re-export main types for convenience
pub use api::{GofileClient, RemoteFile};
pub use chunk::ChunkTable;
pub use config::{AppConfig, DownloadConfig, PathConfig, WebConfig};
pub use download::Downloader;
pub use error::{Error, Result};
pub use eventlog::EventLog;
pub use fs::{FileSystem, TokioFileSystem};
pub use live::LiveDisplay;
pub use progress::{ItemState, ProgressAggregator, TaskId};
