//! Streamed, chunked file download with per-chunk progress reporting.

use std::path::Path;

use futures::TryStreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::chunk::ChunkTable;
use crate::error::{Error, Result};
use crate::fs::{FileSystem, TokioFileSystem};

/// Core downloader streaming one resolved file to disk.
///
/// Failure policy is best-effort, no retry: on a mid-stream error the
/// partially written file is left on disk as-is.
pub struct Downloader<F: FileSystem = TokioFileSystem> {
    http: reqwest::Client,
    chunks: ChunkTable,
    fs: F,
}

impl Downloader<TokioFileSystem> {
    /// Creates a downloader with the stock chunk table and file system.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            chunks: ChunkTable::default(),
            fs: TokioFileSystem,
        }
    }
}

impl<F: FileSystem> Downloader<F> {
    /// Creates a downloader with a custom chunk table and file system.
    #[must_use]
    pub const fn with_fs(http: reqwest::Client, chunks: ChunkTable, fs: F) -> Self {
        Self { http, chunks, fs }
    }

    /// Returns the chunk table used for the read loop.
    #[must_use]
    pub const fn chunk_table(&self) -> &ChunkTable {
        &self.chunks
    }

    /// Streams `url` to `dest`, invoking `on_progress(bytes_completed,
    /// bytes_total)` after every written chunk.
    ///
    /// The destination file is created (truncating any existing content)
    /// only once the response stream is confirmed open. A missing
    /// `Content-Length` header is logged and the total reported as `None`;
    /// it never aborts the download.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] if the request fails or returns a non-success
    /// status, [`Error::Network`] on a mid-stream read failure,
    /// [`Error::Filesystem`] if the destination cannot be created or
    /// written.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        mut on_progress: impl FnMut(u64, Option<u64>) + Send,
    ) -> Result<()> {
        let response = self.http.get(url).send().await?.error_for_status()?;

        let total = response.content_length();
        if total.is_none() {
            log::warn!("no Content-Length for {url}; progress will be indeterminate");
        }
        let chunk_size = self.chunks.chunk_size_for(total);

        self.ensure_parent_dir(dest).await?;
        let mut file = self
            .fs
            .create_file(dest)
            .await
            .map_err(|source| Error::Filesystem {
                path: dest.to_path_buf(),
                source,
            })?;

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream);
        let mut buf = vec![0u8; chunk_size];
        let mut completed: u64 = 0;

        loop {
            let read = reader
                .read(&mut buf)
                .await
                .map_err(|source| Error::Network {
                    url: url.to_string(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            file.write_all(&buf[..read])
                .await
                .map_err(|source| Error::Filesystem {
                    path: dest.to_path_buf(),
                    source,
                })?;
            completed += read as u64;
            on_progress(completed, total);
        }

        file.flush().await.map_err(|source| Error::Filesystem {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Ensures the parent directory exists for a destination path.
    async fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(parent)
                .await
                .map_err(|source| Error::Filesystem {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{KB, MB};
    use tempfile::TempDir;

    #[test]
    fn stock_chunk_table_is_wired_in() {
        let dl = Downloader::new(reqwest::Client::new());
        assert_eq!(dl.chunk_table().chunk_size_for(Some(500 * KB)), 8 * KB as usize);
        assert_eq!(dl.chunk_table().chunk_size_for(Some(2 * MB)), 16 * KB as usize);
    }

    #[tokio::test]
    async fn ensure_parent_creates_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("a/b/c/file.bin");

        let dl = Downloader::new(reqwest::Client::new());
        dl.ensure_parent_dir(&dest).await.unwrap();

        assert!(dir.path().join("a/b/c").exists());
    }

    #[tokio::test]
    async fn ensure_parent_handles_bare_filename() {
        let dl = Downloader::new(reqwest::Client::new());
        dl.ensure_parent_dir(Path::new("file.bin")).await.unwrap();
    }
}
