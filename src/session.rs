//! Session driver: consumes the URL list file, resolves each URL and
//! downloads its files through a bounded worker pool.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use futures::{StreamExt, stream};

use crate::api::{GofileClient, RemoteFile, extract_content_id};
use crate::config::AppConfig;
use crate::download::Downloader;
use crate::error::{Error, Result};
use crate::live::LiveDisplay;

/// Reads the URL list: one URL per line, blank lines ignored.
///
/// # Errors
///
/// A missing or unreadable list file is a session-level error and fatal.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Truncates a session file (URL list or session log) to empty, creating
/// it if absent.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn clear_file(path: &Path) -> Result<()> {
    std::fs::write(path, "")?;
    Ok(())
}

/// Appends one error line to the session log. Best-effort: a log write
/// failure never interrupts the session.
fn append_session_log(path: &Path, detail: &str) {
    use std::io::Write;

    let line = format!("{} {detail}\n", Utc::now().format("%Y-%m-%d %H:%M:%S"));
    let appended = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| f.write_all(line.as_bytes()));
    if let Err(e) = appended {
        log::warn!("could not append to session log: {e}");
    }
}

/// Runs one full session: read the URL list, process every URL
/// sequentially, then truncate the list. An empty list is a no-op.
///
/// # Errors
///
/// Only session-level failures (URL list unreadable or unwritable) are
/// returned; per-URL and per-file errors are logged and skipped.
pub async fn run_session(
    config: &AppConfig,
    client: &GofileClient,
    downloader: &Downloader,
    live: &Arc<LiveDisplay>,
    password: Option<&str>,
) -> Result<()> {
    let urls = read_url_list(&config.paths.urls_file)?;
    if urls.is_empty() {
        live.log_event("Nothing to do", "The URL list is empty.");
    }

    // One URL's files fully settled before the next resolution begins.
    for url in &urls {
        process_url(config, client, downloader, live, url, password).await;
    }

    clear_file(&config.paths.urls_file)?;
    Ok(())
}

/// Resolves one URL and downloads its files with bounded parallelism.
/// Resolution failure is logged and skipped.
async fn process_url(
    config: &AppConfig,
    client: &GofileClient,
    downloader: &Downloader,
    live: &Arc<LiveDisplay>,
    url: &str,
    password: Option<&str>,
) {
    let files = match client.resolve(url, password).await {
        Ok(files) => files,
        Err(e) => {
            live.log_event(e.kind_label(), &format!("{url}: {e}"));
            append_session_log(&config.paths.session_log, &format!("{url}: {e}"));
            return;
        }
    };

    let description = extract_content_id(url).unwrap_or(url);
    live.add_overall_task(description, files.len());
    live.log_event(
        "Resolved URL",
        &format!("{description}: {} file(s)", files.len()),
    );

    stream::iter(files.into_iter().enumerate())
        .map(|(index, file)| download_one(config, downloader, live, index, file))
        .buffer_unordered(config.download.max_workers.max(1))
        .collect::<Vec<()>>()
        .await;
}

/// Downloads a single resolved file, routing progress through the display's
/// aggregator. Errors mark the item failed without touching its siblings.
async fn download_one(
    config: &AppConfig,
    downloader: &Downloader,
    live: &Arc<LiveDisplay>,
    index: usize,
    file: RemoteFile,
) {
    let task = live.add_item_task(index, file.size);
    let dest = config.paths.download_dir.join(&file.filename);

    let result = downloader
        .download(&file.download_url, &dest, |completed, _total| {
            live.update_item_task(task, Some(completed), 0, true);
        })
        .await;

    match result {
        Ok(()) => {
            // Items with an unknown size cannot self-finish on byte count.
            live.finish_item_task(task);
        }
        Err(e) => {
            live.fail_item_task(task);
            live.log_event(e.kind_label(), &format!("{}: {e}", file.filename));
            append_session_log(
                &config.paths.session_log,
                &format!("{}: {e}", file.filename),
            );
            if matches!(e, Error::Network { .. }) {
                log::warn!("partial file left on disk: {}", dest.display());
            }
        }
    }
}
