//! Formatting helpers for human-readable byte sizes and durations.

use std::time::Duration;

/// Formats a byte count as a human-readable string (B, KB, MB, GB).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Formats elapsed wall-clock time as `HH hrs MM mins SS secs`.
#[must_use]
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!(
        "{:02} hrs {:02} mins {:02} secs",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Formats item progress as a percentage, or a placeholder when the total
/// is unknown.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn format_percent(completed: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => {
            let pct = (completed as f64 / total as f64 * 100.0).min(100.0) as u64;
            format!("{pct:>3}%")
        }
        _ => "  ?%".to_string(),
    }
}
