//! Scrolling event log backed by a fixed-capacity ring buffer.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;

/// Default number of rows kept (and rendered) by the log panel.
pub const DEFAULT_MAX_ROWS: usize = 4;

/// A single logged event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Wall-clock timestamp, `HH:MM:SS` UTC.
    pub timestamp: String,
    /// Short event label.
    pub event: String,
    /// Free-form details.
    pub details: String,
}

/// Fixed-capacity event buffer; the oldest row is silently dropped once the
/// capacity is reached. Entries are only ever snapshotted for rendering,
/// never read back programmatically.
#[derive(Debug)]
pub struct EventLog {
    rows: Mutex<VecDeque<LogEntry>>,
    max_rows: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROWS)
    }
}

impl EventLog {
    /// Creates a log retaining at most `max_rows` entries.
    #[must_use]
    pub fn new(max_rows: usize) -> Self {
        Self {
            rows: Mutex::new(VecDeque::with_capacity(max_rows)),
            max_rows,
        }
    }

    /// Appends a row, evicting the oldest once the buffer is full.
    pub fn log(&self, event: &str, details: &str) {
        let entry = LogEntry {
            timestamp: Utc::now().format("%H:%M:%S").to_string(),
            event: event.to_string(),
            details: details.to_string(),
        };
        let mut rows = self.rows.lock().expect("event log lock poisoned");
        if rows.len() == self.max_rows {
            rows.pop_front();
        }
        rows.push_back(entry);
    }

    /// Returns the current rows, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.rows
            .lock()
            .expect("event log lock poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_only_last_max_rows_in_order() {
        let log = EventLog::new(4);
        for i in 1..=6 {
            log.log(&format!("event {i}"), "details");
        }

        let rows = log.snapshot();
        assert_eq!(rows.len(), 4);
        let events: Vec<_> = rows.iter().map(|r| r.event.as_str()).collect();
        assert_eq!(events, vec!["event 3", "event 4", "event 5", "event 6"]);
    }

    #[test]
    fn snapshot_of_empty_log_is_empty() {
        let log = EventLog::default();
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn timestamps_are_hh_mm_ss() {
        let log = EventLog::default();
        log.log("event", "details");
        let rows = log.snapshot();
        assert_eq!(rows[0].timestamp.len(), 8);
        assert_eq!(rows[0].timestamp.matches(':').count(), 2);
    }

    #[test]
    fn concurrent_logging_is_serialized() {
        use std::sync::Arc;

        let log = Arc::new(EventLog::new(64));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for j in 0..8 {
                        log.log(&format!("t{i}"), &format!("msg {j}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.snapshot().len(), 64);
    }
}
