//! Live terminal display combining progress panels with a scrolling log.
//!
//! A dedicated tokio task redraws the combined view at a fixed tick;
//! [`LiveDisplay::log_event`] forces one immediate redraw. Business logic
//! never touches the renderer directly: downloads report through the
//! [`ProgressAggregator`] and the renderer reads snapshots.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use console::{Term, measure_text_width, pad_str, truncate_str};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::DownloadConfig;
use crate::eventlog::{EventLog, LogEntry};
use crate::format::{format_bytes, format_elapsed, format_percent};
use crate::progress::{ItemState, ProgressAggregator, ProgressSnapshot, TaskId};

const PANEL_WIDTH: usize = 62;
const BAR_WIDTH: usize = 20;
const BAR_FILLED: char = '━';
const BAR_EMPTY: char = '╌';

struct Renderer {
    term: Term,
    last_height: usize,
}

/// Owns the render loop lifecycle and the shared progress/log state.
pub struct LiveDisplay {
    progress: Arc<ProgressAggregator>,
    events: Arc<EventLog>,
    renderer: Mutex<Renderer>,
    started: Mutex<Instant>,
    tick: std::time::Duration,
    shutdown: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl LiveDisplay {
    /// Creates a display over fresh progress and log state.
    #[must_use]
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            progress: Arc::new(ProgressAggregator::new()),
            events: Arc::new(EventLog::default()),
            renderer: Mutex::new(Renderer {
                term: Term::stdout(),
                last_height: 0,
            }),
            started: Mutex::new(Instant::now()),
            tick: config.refresh_interval(),
            shutdown: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Returns the aggregator backing this display.
    #[must_use]
    pub fn progress(&self) -> Arc<ProgressAggregator> {
        Arc::clone(&self.progress)
    }

    /// Starts the periodic render loop. Elapsed time is measured from this
    /// call, not from construction.
    pub fn start(self: &Arc<Self>) {
        *self.started.lock().expect("start time lock poisoned") = Instant::now();
        self.log_event("Session started", "The session has started execution.");

        let display = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(display.tick);
            loop {
                tokio::select! {
                    _ = interval.tick() => display.render(),
                    () = display.shutdown.cancelled() => break,
                }
            }
        });
        *self.handle.lock().expect("render handle lock poisoned") = Some(handle);
    }

    /// Logs the elapsed wall-clock time and halts the render loop.
    pub async fn stop(&self) {
        let elapsed = self.started.lock().expect("start time lock poisoned").elapsed();
        self.log_event(
            "Session ended",
            &format!(
                "The session has finished execution. Execution time: {}",
                format_elapsed(elapsed)
            ),
        );
        self.shutdown.cancel();
        let handle = self.handle.lock().expect("render handle lock poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Appends a log row and immediately redraws the combined view.
    pub fn log_event(&self, event: &str, details: &str) {
        self.events.log(event, details);
        self.render();
    }

    /// Delegates to [`ProgressAggregator::add_overall_task`].
    pub fn add_overall_task(&self, description: &str, sub_task_count: usize) {
        self.progress.add_overall_task(description, sub_task_count);
    }

    /// Delegates to [`ProgressAggregator::add_item_task`].
    pub fn add_item_task(&self, index: usize, total: Option<u64>) -> TaskId {
        self.progress.add_item_task(index, total)
    }

    /// Delegates to [`ProgressAggregator::update_item_task`].
    pub fn update_item_task(
        &self,
        id: TaskId,
        completed: Option<u64>,
        advance: u64,
        visible: bool,
    ) {
        self.progress.update_item_task(id, completed, advance, visible);
    }

    /// Delegates to [`ProgressAggregator::finish_item_task`].
    pub fn finish_item_task(&self, id: TaskId) {
        self.progress.finish_item_task(id);
    }

    /// Delegates to [`ProgressAggregator::fail_item_task`].
    pub fn fail_item_task(&self, id: TaskId) {
        self.progress.fail_item_task(id);
    }

    /// Redraws the combined view in place from fresh snapshots.
    fn render(&self) {
        let frame = render_frame(&self.progress.snapshot(), &self.events.snapshot());
        let height = frame.lines().count();

        let mut renderer = self.renderer.lock().expect("renderer lock poisoned");
        let _ = renderer.term.clear_last_lines(renderer.last_height);
        let _ = renderer.term.write_line(&frame);
        renderer.last_height = height;
    }
}

/// Composes the combined view from consistent snapshots of both shared
/// structures. Pure with respect to its inputs.
#[must_use]
pub fn render_frame(progress: &ProgressSnapshot, events: &[LogEntry]) -> String {
    let overall_rows: Vec<String> = progress
        .overalls
        .iter()
        .map(|o| {
            let marker = if o.failed > 0 {
                format!(" ({} failed)", o.failed)
            } else {
                String::new()
            };
            format!(
                "{:<12} {} {}/{}{}",
                o.description,
                bar(o.completed as u64, Some(o.total as u64)),
                o.completed,
                o.total,
                marker,
            )
        })
        .collect();

    let item_rows: Vec<String> = progress
        .items
        .iter()
        .filter(|i| i.visible && i.state == ItemState::Active)
        .map(|i| {
            let bytes = i.total.map_or_else(
                || format!("{}/?", format_bytes(i.completed)),
                |total| format!("{}/{}", format_bytes(i.completed), format_bytes(total)),
            );
            format!(
                "{:<12} {} {} {bytes}",
                i.label,
                bar(i.completed, i.total),
                format_percent(i.completed, i.total),
            )
        })
        .collect();

    let log_rows: Vec<String> = events
        .iter()
        .map(|e| format!("{}  {:<18} {}", e.timestamp, e.event, e.details))
        .collect();

    let mut out = String::new();
    out.push_str(&panel("Overall Progress", &overall_rows));
    out.push_str(&panel("File Progress", &item_rows));
    out.push_str(&panel("Log Messages", &log_rows));
    out.pop();
    out
}

/// Renders one boxed panel with a title and clipped body rows.
fn panel(title: &str, rows: &[String]) -> String {
    let inner = PANEL_WIDTH - 4;
    let mut out = String::new();

    let header = format!("┌─ {title} ");
    let dashes = PANEL_WIDTH.saturating_sub(measure_text_width(&header) + 1);
    out.push_str(&header);
    out.push_str(&"─".repeat(dashes));
    out.push_str("┐\n");

    if rows.is_empty() {
        out.push_str(&format!("│ {} │\n", pad_str("(idle)", inner, console::Alignment::Left, None)));
    }
    for row in rows {
        let clipped = truncate_str(row, inner, "…");
        out.push_str(&format!(
            "│ {} │\n",
            pad_str(&clipped, inner, console::Alignment::Left, None)
        ));
    }

    out.push('└');
    out.push_str(&"─".repeat(PANEL_WIDTH - 2));
    out.push_str("┘\n");
    out
}

/// Renders a fixed-width progress bar; indeterminate totals render empty.
fn bar(completed: u64, total: Option<u64>) -> String {
    let filled = match total {
        Some(total) if total > 0 => {
            let ratio = completed.min(total) as f64 / total as f64;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let cells = (ratio * BAR_WIDTH as f64).round() as usize;
            cells.min(BAR_WIDTH)
        }
        _ => 0,
    };
    let mut s: String = std::iter::repeat_n(BAR_FILLED, filled).collect();
    s.extend(std::iter::repeat_n(BAR_EMPTY, BAR_WIDTH - filled));
    s
}
