//! Multi-task progress aggregation.
//!
//! Tracks one *overall* task per input URL, each owning a set of *item*
//! tasks (one per file). Item completion rolls up into the overall counter;
//! finished overalls are retired through a small FIFO backlog so a long
//! session never accumulates unbounded render state.

use std::collections::VecDeque;
use std::sync::Mutex;

/// How many finished overall tasks stay tracked before the oldest is
/// evicted.
pub const FINISHED_BACKLOG_CAPACITY: usize = 5;

/// Maximum rendered length of an overall description before truncation.
pub const DESCRIPTION_MAX_LEN: usize = 8;

/// Identifier of an item task, stable for the life of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Terminal-state machine of an item task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Download in flight.
    Active,
    /// All bytes delivered.
    Finished,
    /// Aborted mid-stream; never counts as finished.
    Failed,
}

#[derive(Debug)]
struct OverallTask {
    id: u64,
    description: String,
    total: usize,
    completed: usize,
    failed: usize,
    finished: bool,
}

#[derive(Debug)]
struct ItemTask {
    id: TaskId,
    owner: Option<u64>,
    label: String,
    total: Option<u64>,
    completed: u64,
    visible: bool,
    state: ItemState,
}

#[derive(Debug, Default)]
struct Inner {
    overalls: Vec<OverallTask>,
    items: Vec<ItemTask>,
    backlog: VecDeque<u64>,
    next_overall_id: u64,
    next_item_id: u64,
}

/// Rendered view of one overall task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverallSnapshot {
    /// Truncated description.
    pub description: String,
    /// Declared sub-task count.
    pub total: usize,
    /// Sub-tasks finished so far.
    pub completed: usize,
    /// Sub-tasks failed so far.
    pub failed: usize,
    /// Whether every sub-task reached a terminal state.
    pub finished: bool,
}

/// Rendered view of one item task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Display label (`File {i}/{n}`).
    pub label: String,
    /// Total bytes, `None` when the size is indeterminate.
    pub total: Option<u64>,
    /// Bytes completed.
    pub completed: u64,
    /// Whether the row appears in the task panel.
    pub visible: bool,
    /// Terminal state.
    pub state: ItemState,
}

/// Consistent point-in-time view of the tracked tasks, insertion-ordered.
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    /// Tracked overall tasks (evicted entries are absent).
    pub overalls: Vec<OverallSnapshot>,
    /// Item tasks belonging to tracked overalls.
    pub items: Vec<ItemSnapshot>,
}

/// Serialized tracker for concurrent per-file progress updates.
///
/// Download workers call [`update_item_task`](Self::update_item_task) from
/// separate tasks; a single mutex serializes the short, non-blocking update
/// path.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    inner: Mutex<Inner>,
    backlog_capacity: usize,
}

impl ProgressAggregator {
    /// Creates an aggregator with the stock backlog capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backlog_capacity(FINISHED_BACKLOG_CAPACITY)
    }

    /// Creates an aggregator retiring finished overalls through a backlog of
    /// the given capacity.
    #[must_use]
    pub fn with_backlog_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            backlog_capacity: capacity.max(1),
        }
    }

    /// Registers a new overall task. Subsequent [`add_item_task`] calls
    /// attach to it until another overall is added.
    pub fn add_overall_task(&self, description: &str, sub_task_count: usize) {
        let mut inner = self.lock();
        let id = inner.next_overall_id;
        inner.next_overall_id += 1;
        inner.overalls.push(OverallTask {
            id,
            description: truncate_description(description),
            total: sub_task_count,
            completed: 0,
            failed: 0,
            finished: false,
        });
        // A URL resolving to zero files settles immediately.
        if sub_task_count == 0 {
            self.settle_overall(&mut inner, id);
        }
    }

    /// Registers an item task under the most recently added overall task,
    /// labeled with its 1-based position within that overall.
    pub fn add_item_task(&self, index: usize, total: Option<u64>) -> TaskId {
        let mut inner = self.lock();
        let id = TaskId(inner.next_item_id);
        inner.next_item_id += 1;

        let (owner, declared) = inner
            .overalls
            .last()
            .map_or((None, 0), |o| (Some(o.id), o.total));
        if owner.is_none() {
            log::warn!("item task registered without an overall task");
        }
        let item = ItemTask {
            id,
            owner,
            label: format!("File {}/{}", index + 1, declared),
            total,
            completed: 0,
            visible: true,
            state: ItemState::Active,
        };
        inner.items.push(item);
        id
    }

    /// Updates an item task's completion and visibility.
    ///
    /// Exactly one of `completed` (absolute) or `advance` (relative) is
    /// honored; `completed` takes precedence when both are supplied. The
    /// first transition to finished advances the owning overall's completed
    /// count and hides the row; repeated completion calls are idempotent.
    pub fn update_item_task(
        &self,
        id: TaskId,
        completed: Option<u64>,
        advance: u64,
        visible: bool,
    ) {
        let mut inner = self.lock();
        let Some(item) = inner.items.iter_mut().find(|i| i.id == id) else {
            return;
        };
        // Terminal items are inert: a late update must not resurrect a
        // hidden row.
        if item.state != ItemState::Active {
            return;
        }
        match completed {
            Some(absolute) => item.completed = absolute,
            None => item.completed += advance,
        }
        item.visible = visible;

        if !item.total.is_some_and(|total| item.completed >= total) {
            return;
        }
        item.state = ItemState::Finished;
        item.visible = false;
        let owner = item.owner;

        if let Some(owner_id) = owner {
            if let Some(overall) = inner.overalls.iter_mut().find(|o| o.id == owner_id) {
                overall.completed += 1;
            }
            self.settle_overall(&mut inner, owner_id);
        }
    }

    /// Marks an item task as finished regardless of its byte count.
    ///
    /// Needed for items with an indeterminate total, which can never finish
    /// through [`update_item_task`](Self::update_item_task) alone. No-op on
    /// items already in a terminal state.
    pub fn finish_item_task(&self, id: TaskId) {
        let mut inner = self.lock();
        let Some(item) = inner.items.iter_mut().find(|i| i.id == id) else {
            return;
        };
        if item.state != ItemState::Active {
            return;
        }
        item.state = ItemState::Finished;
        item.visible = false;
        let owner = item.owner;

        if let Some(owner_id) = owner {
            if let Some(overall) = inner.overalls.iter_mut().find(|o| o.id == owner_id) {
                overall.completed += 1;
            }
            self.settle_overall(&mut inner, owner_id);
        }
    }

    /// Marks an item task as failed: it is hidden, never finishes, and
    /// counts toward the owning overall's settled total but not toward its
    /// completed count.
    pub fn fail_item_task(&self, id: TaskId) {
        let mut inner = self.lock();
        let Some(item) = inner.items.iter_mut().find(|i| i.id == id) else {
            return;
        };
        if item.state != ItemState::Active {
            return;
        }
        item.state = ItemState::Failed;
        item.visible = false;
        let owner = item.owner;

        if let Some(owner_id) = owner {
            if let Some(overall) = inner.overalls.iter_mut().find(|o| o.id == owner_id) {
                overall.failed += 1;
            }
            self.settle_overall(&mut inner, owner_id);
        }
    }

    /// Returns a consistent snapshot of the tracked tasks for rendering.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let inner = self.lock();
        ProgressSnapshot {
            overalls: inner
                .overalls
                .iter()
                .map(|o| OverallSnapshot {
                    description: o.description.clone(),
                    total: o.total,
                    completed: o.completed,
                    failed: o.failed,
                    finished: o.finished,
                })
                .collect(),
            items: inner
                .items
                .iter()
                .map(|i| ItemSnapshot {
                    label: i.label.clone(),
                    total: i.total,
                    completed: i.completed,
                    visible: i.visible,
                    state: i.state,
                })
                .collect(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("progress lock poisoned")
    }

    /// Transitions the overall to finished once every item reached a
    /// terminal state, then evicts the oldest finished overall if the
    /// backlog overflowed.
    fn settle_overall(&self, inner: &mut Inner, overall_id: u64) {
        let Some(overall) = inner.overalls.iter_mut().find(|o| o.id == overall_id) else {
            return;
        };
        if overall.finished || overall.completed + overall.failed < overall.total {
            return;
        }
        overall.finished = true;
        inner.backlog.push_back(overall_id);

        while inner.backlog.len() > self.backlog_capacity {
            // Intentional amnesia: the evicted overall stops being rendered
            // or referenced at all.
            if let Some(evicted) = inner.backlog.pop_front() {
                inner.overalls.retain(|o| o.id != evicted);
                inner.items.retain(|i| i.owner != Some(evicted));
            }
        }
    }
}

/// Truncates a description to [`DESCRIPTION_MAX_LEN`] characters, appending
/// an ellipsis marker.
fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        let head: String = description.chars().take(DESCRIPTION_MAX_LEN).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}
