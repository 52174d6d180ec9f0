//! Timed tasks and the invalidation-aware mutation layer.
//!
//! A [`TimedTask`] is the payload threaded onto a [`ChainArena`] queue. Its
//! earliest feasible start is a lazily-cached value derived from the
//! predecessor chain: `None` means stale, recomputed on read. Every
//! structural mutation goes through the methods below, which splice links and
//! then taint the affected suffix, because each task's earliest start
//! transitively depends on every predecessor's timing.

use thiserror::Error;

use crate::chain::{ChainArena, NodeId, QueueId};

/// Chain of timed tasks; the concrete arena the scheduling engine runs over.
pub type TaskChain = ChainArena<TimedTask>;

/// Validation errors for task construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("duration must be non-negative, got {0}")]
    NegativeDuration(i64),
    #[error("min_margin_before must be non-negative, got {0}")]
    NegativeMargin(i64),
}

/// Scheduling attributes of one task. All times are integer ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedTask {
    duration: i64,
    target: i64,
    min_margin_before: i64,
    start: i64,
    /// Cached earliest feasible start; `None` when stale.
    earliest: Option<i64>,
}

impl TimedTask {
    /// Create a task occupying the resource for `duration` ticks, aiming to
    /// complete by `target`, requiring `min_margin_before` idle ticks after
    /// its predecessor finishes.
    pub fn new(duration: i64, target: i64, min_margin_before: i64) -> Result<Self, TaskError> {
        if duration < 0 {
            return Err(TaskError::NegativeDuration(duration));
        }
        if min_margin_before < 0 {
            return Err(TaskError::NegativeMargin(min_margin_before));
        }
        Ok(Self {
            duration,
            target,
            min_margin_before,
            start: target,
            earliest: None,
        })
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn min_margin_before(&self) -> i64 {
        self.min_margin_before
    }

    pub fn is_dirty(&self) -> bool {
        self.earliest.is_none()
    }

    /// Compact rendering used by queue descriptions. Stale tasks print
    /// `s=...` instead of forcing a recompute.
    pub(crate) fn label(&self, id: &str) -> String {
        let margin = if self.min_margin_before != 0 {
            format!("{}+", self.min_margin_before)
        } else {
            String::new()
        };
        match self.earliest {
            None => format!("{}[d={}{}, t={}, s=...]", id, margin, self.duration, self.target),
            Some(_) => format!(
                "{}[d={}{}, t={}, s={}]",
                id, margin, self.duration, self.target, self.start
            ),
        }
    }
}

impl ChainArena<TimedTask> {
    pub fn duration(&self, id: NodeId) -> i64 {
        self.payload(id).duration
    }

    pub fn target(&self, id: NodeId) -> i64 {
        self.payload(id).target
    }

    pub fn min_margin_before(&self, id: NodeId) -> i64 {
        self.payload(id).min_margin_before
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.payload(id).is_dirty()
    }

    /// Earliest feasible start given predecessor occupancy and margins.
    /// Recomputes through the stale prefix of the chain when needed.
    pub fn earliest_start(&mut self, id: NodeId) -> i64 {
        self.ensure_clean(id);
        self.payload(id).earliest.unwrap_or(0)
    }

    /// `earliest_start + duration`.
    pub fn earliest_stop(&mut self, id: NodeId) -> i64 {
        self.earliest_start(id) + self.payload(id).duration
    }

    /// Committed start time. Always observed at or above the feasibility
    /// floor.
    pub fn start(&mut self, id: NodeId) -> i64 {
        self.ensure_clean(id);
        self.payload(id).start
    }

    /// Request a start time. The value is clamped up to `earliest_start`;
    /// callers cannot commit an infeasible (too-early) start.
    pub fn set_start(&mut self, id: NodeId, value: i64) {
        let floor = self.earliest_start(id);
        self.payload_mut(id).start = floor.max(value);
    }

    /// Mark `id` and every task after it in sequence order as stale.
    pub fn invalidate_from(&mut self, id: NodeId) {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            self.payload_mut(c).earliest = None;
            cursor = self.next(c);
        }
    }

    /// Recompute the cached timing of `id` if stale. Walks back to the
    /// nearest clean ancestor, then recomputes forward: the earliest start is
    /// the predecessor's earliest stop plus this task's margin (0 at the
    /// head), and `start` is raised to that floor, never lowered.
    fn ensure_clean(&mut self, id: NodeId) {
        if self.payload(id).earliest.is_some() {
            return;
        }

        let mut first = id;
        while let Some(prev) = self.previous(first) {
            if self.payload(prev).earliest.is_some() {
                break;
            }
            first = prev;
        }

        let mut prev_stop = self.previous(first).and_then(|p| {
            let task = self.payload(p);
            task.earliest.map(|earliest| earliest + task.duration)
        });

        let mut cursor = first;
        loop {
            let floor = match prev_stop {
                Some(stop) => stop + self.payload(cursor).min_margin_before,
                None => 0,
            };
            let task = self.payload_mut(cursor);
            task.earliest = Some(floor);
            task.start = task.start.max(floor);
            prev_stop = Some(floor + task.duration);

            if cursor == id {
                break;
            }
            match self.next(cursor) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    /// Attach at the tail of `queue`, detaching from any previous position.
    pub fn attach_back(&mut self, queue: QueueId, id: NodeId) {
        self.invalidate_from(id);
        self.push_back(queue, id);
    }

    /// Attach at the head of `queue`. The entire queue is downstream of the
    /// new head, so the whole queue is tainted.
    pub fn attach_front(&mut self, queue: QueueId, id: NodeId) {
        self.invalidate_from(id);
        self.push_front(queue, id);
        self.invalidate_from(id);
    }

    /// Splice `id` immediately before `anchor`, detaching it first. Taints
    /// the old suffix, then the new position's suffix (which includes
    /// `anchor`).
    pub fn insert_task_before(&mut self, anchor: NodeId, id: NodeId) {
        self.invalidate_from(id);
        self.insert_before(anchor, id);
        self.invalidate_from(id);
    }

    /// Detach `id`, leaving it reusable. The old suffix is tainted before
    /// the links are cut; the detached task itself stays stale so it
    /// recomputes wherever it lands next.
    pub fn remove_task(&mut self, id: NodeId) {
        self.invalidate_from(id);
        self.detach(id);
    }

    /// Exchange `id` with its predecessor. No-op at the head. Invalidation
    /// starts at `id`'s new, earlier position.
    pub fn shift_earlier(&mut self, id: NodeId) {
        if self.previous(id).is_some() {
            self.swap_with_previous(id);
            self.invalidate_from(id);
        }
    }

    /// Exchange `id` with its successor. No-op at the tail. Invalidation
    /// starts at the partner's new, earlier position.
    pub fn shift_later(&mut self, id: NodeId) {
        if let Some(partner) = self.next(id) {
            self.swap_with_next(id);
            self.invalidate_from(partner);
        }
    }
}
