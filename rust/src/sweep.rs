//! Deterministic scheduling sweeps over a task chain.
//!
//! `schedule_backward` runs tail to head and assigns each task the latest
//! start that neither overshoots its own target nor forces a successor past
//! the start already assigned to it. `schedule_forward` then runs head to
//! tail, raising starts to respect actual predecessor occupancy plus margins,
//! and accumulates the tardiness score the engine minimizes. Backward must
//! run first: it establishes the desired schedule that the forward pass only
//! ever pushes later.

use crate::chain::NodeId;
use crate::task::TaskChain;

/// Propagate due dates tail to head.
///
/// For each task: `start = min(target, next.start - next.min_margin_before -
/// duration)` when a successor exists, else `start = target`. All writes go
/// through the clamping setter, so no task is placed before its feasibility
/// floor.
pub fn schedule_backward(chain: &mut TaskChain, tail: Option<NodeId>) {
    let mut cursor = tail;
    while let Some(id) = cursor {
        let desired = match chain.next(id) {
            Some(next) => {
                let room =
                    chain.start(next) - chain.min_margin_before(next) - chain.duration(id);
                chain.target(id).min(room)
            }
            None => chain.target(id),
        };
        chain.set_start(id, desired);
        cursor = chain.previous(id);
    }
}

/// Propagate feasibility head to tail and return the total lateness score.
///
/// For each task: raise `start` to `previous.start + previous.duration +
/// min_margin_before`, never lowering it below what the backward pass (or a
/// local-search repair) already set. The returned score is the sum of
/// `max(0, start - target)` over all tasks; zero means every task meets its
/// target.
pub fn schedule_forward(chain: &mut TaskChain, head: Option<NodeId>) -> i64 {
    let mut score = 0;
    let mut cursor = head;
    while let Some(id) = cursor {
        if let Some(prev) = chain.previous(id) {
            let floor =
                chain.start(prev) + chain.duration(prev) + chain.min_margin_before(id);
            let current = chain.start(id);
            chain.set_start(id, floor.max(current));
        }
        score += (chain.start(id) - chain.target(id)).max(0);
        cursor = chain.next(id);
    }
    score
}
