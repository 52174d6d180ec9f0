//! Greedy local search over adjacent task exchanges.
//!
//! The evaluator prices a swap of a task with its predecessor using the
//! earliest feasible start of the predecessor's slot as the anchor, so the
//! estimate is independent of whatever late start the pair currently
//! carries. The driver bubbles improving tasks toward the head until no
//! adjacent swap reduces the total lateness.

use crate::chain::{NodeId, QueueId};
use crate::task::TaskChain;
use crate::{log_evals, log_moves};

/// Price swapping `task` with its predecessor; apply the swap when `execute`
/// is set and the gain is negative (an improvement).
///
/// Returns the gain regardless of whether it was applied: the change in the
/// pair's combined lateness, negative when the swap helps. A task with no
/// predecessor has nothing to exchange with and gains 0.
///
/// When an improving swap is applied, both tasks are re-tightened: each is
/// raised to its feasibility floor at the new position but held as close to
/// its target as the other allows, so neither carries a stale, overly-late
/// start out of the exchange.
pub fn exchange_gain(chain: &mut TaskChain, task: NodeId, execute: bool) -> i64 {
    let Some(first) = chain.previous(task) else {
        return 0;
    };
    let second = task;

    let first_cost = (chain.start(first) - chain.target(first)).max(0);
    let second_cost = (chain.start(second) - chain.target(second)).max(0);

    // Costs with the pair exchanged, anchored on the earliest feasible start
    // of the slot `first` occupies.
    let anchor = chain.earliest_start(first);
    let alt_first = (anchor + chain.min_margin_before(second) + chain.duration(second)
        - chain.target(first))
    .max(0);
    let alt_second = (anchor - chain.min_margin_before(first) + chain.min_margin_before(second)
        - chain.target(second))
    .max(0);

    let gain = alt_first + alt_second - first_cost - second_cost;

    if execute && gain < 0 {
        chain.shift_earlier(second);
        if let Some(displaced) = chain.next(second) {
            let hold = chain.target(second).min(chain.start(second));
            let floor =
                chain.earliest_start(displaced) - chain.min_margin_before(displaced);
            chain.set_start(displaced, floor.max(hold));

            let room = chain.start(displaced)
                - chain.min_margin_before(displaced)
                - chain.duration(second);
            chain.set_start(second, room.min(chain.target(second)));
        }
    }

    gain
}

/// Greedy improvement pass over one queue.
///
/// Starts at the tail and repeatedly evaluates an executing exchange at the
/// cursor. After an applied swap the cursor stays put (the task now has a
/// new, possibly also improvable predecessor); otherwise it moves to the
/// previous task. Returns the sum of applied gains, zero or negative. Each
/// applied swap strictly decreases the pair's lateness and the score is
/// bounded below, so the pass terminates.
pub fn improve_queue(chain: &mut TaskChain, queue: QueueId, verbosity: u8) -> i64 {
    let mut total = 0;
    let mut cursor = chain.tail(queue);
    while let Some(id) = cursor {
        let gain = exchange_gain(chain, id, true);
        log_evals!(verbosity, "exchange at node {}: gain {}", id.index(), gain);
        if gain < 0 {
            log_moves!(
                verbosity,
                "swapped node {} before its predecessor (gain {})",
                id.index(),
                gain
            );
            total += gain;
        } else {
            cursor = chain.previous(id);
        }
    }
    total
}
