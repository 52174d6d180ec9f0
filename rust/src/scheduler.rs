//! Service-facing scheduling façade.
//!
//! [`SequenceScheduler`] owns the task arena, the per-resource queues, and
//! the id interners, and exposes the operations the surrounding service
//! layer drives: registering resources and tasks, splicing tasks into
//! resource orders, running the sweeps, and running local search.

use thiserror::Error;

use crate::chain::{NodeId, QueueId};
use crate::config::SolverConfig;
use crate::exchange::improve_queue;
use crate::interner::IdInterner;
use crate::log_moves;
use crate::models::{SolveReport, TaskSchedule};
use crate::sweep::{schedule_backward, schedule_forward};
use crate::task::{TaskChain, TaskError, TimedTask};

/// Errors surfaced to the service layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("duplicate task id: {0}")]
    DuplicateTask(String),
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),
    #[error("cannot insert task {0} before itself")]
    SelfInsert(String),
    #[error(transparent)]
    InvalidTask(#[from] TaskError),
}

/// Scheduler for a set of independent capacity-1 resources.
///
/// Each resource processes its attached tasks strictly in queue order. The
/// structure is transient: it is built per scheduling run and not persisted.
/// No internal locking; callers invoking it from a concurrent context must
/// serialize runs per scheduler instance.
pub struct SequenceScheduler {
    chain: TaskChain,
    tasks: IdInterner<NodeId>,
    resources: IdInterner<QueueId>,
    config: SolverConfig,
}

impl Default for SequenceScheduler {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl SequenceScheduler {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            chain: TaskChain::new(),
            tasks: IdInterner::default(),
            resources: IdInterner::default(),
            config,
        }
    }

    /// Register a resource with an empty task order.
    pub fn add_resource(&mut self, name: &str) -> Result<QueueId, SchedulerError> {
        if self.resources.get(name).is_some() {
            return Err(SchedulerError::DuplicateResource(name.to_string()));
        }
        let queue = self.chain.new_queue();
        self.resources.register(name, queue);
        Ok(queue)
    }

    /// Register a detached task. Attach it with [`append_back`],
    /// [`append_front`] or [`insert_before`].
    ///
    /// [`append_back`]: Self::append_back
    /// [`append_front`]: Self::append_front
    /// [`insert_before`]: Self::insert_before
    pub fn add_task(
        &mut self,
        id: &str,
        duration: i64,
        target: i64,
        min_margin_before: i64,
    ) -> Result<NodeId, SchedulerError> {
        if self.tasks.get(id).is_some() {
            return Err(SchedulerError::DuplicateTask(id.to_string()));
        }
        let payload = TimedTask::new(duration, target, min_margin_before)?;
        let node = self.chain.new_node(payload);
        self.tasks.register(id, node);
        Ok(node)
    }

    fn task_handle(&self, id: &str) -> Result<NodeId, SchedulerError> {
        self.tasks
            .get(id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.to_string()))
    }

    fn resource_handle(&self, name: &str) -> Result<QueueId, SchedulerError> {
        self.resources
            .get(name)
            .ok_or_else(|| SchedulerError::UnknownResource(name.to_string()))
    }

    /// Attach `task` at the back of `resource`'s order, detaching it from
    /// any previous position first.
    pub fn append_back(&mut self, resource: &str, task: &str) -> Result<(), SchedulerError> {
        let queue = self.resource_handle(resource)?;
        let node = self.task_handle(task)?;
        self.chain.attach_back(queue, node);
        Ok(())
    }

    /// Attach `task` at the front of `resource`'s order.
    pub fn append_front(&mut self, resource: &str, task: &str) -> Result<(), SchedulerError> {
        let queue = self.resource_handle(resource)?;
        let node = self.task_handle(task)?;
        self.chain.attach_front(queue, node);
        Ok(())
    }

    /// Splice `task` immediately before `before`, in the same or a different
    /// resource's order. Inserting a task before itself is refused.
    pub fn insert_before(&mut self, task: &str, before: &str) -> Result<(), SchedulerError> {
        let node = self.task_handle(task)?;
        let anchor = self.task_handle(before)?;
        if node == anchor {
            return Err(SchedulerError::SelfInsert(task.to_string()));
        }
        self.chain.insert_task_before(anchor, node);
        Ok(())
    }

    /// Detach `task` from its resource. Safe no-op when already detached.
    pub fn remove(&mut self, task: &str) -> Result<(), SchedulerError> {
        let node = self.task_handle(task)?;
        self.chain.remove_task(node);
        Ok(())
    }

    /// Swap `task` with its predecessor. No-op at the head.
    pub fn shift_earlier(&mut self, task: &str) -> Result<(), SchedulerError> {
        let node = self.task_handle(task)?;
        self.chain.shift_earlier(node);
        Ok(())
    }

    /// Swap `task` with its successor. No-op at the tail.
    pub fn shift_later(&mut self, task: &str) -> Result<(), SchedulerError> {
        let node = self.task_handle(task)?;
        self.chain.shift_later(node);
        Ok(())
    }

    fn schedule_queue(&mut self, queue: QueueId) -> i64 {
        let tail = self.chain.tail(queue);
        schedule_backward(&mut self.chain, tail);
        let head = self.chain.head(queue);
        schedule_forward(&mut self.chain, head)
    }

    /// Run the backward then forward sweep over `resource`; returns the
    /// total lateness score.
    pub fn schedule(&mut self, resource: &str) -> Result<i64, SchedulerError> {
        let queue = self.resource_handle(resource)?;
        let score = self.schedule_queue(queue);
        log_moves!(
            self.config.verbosity,
            "{}: schedule score {}",
            resource,
            score
        );
        Ok(score)
    }

    /// Run one greedy adjacent-exchange pass over `resource`; returns the
    /// total score improvement (zero or negative).
    pub fn improve(&mut self, resource: &str) -> Result<i64, SchedulerError> {
        let queue = self.resource_handle(resource)?;
        Ok(improve_queue(&mut self.chain, queue, self.config.verbosity))
    }

    /// Schedule, then alternate improvement passes and re-schedules until a
    /// pass yields no gain or `max_rounds` is reached.
    pub fn solve(&mut self, resource: &str) -> Result<SolveReport, SchedulerError> {
        let queue = self.resource_handle(resource)?;
        let verbosity = self.config.verbosity;

        let initial = self.schedule_queue(queue);
        let mut score = initial;
        let mut rounds = 0;
        while rounds < self.config.max_rounds {
            let gain = improve_queue(&mut self.chain, queue, verbosity);
            if gain >= 0 {
                break;
            }
            rounds += 1;
            score = self.schedule_queue(queue);
            log_moves!(
                verbosity,
                "{}: round {} gain {} score {}",
                resource,
                rounds,
                gain,
                score
            );
        }

        Ok(SolveReport {
            score,
            improvement: score - initial,
            rounds,
        })
    }

    /// Committed start time of `task`.
    pub fn start_of(&mut self, task: &str) -> Result<i64, SchedulerError> {
        let node = self.task_handle(task)?;
        Ok(self.chain.start(node))
    }

    /// Earliest feasible start of `task`.
    pub fn earliest_start_of(&mut self, task: &str) -> Result<i64, SchedulerError> {
        let node = self.task_handle(task)?;
        Ok(self.chain.earliest_start(node))
    }

    pub fn duration_of(&self, task: &str) -> Result<i64, SchedulerError> {
        Ok(self.chain.duration(self.task_handle(task)?))
    }

    pub fn target_of(&self, task: &str) -> Result<i64, SchedulerError> {
        Ok(self.chain.target(self.task_handle(task)?))
    }

    pub fn margin_of(&self, task: &str) -> Result<i64, SchedulerError> {
        Ok(self.chain.min_margin_before(self.task_handle(task)?))
    }

    /// Resource `task` is currently attached to, if any.
    pub fn resource_of(&self, task: &str) -> Result<Option<&str>, SchedulerError> {
        let node = self.task_handle(task)?;
        Ok(self
            .chain
            .queue_of(node)
            .and_then(|q| self.resources.name_at(q.index())))
    }

    /// Placement of `task` for the response payload.
    pub fn snapshot(&mut self, task: &str) -> Result<TaskSchedule, SchedulerError> {
        let node = self.task_handle(task)?;
        let start = self.chain.start(node);
        let duration = self.chain.duration(node);
        let target = self.chain.target(node);
        Ok(TaskSchedule {
            task_id: task.to_string(),
            start,
            end: start + duration,
            duration,
            target,
            lateness: (start - target).max(0),
        })
    }

    /// Forward traversal of `resource`'s tasks in current order.
    /// Restartable: each call yields a fresh iterator.
    pub fn task_order<'a>(
        &'a self,
        resource: &str,
    ) -> Result<impl Iterator<Item = &'a str> + 'a, SchedulerError> {
        let queue = self.resource_handle(resource)?;
        Ok(self
            .chain
            .iter(queue)
            .filter_map(move |id| self.tasks.name_at(id.index())))
    }

    /// Compact rendering of `resource`'s queue, e.g.
    /// `mill[cut[d=2+5, t=10, s=3], polish[d=3, t=15, s=...]]`.
    pub fn describe(&self, resource: &str) -> Result<String, SchedulerError> {
        let queue = self.resource_handle(resource)?;
        let labels: Vec<String> = self
            .chain
            .iter(queue)
            .map(|id| {
                let name = self.tasks.name_at(id.index()).unwrap_or("?");
                self.chain.payload(id).label(name)
            })
            .collect();
        Ok(format!("{}[{}]", resource, labels.join(", ")))
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler_with(specs: &[(&str, i64, i64, i64)]) -> SequenceScheduler {
        let mut scheduler = SequenceScheduler::default();
        scheduler.add_resource("mill").unwrap();
        for &(id, duration, target, margin) in specs {
            scheduler.add_task(id, duration, target, margin).unwrap();
            scheduler.append_back("mill", id).unwrap();
        }
        scheduler
    }

    fn order(scheduler: &SequenceScheduler, resource: &str) -> Vec<String> {
        scheduler
            .task_order(resource)
            .unwrap()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut scheduler = SequenceScheduler::default();
        scheduler.add_resource("mill").unwrap();
        assert_eq!(
            scheduler.add_resource("mill"),
            Err(SchedulerError::DuplicateResource("mill".to_string()))
        );
        scheduler.add_task("cut", 5, 10, 0).unwrap();
        assert!(matches!(
            scheduler.add_task("cut", 1, 1, 0),
            Err(SchedulerError::DuplicateTask(_))
        ));
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let mut scheduler = SequenceScheduler::default();
        assert!(matches!(
            scheduler.schedule("mill"),
            Err(SchedulerError::UnknownResource(_))
        ));
        assert!(matches!(
            scheduler.start_of("cut"),
            Err(SchedulerError::UnknownTask(_))
        ));
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let mut scheduler = SequenceScheduler::default();
        assert_eq!(
            scheduler.add_task("cut", -1, 10, 0),
            Err(SchedulerError::InvalidTask(TaskError::NegativeDuration(-1)))
        );
    }

    #[test]
    fn test_self_insert_is_refused() {
        let mut scheduler = scheduler_with(&[("cut", 5, 10, 0)]);
        assert_eq!(
            scheduler.insert_before("cut", "cut"),
            Err(SchedulerError::SelfInsert("cut".to_string()))
        );
    }

    #[test]
    fn test_insert_reorders_queue() {
        let mut scheduler = scheduler_with(&[("cut", 5, 10, 0), ("polish", 4, 20, 0)]);
        scheduler.add_task("drill", 3, 8, 0).unwrap();
        scheduler.insert_before("drill", "polish").unwrap();
        assert_eq!(order(&scheduler, "mill"), vec!["cut", "drill", "polish"]);
    }

    #[test]
    fn test_remove_then_reattach() {
        let mut scheduler =
            scheduler_with(&[("cut", 5, 10, 0), ("drill", 3, 8, 0), ("polish", 4, 20, 0)]);
        scheduler.remove("drill").unwrap();
        assert_eq!(order(&scheduler, "mill"), vec!["cut", "polish"]);
        assert_eq!(scheduler.resource_of("drill").unwrap(), None);

        // Removing again is a safe no-op.
        scheduler.remove("drill").unwrap();

        scheduler.append_front("mill", "drill").unwrap();
        assert_eq!(order(&scheduler, "mill"), vec!["drill", "cut", "polish"]);
        assert_eq!(scheduler.resource_of("drill").unwrap(), Some("mill"));
    }

    #[test]
    fn test_insert_across_resources() {
        let mut scheduler = scheduler_with(&[("cut", 5, 10, 0), ("polish", 4, 20, 0)]);
        scheduler.add_resource("lathe").unwrap();
        scheduler.add_task("turn", 2, 6, 0).unwrap();
        scheduler.append_back("lathe", "turn").unwrap();

        scheduler.insert_before("polish", "turn").unwrap();
        assert_eq!(order(&scheduler, "mill"), vec!["cut"]);
        assert_eq!(order(&scheduler, "lathe"), vec!["polish", "turn"]);
        assert_eq!(scheduler.resource_of("polish").unwrap(), Some("lathe"));

        // Timing follows the new queue.
        scheduler.schedule("lathe").unwrap();
        assert_eq!(scheduler.earliest_start_of("turn").unwrap(), 4);
    }

    #[test]
    fn test_shift_operations_reorder() {
        let mut scheduler =
            scheduler_with(&[("cut", 5, 10, 0), ("drill", 3, 8, 0), ("polish", 4, 20, 0)]);
        scheduler.shift_earlier("drill").unwrap();
        assert_eq!(order(&scheduler, "mill"), vec!["drill", "cut", "polish"]);
        scheduler.shift_later("drill").unwrap();
        assert_eq!(order(&scheduler, "mill"), vec!["cut", "drill", "polish"]);

        // Boundary shifts are no-ops.
        scheduler.shift_earlier("cut").unwrap();
        scheduler.shift_later("polish").unwrap();
        assert_eq!(order(&scheduler, "mill"), vec!["cut", "drill", "polish"]);
    }

    #[test]
    fn test_schedule_reports_score() {
        let mut scheduler = scheduler_with(&[("rush", 5, 0, 0), ("next", 1, 0, 0)]);
        assert_eq!(scheduler.schedule("mill").unwrap(), 5);
        // Idempotent without intervening mutation.
        assert_eq!(scheduler.schedule("mill").unwrap(), 5);
    }

    #[test]
    fn test_solve_improves_and_reports() {
        let mut scheduler = scheduler_with(&[("rush", 5, 0, 0), ("next", 1, 0, 0)]);
        let report = scheduler.solve("mill").unwrap();
        assert_eq!(report.score, 1);
        assert_eq!(report.improvement, -4);
        assert_eq!(report.rounds, 1);
        assert_eq!(order(&scheduler, "mill"), vec!["next", "rush"]);
    }

    #[test]
    fn test_solve_on_satisfiable_queue_is_quiet() {
        let mut scheduler = scheduler_with(&[("cut", 5, 10, 0), ("polish", 4, 20, 0)]);
        let report = scheduler.solve("mill").unwrap();
        assert_eq!(report.score, 0);
        assert_eq!(report.improvement, 0);
        assert_eq!(report.rounds, 0);
    }

    #[test]
    fn test_improve_leaves_a_feasible_queue_alone() {
        let mut scheduler =
            scheduler_with(&[("a", 3, 5, 0), ("b", 2, 5, 0), ("c", 4, 12, 0)]);
        assert_eq!(scheduler.schedule("mill").unwrap(), 0);
        assert_eq!(scheduler.improve("mill").unwrap(), 0);
        assert_eq!(scheduler.start_of("a").unwrap(), 2);
        assert_eq!(scheduler.start_of("b").unwrap(), 5);
        assert_eq!(scheduler.start_of("c").unwrap(), 12);
    }

    #[test]
    fn test_snapshot_fields() {
        let mut scheduler = scheduler_with(&[("rush", 5, 0, 0), ("next", 1, 0, 0)]);
        scheduler.schedule("mill").unwrap();
        let placement = scheduler.snapshot("next").unwrap();
        assert_eq!(placement.task_id, "next");
        assert_eq!(placement.start, 5);
        assert_eq!(placement.end, 6);
        assert_eq!(placement.duration, 1);
        assert_eq!(placement.target, 0);
        assert_eq!(placement.lateness, 5);
    }

    #[test]
    fn test_describe_renders_queue() {
        let mut scheduler = scheduler_with(&[("cut", 5, 10, 2), ("polish", 4, 20, 0)]);
        assert_eq!(
            scheduler.describe("mill").unwrap(),
            "mill[cut[d=2+5, t=10, s=...], polish[d=4, t=20, s=...]]"
        );
        scheduler.schedule("mill").unwrap();
        assert_eq!(
            scheduler.describe("mill").unwrap(),
            "mill[cut[d=2+5, t=10, s=10], polish[d=4, t=20, s=20]]"
        );
    }

    #[test]
    fn test_task_order_is_restartable() {
        let scheduler = scheduler_with(&[("cut", 5, 10, 0), ("polish", 4, 20, 0)]);
        assert_eq!(order(&scheduler, "mill"), vec!["cut", "polish"]);
        assert_eq!(order(&scheduler, "mill"), vec!["cut", "polish"]);
    }
}
