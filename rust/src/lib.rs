//! Rust implementation of the Sequor scheduling core.
//!
//! This module provides the single-resource sequencing engine behind the
//! scheduling service: per-resource task orders with lazily-cached timing,
//! backward/forward scheduling sweeps, and greedy adjacent-exchange local
//! search minimizing total lateness.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;

pub mod chain;
pub mod config;
pub mod exchange;
pub mod interner;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod sweep;
pub mod task;

pub use chain::{ChainArena, NodeId, QueueId};
pub use config::SolverConfig;
pub use exchange::{exchange_gain, improve_queue};
pub use interner::IdInterner;
pub use models::{SolveReport, TaskSchedule};
pub use scheduler::{SchedulerError, SequenceScheduler};
pub use sweep::{schedule_backward, schedule_forward};
pub use task::{TaskChain, TaskError, TimedTask};

fn to_py_err(err: SchedulerError) -> PyErr {
    match err {
        SchedulerError::UnknownTask(_) | SchedulerError::UnknownResource(_) => {
            PyKeyError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Scheduler façade exposed to the Python service layer (PyO3 wrapper).
#[pyclass(name = "Scheduler")]
pub struct PyScheduler {
    inner: SequenceScheduler,
}

#[pymethods]
impl PyScheduler {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<SolverConfig>) -> Self {
        Self {
            inner: SequenceScheduler::new(config.unwrap_or_default()),
        }
    }

    /// Register a resource with an empty task order.
    fn add_resource(&mut self, name: &str) -> PyResult<()> {
        self.inner.add_resource(name).map(|_| ()).map_err(to_py_err)
    }

    /// Register a detached task.
    #[pyo3(signature = (id, duration, target, min_margin_before=0))]
    fn add_task(
        &mut self,
        id: &str,
        duration: i64,
        target: i64,
        min_margin_before: i64,
    ) -> PyResult<()> {
        self.inner
            .add_task(id, duration, target, min_margin_before)
            .map(|_| ())
            .map_err(to_py_err)
    }

    /// Attach a task at the back of a resource's order.
    fn append_back(&mut self, resource: &str, task: &str) -> PyResult<()> {
        self.inner.append_back(resource, task).map_err(to_py_err)
    }

    /// Attach a task at the front of a resource's order.
    fn append_front(&mut self, resource: &str, task: &str) -> PyResult<()> {
        self.inner.append_front(resource, task).map_err(to_py_err)
    }

    /// Splice a task immediately before another, auto-detaching it first.
    fn insert_before(&mut self, task: &str, before: &str) -> PyResult<()> {
        self.inner.insert_before(task, before).map_err(to_py_err)
    }

    /// Detach a task from its resource.
    fn remove(&mut self, task: &str) -> PyResult<()> {
        self.inner.remove(task).map_err(to_py_err)
    }

    /// Swap a task with its predecessor (no-op at the head).
    fn shift_earlier(&mut self, task: &str) -> PyResult<()> {
        self.inner.shift_earlier(task).map_err(to_py_err)
    }

    /// Swap a task with its successor (no-op at the tail).
    fn shift_later(&mut self, task: &str) -> PyResult<()> {
        self.inner.shift_later(task).map_err(to_py_err)
    }

    /// Run the backward then forward sweep; returns the lateness score.
    fn schedule(&mut self, resource: &str) -> PyResult<i64> {
        self.inner.schedule(resource).map_err(to_py_err)
    }

    /// Run one greedy exchange pass; returns the improvement (<= 0).
    fn improve(&mut self, resource: &str) -> PyResult<i64> {
        self.inner.improve(resource).map_err(to_py_err)
    }

    /// Schedule and improve until stable or the round cap is reached.
    fn solve(&mut self, resource: &str) -> PyResult<SolveReport> {
        self.inner.solve(resource).map_err(to_py_err)
    }

    fn start(&mut self, task: &str) -> PyResult<i64> {
        self.inner.start_of(task).map_err(to_py_err)
    }

    fn earliest_start(&mut self, task: &str) -> PyResult<i64> {
        self.inner.earliest_start_of(task).map_err(to_py_err)
    }

    fn duration(&self, task: &str) -> PyResult<i64> {
        self.inner.duration_of(task).map_err(to_py_err)
    }

    fn target(&self, task: &str) -> PyResult<i64> {
        self.inner.target_of(task).map_err(to_py_err)
    }

    fn min_margin_before(&self, task: &str) -> PyResult<i64> {
        self.inner.margin_of(task).map_err(to_py_err)
    }

    /// Resource the task is currently attached to, if any.
    fn resource_of(&self, task: &str) -> PyResult<Option<String>> {
        self.inner
            .resource_of(task)
            .map(|r| r.map(str::to_string))
            .map_err(to_py_err)
    }

    /// Placement of a task for the response payload.
    fn snapshot(&mut self, task: &str) -> PyResult<TaskSchedule> {
        self.inner.snapshot(task).map_err(to_py_err)
    }

    /// Task ids of a resource in current order.
    fn task_order(&self, resource: &str) -> PyResult<Vec<String>> {
        self.inner
            .task_order(resource)
            .map(|it| it.map(str::to_string).collect())
            .map_err(to_py_err)
    }

    /// Compact rendering of a resource's queue for logs and debugging.
    fn describe(&self, resource: &str) -> PyResult<String> {
        self.inner.describe(resource).map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "Scheduler(resources={}, tasks={})",
            self.inner.resource_count(),
            self.inner.task_count()
        )
    }
}

/// One-shot convenience: schedule and improve a single sequence of tasks.
///
/// `specs` items are `(task_id, duration, target, min_margin_before)`,
/// attached to one resource in the given order.
///
/// # Returns
/// * Tuple of the SolveReport and the per-task placements in final order
///
/// # Raises
/// * ValueError on duplicate ids or negative durations/margins
#[pyfunction]
#[pyo3(signature = (specs, config=None))]
fn schedule_tasks(
    specs: Vec<(String, i64, i64, i64)>,
    config: Option<SolverConfig>,
) -> PyResult<(SolveReport, Vec<TaskSchedule>)> {
    let mut scheduler = SequenceScheduler::new(config.unwrap_or_default());
    scheduler.add_resource("resource").map_err(to_py_err)?;
    for (id, duration, target, margin) in &specs {
        scheduler
            .add_task(id, *duration, *target, *margin)
            .map_err(to_py_err)?;
        scheduler.append_back("resource", id).map_err(to_py_err)?;
    }

    let report = scheduler.solve("resource").map_err(to_py_err)?;

    let order: Vec<String> = scheduler
        .task_order("resource")
        .map_err(to_py_err)?
        .map(str::to_string)
        .collect();
    let mut placements = Vec::with_capacity(order.len());
    for id in &order {
        placements.push(scheduler.snapshot(id).map_err(to_py_err)?);
    }

    Ok((report, placements))
}

/// The sequor.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core classes
    m.add_class::<PyScheduler>()?;
    m.add_class::<SolverConfig>()?;
    m.add_class::<TaskSchedule>()?;
    m.add_class::<SolveReport>()?;

    // Convenience functions
    m.add_function(wrap_pyfunction!(schedule_tasks, m)?)?;

    Ok(())
}
