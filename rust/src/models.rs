//! Result payload types handed back to the service layer.

use pyo3::prelude::*;

/// Scheduled placement of a single task.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSchedule {
    #[pyo3(get, set)]
    pub task_id: String,
    #[pyo3(get, set)]
    pub start: i64,
    #[pyo3(get, set)]
    pub end: i64,
    #[pyo3(get, set)]
    pub duration: i64,
    #[pyo3(get, set)]
    pub target: i64,
    #[pyo3(get, set)]
    pub lateness: i64,
}

#[pymethods]
impl TaskSchedule {
    #[new]
    fn new(
        task_id: String,
        start: i64,
        end: i64,
        duration: i64,
        target: i64,
        lateness: i64,
    ) -> Self {
        Self {
            task_id,
            start,
            end,
            duration,
            target,
            lateness,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskSchedule(task_id={:?}, start={}, end={}, lateness={})",
            self.task_id, self.start, self.end, self.lateness
        )
    }
}

/// Outcome of a solve run: a schedule pass plus bounded improvement rounds.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveReport {
    /// Final total lateness after the last schedule pass
    #[pyo3(get, set)]
    pub score: i64,
    /// Final score minus the initial score (zero or negative)
    #[pyo3(get, set)]
    pub improvement: i64,
    /// Improvement rounds that applied at least one exchange
    #[pyo3(get, set)]
    pub rounds: u32,
}

#[pymethods]
impl SolveReport {
    #[new]
    #[pyo3(signature = (score, improvement=0, rounds=0))]
    fn new(score: i64, improvement: i64, rounds: u32) -> Self {
        Self {
            score,
            improvement,
            rounds,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SolveReport(score={}, improvement={}, rounds={})",
            self.score, self.improvement, self.rounds
        )
    }
}
