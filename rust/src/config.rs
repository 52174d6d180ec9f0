//! Configuration types for the scheduling core.

use pyo3::prelude::*;

/// Tuning knobs for a scheduler instance.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Logging verbosity (0 = silent, 1 = moves, 2 = evals, 3 = debug)
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Upper bound on improvement rounds per solve call
    #[pyo3(get, set)]
    pub max_rounds: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            max_rounds: 10,
        }
    }
}

#[pymethods]
impl SolverConfig {
    #[new]
    #[pyo3(signature = (verbosity=None, max_rounds=None))]
    fn new(verbosity: Option<u8>, max_rounds: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            max_rounds: max_rounds.unwrap_or(defaults.max_rounds),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SolverConfig(verbosity={}, max_rounds={})",
            self.verbosity, self.max_rounds
        )
    }
}
