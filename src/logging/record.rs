//! Step records written to the progress log

use std::time::Duration;

use serde::Serialize;

/// Which counter a record carries, and its value
///
/// Flattened into the record, so it serializes as one of
/// `"step"`, `"generation"` or `"iteration"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepCounter {
    /// Single-objective engines (SGA, SSGA)
    Step(usize),
    /// Multi-objective engines (NSGA-II, SPEA2)
    Generation(usize),
    /// Force-directed layout
    Iteration(usize),
}

impl StepCounter {
    /// The counter value
    pub fn value(&self) -> usize {
        match *self {
            Self::Step(n) | Self::Generation(n) | Self::Iteration(n) => n,
        }
    }
}

/// One progress record
///
/// ```json
/// {"elapsed": 1200, "generation": 3, "solution": {...}, "pareto_front": [[0.1, 0.9]]}
/// ```
#[derive(Debug, Serialize)]
pub struct StepRecord<'a, S> {
    /// Time since the run started, in nanoseconds
    #[serde(serialize_with = "crate::logging::nanos::serialize")]
    pub elapsed: Duration,
    /// Step, generation or iteration number
    #[serde(flatten)]
    pub counter: StepCounter,
    /// Best solution at this point
    pub solution: &'a S,
    /// Objective vectors of the current non-dominated front, when verbose
    pub pareto_front: Option<Vec<Vec<f64>>>,
}

impl<'a, S> StepRecord<'a, S> {
    /// Create a record without a Pareto front
    pub fn new(elapsed: Duration, counter: StepCounter, solution: &'a S) -> Self {
        Self {
            elapsed,
            counter,
            solution,
            pareto_front: None,
        }
    }

    /// Attach the current front's objective vectors
    pub fn with_pareto_front(mut self, front: Vec<Vec<f64>>) -> Self {
        self.pareto_front = Some(front);
        self
    }
}
