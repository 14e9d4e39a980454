//! Shared run state
//!
//! Every engine owns a [`RunContext`]: the shared problem, the progress logger,
//! the stopping condition and the run clock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{EvoResult, EvolutionError};
use crate::logging::{ProgressLogger, StepCounter, StepRecord};
use crate::problem::traits::Problem;
use crate::termination::{CancellationToken, EvolutionState, TerminationCriterion};

/// Reason reported when a run stops on its cancellation token
pub const CANCELLED: &str = "Cancelled";

/// Run state shared by all engines
pub struct RunContext<P, L> {
    problem: Arc<P>,
    logger: L,
    termination: Box<dyn TerminationCriterion>,
    cancellation: CancellationToken,
    started: Instant,
}

impl<P: Problem, L: ProgressLogger> RunContext<P, L> {
    /// Create a context; the clock starts now and restarts with [`Self::start`]
    pub fn new(problem: Arc<P>, termination: Box<dyn TerminationCriterion>, logger: L) -> Self {
        Self {
            problem,
            logger,
            termination,
            cancellation: CancellationToken::new(),
            started: Instant::now(),
        }
    }

    /// The problem being optimized
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Another handle to the shared problem
    pub fn shared_problem(&self) -> Arc<P> {
        Arc::clone(&self.problem)
    }

    /// Replace the cancellation token
    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancellation = token;
    }

    /// Handle that cancels this run
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The progress logger
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Restart the run clock
    pub fn start(&mut self) {
        self.started = Instant::now();
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Generation-boundary check: the reason to stop, if any
    pub fn should_stop(&self, generation: usize, best_fitness: f64) -> Option<&'static str> {
        if self.cancellation.is_cancelled() {
            return Some(CANCELLED);
        }
        let state = EvolutionState {
            generation,
            elapsed: self.elapsed(),
            best_fitness,
        };
        self.termination.triggered(&state)
    }

    /// Write one step record
    pub fn log_step<S: Serialize>(
        &mut self,
        counter: StepCounter,
        solution: &S,
        pareto_front: Option<Vec<Vec<f64>>>,
    ) -> EvoResult<()> {
        let mut record = StepRecord::new(self.elapsed(), counter, solution);
        if let Some(front) = pareto_front {
            record = record.with_pareto_front(front);
        }
        self.logger.log_step(&record)?;
        Ok(())
    }
}

/// Populations must allow two distinct parents
pub(crate) fn check_population_size(size: usize) -> EvoResult<()> {
    if size < 2 {
        return Err(EvolutionError::Configuration(format!(
            "population size must be at least 2, got {size}"
        )));
    }
    Ok(())
}

/// `value` must be a probability
pub(crate) fn check_probability(name: &str, value: f64) -> EvoResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(EvolutionError::Configuration(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// An externally supplied population must match the configured size
pub(crate) fn check_population<S>(solutions: &[S], expected: usize) -> EvoResult<()> {
    if solutions.len() != expected {
        return Err(EvolutionError::PopulationSizeMismatch {
            expected,
            actual: solutions.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use crate::problems::zdt::{ZdtProblem, ZdtVariant};
    use crate::termination::MaxGenerations;

    fn context() -> RunContext<ZdtProblem, MemoryLogger> {
        let problem = ZdtProblem::new(ZdtVariant::Zdt1, 3).unwrap();
        RunContext::new(Arc::new(problem), Box::new(MaxGenerations::new(5)), MemoryLogger::new())
    }

    #[test]
    fn test_cancellation_wins_over_termination() {
        let ctx = context();
        assert_eq!(ctx.should_stop(0, 1.0), None);
        assert_eq!(ctx.should_stop(5, 1.0), Some("Maximum generations reached"));

        ctx.cancellation_token().cancel();
        assert_eq!(ctx.should_stop(5, 1.0), Some(CANCELLED));
    }

    #[test]
    fn test_log_step_writes_record() {
        let mut ctx = context();
        ctx.log_step(StepCounter::Generation(2), &vec![0.5], Some(vec![vec![0.0, 1.0]]))
            .unwrap();
        let record = &ctx.logger().records()[0];
        assert_eq!(record["generation"], 2);
        assert_eq!(record["pareto_front"][0][1], 1.0);

        ctx.log_step(StepCounter::Generation(3), &vec![0.4], None).unwrap();
        assert!(ctx.logger().records()[1]["pareto_front"].is_null());
    }

    #[test]
    fn test_validation_helpers() {
        assert!(check_population_size(1).is_err());
        assert!(check_probability("rate", 1.5).is_err());
        assert!(check_probability("rate", f64::NAN).is_err());
        assert!(matches!(
            check_population(&[1, 2], 3),
            Err(EvolutionError::PopulationSizeMismatch { expected: 3, actual: 2 })
        ));
    }
}
