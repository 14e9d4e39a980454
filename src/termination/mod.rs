//! Termination criteria
//!
//! Stopping conditions are checked once per generation boundary, never in the
//! middle of a generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Run state visible to termination checks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvolutionState {
    /// Generations completed in this run
    pub generation: usize,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
    /// Best fitness found so far
    pub best_fitness: f64,
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;

    /// The reason this criterion fires for `state`, if it does
    fn triggered(&self, state: &EvolutionState) -> Option<&'static str> {
        self.should_terminate(state).then(|| self.reason())
    }
}

impl TerminationCriterion for Box<dyn TerminationCriterion> {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        (**self).should_terminate(state)
    }

    fn reason(&self) -> &'static str {
        (**self).reason()
    }

    fn triggered(&self, state: &EvolutionState) -> Option<&'static str> {
        (**self).triggered(state)
    }
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate once a wall-clock budget is spent
#[derive(Clone, Debug)]
pub struct Timeout(pub Duration);

impl Timeout {
    /// Create a new timeout criterion
    pub fn new(limit: Duration) -> Self {
        Self(limit)
    }
}

impl TerminationCriterion for Timeout {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.elapsed >= self.0
    }

    fn reason(&self) -> &'static str {
        "Timeout reached"
    }
}

/// Terminate when target fitness is reached
#[derive(Clone, Debug)]
pub struct TargetFitness {
    /// Target fitness value (reached when best <= target)
    pub target: f64,
}

impl TargetFitness {
    /// Create a new target fitness criterion
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl TerminationCriterion for TargetFitness {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.best_fitness <= self.target
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Cooperative cancellation signal
///
/// Clones share one flag, so a driver can keep a handle and cancel a run that
/// owns another clone. Engines observe it only between generations.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Terminate when a cancellation token fires
#[derive(Clone, Debug)]
pub struct Cancelled(pub CancellationToken);

impl TerminationCriterion for Cancelled {
    fn should_terminate(&self, _state: &EvolutionState) -> bool {
        self.0.is_cancelled()
    }

    fn reason(&self) -> &'static str {
        "Cancelled"
    }
}

/// Terminate when any of the criteria is met
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new any-of criterion
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }

    /// Add another criterion
    pub fn or(mut self, criterion: impl TerminationCriterion + 'static) -> Self {
        self.criteria.push(Box::new(criterion));
        self
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "Any of multiple criteria met"
    }

    fn triggered(&self, state: &EvolutionState) -> Option<&'static str> {
        self.criteria.iter().find_map(|c| c.triggered(state))
    }
}

pub mod prelude {
    pub use super::{
        AnyOf, CancellationToken, Cancelled, EvolutionState, MaxGenerations, TargetFitness,
        TerminationCriterion, Timeout,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(generation: usize, elapsed_ms: u64, best_fitness: f64) -> EvolutionState {
        EvolutionState {
            generation,
            elapsed: Duration::from_millis(elapsed_ms),
            best_fitness,
        }
    }

    #[test]
    fn test_max_generations() {
        let criterion = MaxGenerations::new(100);
        assert!(!criterion.should_terminate(&state(50, 0, 0.0)));
        assert!(criterion.should_terminate(&state(100, 0, 0.0)));
        assert!(criterion.should_terminate(&state(150, 0, 0.0)));
    }

    #[test]
    fn test_timeout() {
        let criterion = Timeout::new(Duration::from_millis(10));
        assert!(!criterion.should_terminate(&state(0, 9, 0.0)));
        assert!(criterion.should_terminate(&state(0, 10, 0.0)));
    }

    #[test]
    fn test_target_fitness() {
        let criterion = TargetFitness::new(-10.0);
        assert!(!criterion.should_terminate(&state(0, 0, -9.0)));
        assert!(criterion.should_terminate(&state(0, 0, -10.0)));
        assert!(criterion.should_terminate(&state(0, 0, -11.0)));
    }

    #[test]
    fn test_cancellation_token_shared_between_clones() {
        let token = CancellationToken::new();
        let criterion = Cancelled(token.clone());
        assert!(!criterion.should_terminate(&state(0, 0, 0.0)));
        token.cancel();
        assert!(criterion.should_terminate(&state(0, 0, 0.0)));
        assert_eq!(criterion.reason(), "Cancelled");
    }

    #[test]
    fn test_any_of_reports_triggering_reason() {
        let criterion = AnyOf::new(vec![Box::new(MaxGenerations::new(100))])
            .or(TargetFitness::new(0.0));

        assert_eq!(criterion.triggered(&state(10, 0, 5.0)), None);
        assert_eq!(
            criterion.triggered(&state(10, 0, -1.0)),
            Some("Target fitness reached")
        );
        assert_eq!(
            criterion.triggered(&state(100, 0, 5.0)),
            Some("Maximum generations reached")
        );
    }

    #[test]
    fn test_boxed_criterion() {
        let boxed: Box<dyn TerminationCriterion> = Box::new(MaxGenerations::new(1));
        assert_eq!(boxed.triggered(&state(1, 0, 0.0)), Some("Maximum generations reached"));
    }
}
