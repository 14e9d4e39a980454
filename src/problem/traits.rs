//! Problem and solution traits
//!
//! This module defines the capability contract shared by all engines.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::OperatorResult;

/// Immutable description of a search space
///
/// A problem is shared read-only by the engine and by every solution it spawns,
/// so it must be `Send + Sync`. It is serialized as the first record of a
/// progress log.
pub trait Problem: Send + Sync + Serialize {
    /// The candidate type this problem produces
    type Solution: Solution;

    /// Identifying name of the problem instance
    fn name(&self) -> &str;

    /// Produce a uniformly random candidate
    fn random_solution<R: Rng>(&self, rng: &mut R) -> Self::Solution;
}

/// A candidate point in a search space
///
/// All objectives are minimized. `objectives` has a fixed, non-zero length for a
/// given problem and is computed at most once per solution instance.
pub trait Solution: Clone + Send + Sync + Serialize {
    /// Objective vector (smaller is better in every component)
    fn objectives(&self) -> &[f64];

    /// Scalar fitness used by single-objective engines (smaller is better)
    fn fitness(&self) -> f64;
}

/// Solutions that carry their own variation operators
///
/// Used through [`crate::operators::EmbeddedCrossover`] and
/// [`crate::operators::EmbeddedMutation`]; engines never call these directly.
pub trait Evolvable: Solution {
    /// Recombine with another solution, producing one or two children
    ///
    /// Returns `Failed` when the parents have incompatible shapes.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> OperatorResult<Vec<Self>>;

    /// Produce a perturbed copy of this solution
    fn mutate<R: Rng>(&self, rate: f64, rng: &mut R) -> Self;
}

/// A solution produced by an exact or heuristic solver, with its runtime
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceSolution<S> {
    /// The solution found
    pub solution: S,
    /// Wall-clock time the solver took
    #[serde(with = "crate::logging::nanos")]
    pub took: Duration,
}

impl<S> ReferenceSolution<S> {
    /// Pair a solution with the time it took to find it
    pub fn new(solution: S, took: Duration) -> Self {
        Self { solution, took }
    }
}

/// Problems with a known-good solver
pub trait ReferenceSolver: Problem {
    /// Compute a reference solution without evolution
    fn reference_solution(&self) -> ReferenceSolution<Self::Solution>;
}
