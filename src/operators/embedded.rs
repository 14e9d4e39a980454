//! Adapters for operators embedded on the solution type
//!
//! Solutions implementing [`Evolvable`] carry their own crossover and mutation.
//! These adapters expose them as strategies so engines only ever see
//! [`MutationStrategy`] and [`CrossoverStrategy`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::OperatorResult;
use crate::operators::traits::{CrossoverStrategy, MutationStrategy, Operators};
use crate::problem::traits::Evolvable;

/// Mutation through [`Evolvable::mutate`] with a fixed rate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedMutation {
    /// Rate passed to the solution's own mutation
    pub rate: f64,
}

impl EmbeddedMutation {
    /// Create an adapter with the given mutation rate
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl<S: Evolvable> MutationStrategy<S> for EmbeddedMutation {
    fn mutate<R: Rng>(&self, solution: &S, rng: &mut R) -> S {
        solution.mutate(self.rate, rng)
    }
}

/// Crossover through [`Evolvable::crossover`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedCrossover;

impl<S: Evolvable> CrossoverStrategy<S> for EmbeddedCrossover {
    fn crossover<R: Rng>(&self, parent1: &S, parent2: &S, rng: &mut R) -> OperatorResult<Vec<S>> {
        parent1.crossover(parent2, rng)
    }
}

impl Operators<EmbeddedMutation, EmbeddedCrossover> {
    /// Use the solution type's own operators
    pub fn embedded(mutation_rate: f64) -> Self {
        Operators::new(EmbeddedMutation::new(mutation_rate), EmbeddedCrossover)
    }
}

impl<C> Operators<EmbeddedMutation, C> {
    /// Keep a custom crossover, mutate through the solution type
    pub fn with_embedded_mutation(mutation_rate: f64, crossover: C) -> Self {
        Operators::new(EmbeddedMutation::new(mutation_rate), crossover)
    }
}

impl<M> Operators<M, EmbeddedCrossover> {
    /// Keep a custom mutation, recombine through the solution type
    pub fn with_embedded_crossover(mutation: M) -> Self {
        Operators::new(mutation, EmbeddedCrossover)
    }
}
