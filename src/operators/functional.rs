//! Closure-backed strategies
//!
//! Lets a driver inject plain functions as operators, decoupled from the
//! solution type.

use rand::{Rng, RngCore};

use crate::error::OperatorResult;
use crate::operators::traits::{CrossoverStrategy, MutationStrategy};

/// Mutation strategy backed by a closure
#[derive(Clone, Debug)]
pub struct FnMutation<F>(F);

impl<F> FnMutation<F> {
    /// Wrap a `Fn(&S, &mut dyn RngCore) -> S` closure
    pub fn new<S>(f: F) -> Self
    where
        F: Fn(&S, &mut dyn RngCore) -> S + Send + Sync,
    {
        Self(f)
    }
}

impl<S, F> MutationStrategy<S> for FnMutation<F>
where
    F: Fn(&S, &mut dyn RngCore) -> S + Send + Sync,
{
    fn mutate<R: Rng>(&self, solution: &S, rng: &mut R) -> S {
        let rng: &mut dyn RngCore = rng;
        (self.0)(solution, rng)
    }
}

/// Crossover strategy backed by a closure
#[derive(Clone, Debug)]
pub struct FnCrossover<F>(F);

impl<F> FnCrossover<F> {
    /// Wrap a `Fn(&S, &S, &mut dyn RngCore) -> OperatorResult<Vec<S>>` closure
    pub fn new<S>(f: F) -> Self
    where
        F: Fn(&S, &S, &mut dyn RngCore) -> OperatorResult<Vec<S>> + Send + Sync,
    {
        Self(f)
    }
}

impl<S, F> CrossoverStrategy<S> for FnCrossover<F>
where
    F: Fn(&S, &S, &mut dyn RngCore) -> OperatorResult<Vec<S>> + Send + Sync,
{
    fn crossover<R: Rng>(&self, parent1: &S, parent2: &S, rng: &mut R) -> OperatorResult<Vec<S>> {
        let rng: &mut dyn RngCore = rng;
        (self.0)(parent1, parent2, rng)
    }
}

/// Strategy that returns the parent unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMutation;

impl<S: Clone> MutationStrategy<S> for NoMutation {
    fn mutate<R: Rng>(&self, solution: &S, _rng: &mut R) -> S {
        solution.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::traits::Operators;
    use rand::SeedableRng;

    #[test]
    fn test_closure_operators() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mutation = FnMutation::new(|x: &f64, _rng: &mut dyn RngCore| x * 2.0);
        let crossover = FnCrossover::new(|a: &f64, b: &f64, _rng: &mut dyn RngCore| {
            OperatorResult::Success(vec![(a + b) / 2.0])
        });
        let ops = Operators::new(mutation, crossover);
        assert_eq!(ops.vary(&1.0, &3.0, 1.0, &mut rng), vec![4.0]);
    }

    #[test]
    fn test_closure_can_draw_from_rng() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let jitter = FnMutation::new(|x: &f64, rng: &mut dyn RngCore| x + rng.gen_range(0.0..1.0));
        let y = jitter.mutate(&10.0, &mut rng);
        assert!((10.0..11.0).contains(&y));
    }

    #[test]
    fn test_no_mutation() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        assert_eq!(NoMutation.mutate(&vec![1, 2], &mut rng), vec![1, 2]);
    }
}
