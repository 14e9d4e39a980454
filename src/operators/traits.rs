//! Operator traits
//!
//! This module defines the variation strategy traits engines are configured with.

use rand::Rng;
use tracing::debug;

use crate::error::OperatorResult;

/// Mutation strategy
///
/// Produces a perturbed copy of one parent. The parent is never modified.
pub trait MutationStrategy<S>: Send + Sync {
    /// Mutate a solution into a new child
    fn mutate<R: Rng>(&self, solution: &S, rng: &mut R) -> S;
}

/// Crossover strategy
///
/// Combines two parents into one or two children. Incompatible parents yield
/// `OperatorResult::Failed`, which engines treat as recoverable.
pub trait CrossoverStrategy<S>: Send + Sync {
    /// Apply crossover to two parents
    fn crossover<R: Rng>(&self, parent1: &S, parent2: &S, rng: &mut R) -> OperatorResult<Vec<S>>;
}

/// The pair of variation strategies an engine is configured with
#[derive(Clone, Debug)]
pub struct Operators<M, C> {
    /// Mutation applied to every child
    pub mutation: M,
    /// Crossover applied to every parent pair
    pub crossover: C,
}

impl<M, C> Operators<M, C> {
    /// Bundle a mutation and a crossover strategy
    pub fn new(mutation: M, crossover: C) -> Self {
        Self {
            mutation,
            crossover,
        }
    }

    /// Produce children from two parents
    ///
    /// With probability `crossover_probability` the parents are recombined,
    /// otherwise both are copied. A failed crossover degrades to the unmodified
    /// first parent. Every child is then mutated.
    pub fn vary<S, R>(
        &self,
        parent1: &S,
        parent2: &S,
        crossover_probability: f64,
        rng: &mut R,
    ) -> Vec<S>
    where
        S: Clone,
        M: MutationStrategy<S>,
        C: CrossoverStrategy<S>,
        R: Rng,
    {
        let children = if crossover_probability >= 1.0 || rng.gen::<f64>() < crossover_probability {
            match self.crossover.crossover(parent1, parent2, rng) {
                OperatorResult::Success(children) if !children.is_empty() => children,
                OperatorResult::Success(_) => {
                    debug!("crossover produced no children, keeping first parent");
                    vec![parent1.clone()]
                }
                OperatorResult::Failed(err) => {
                    debug!(error = %err, "crossover failed, keeping first parent");
                    vec![parent1.clone()]
                }
            }
        } else {
            vec![parent1.clone(), parent2.clone()]
        };

        children
            .iter()
            .map(|child| self.mutation.mutate(child, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperatorError;
    use rand::SeedableRng;

    struct AddOne;

    impl MutationStrategy<i32> for AddOne {
        fn mutate<R: Rng>(&self, solution: &i32, _rng: &mut R) -> i32 {
            solution + 1
        }
    }

    struct SumCrossover;

    impl CrossoverStrategy<i32> for SumCrossover {
        fn crossover<R: Rng>(&self, p1: &i32, p2: &i32, _rng: &mut R) -> OperatorResult<Vec<i32>> {
            OperatorResult::Success(vec![p1 + p2, p1 - p2])
        }
    }

    struct FailingCrossover;

    impl CrossoverStrategy<i32> for FailingCrossover {
        fn crossover<R: Rng>(&self, _: &i32, _: &i32, _rng: &mut R) -> OperatorResult<Vec<i32>> {
            OperatorResult::Failed(OperatorError::CrossoverFailed("shape".to_string()))
        }
    }

    #[test]
    fn test_vary_crosses_then_mutates() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let ops = Operators::new(AddOne, SumCrossover);
        assert_eq!(ops.vary(&5, &3, 1.0, &mut rng), vec![9, 3]);
    }

    #[test]
    fn test_vary_without_crossover_copies_parents() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let ops = Operators::new(AddOne, SumCrossover);
        assert_eq!(ops.vary(&5, &3, 0.0, &mut rng), vec![6, 4]);
    }

    #[test]
    fn test_vary_failed_crossover_keeps_first_parent() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let ops = Operators::new(AddOne, FailingCrossover);
        assert_eq!(ops.vary(&5, &3, 1.0, &mut rng), vec![6]);
    }
}
