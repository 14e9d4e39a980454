//! Population type
//!
//! This module provides the Population container type.

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::operators::traits::MutationStrategy;
use crate::problem::traits::{Problem, Solution};

/// An ordered collection of solutions
#[derive(Clone, Debug)]
pub struct Population<S> {
    members: Vec<S>,
}

impl<S: Solution> Population<S> {
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
        }
    }

    /// Create a population from a vector of solutions
    pub fn from_vec(members: Vec<S>) -> Self {
        Self { members }
    }

    /// Create a random population
    pub fn random<P, R>(problem: &P, size: usize, rng: &mut R) -> Self
    where
        P: Problem<Solution = S>,
        R: Rng,
    {
        let members = (0..size).map(|_| problem.random_solution(rng)).collect();
        Self { members }
    }

    /// `size` solutions around `seed`: the seed itself at index 0, mutated
    /// copies of it everywhere else
    pub fn seeded<M, R>(seed: &S, size: usize, mutation: &M, rng: &mut R) -> Self
    where
        M: MutationStrategy<S>,
        R: Rng,
    {
        let mut members = Vec::with_capacity(size);
        if size > 0 {
            members.push(seed.clone());
        }
        while members.len() < size {
            members.push(mutation.mutate(seed, rng));
        }
        Self { members }
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Get a solution by index
    pub fn get(&self, index: usize) -> Option<&S> {
        self.members.get(index)
    }

    /// Add a solution to the population
    pub fn push(&mut self, solution: S) {
        self.members.push(solution);
    }

    /// Replace the solution at `index`
    pub fn replace(&mut self, index: usize, solution: S) {
        self.members[index] = solution;
    }

    /// Get an iterator over the solutions
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.members.iter()
    }

    /// Get the solutions as a slice
    pub fn as_slice(&self) -> &[S] {
        &self.members
    }

    /// Take ownership of the solutions
    pub fn into_vec(self) -> Vec<S> {
        self.members
    }

    /// Get the best solution (lowest fitness)
    pub fn best(&self) -> Option<&S> {
        self.members
            .iter()
            .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Get the worst solution (highest fitness)
    pub fn worst(&self) -> Option<&S> {
        self.members
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Sort the population by fitness (best first, i.e. ascending)
    pub fn sort_by_fitness(&mut self) {
        self.evaluate();
        self.members
            .sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
    }

    /// Mean fitness, if the population is not empty
    pub fn mean_fitness(&self) -> Option<f64> {
        if self.members.is_empty() {
            return None;
        }
        let sum: f64 = self.members.iter().map(Solution::fitness).sum();
        Some(sum / self.members.len() as f64)
    }

    /// Objective vectors of all members
    pub fn objectives(&self) -> Vec<Vec<f64>> {
        self.members.iter().map(|s| s.objectives().to_vec()).collect()
    }

    /// Compute every member's objectives now
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate(&self) {
        for member in &self.members {
            member.objectives();
        }
    }

    /// Compute every member's objectives now, in parallel
    #[cfg(feature = "parallel")]
    pub fn evaluate(&self) {
        self.members.par_iter().for_each(|member| {
            member.objectives();
        });
    }
}

impl<S: Solution> Default for Population<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::ops::Index<usize> for Population<S> {
    type Output = S;

    fn index(&self, index: usize) -> &Self::Output {
        &self.members[index]
    }
}

impl<S> IntoIterator for Population<S> {
    type Item = S;
    type IntoIter = std::vec::IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<S> FromIterator<S> for Population<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
