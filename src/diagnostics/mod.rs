//! Diagnostics and statistics
//!
//! This module provides per-generation statistics and the result of a run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::problem::traits::Solution;

/// Statistics for a single generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Number of individuals in the population
    pub population_size: usize,
    /// Best fitness found so far in the run
    pub best_fitness: f64,
    /// Best fitness in this generation's population
    pub generation_best: f64,
    /// Mean fitness of this generation's population
    pub mean_fitness: f64,
}

impl GenerationStats {
    /// Compute statistics from a population
    pub fn from_solutions<S: Solution>(
        generation: usize,
        solutions: &[S],
        best_fitness: f64,
    ) -> Self {
        let mut generation_best = f64::INFINITY;
        let mut sum = 0.0;
        for s in solutions {
            let f = s.fitness();
            generation_best = generation_best.min(f);
            sum += f;
        }
        let mean_fitness = if solutions.is_empty() {
            0.0
        } else {
            sum / solutions.len() as f64
        };

        Self {
            generation,
            population_size: solutions.len(),
            best_fitness,
            generation_best,
            mean_fitness,
        }
    }
}

/// Result of an engine run
#[derive(Clone, Debug, Serialize)]
pub struct RunResult<S> {
    /// The best solution found
    pub best: S,
    /// Fitness of the best solution
    pub best_fitness: f64,
    /// Number of generations completed
    pub generations: usize,
    /// Wall-clock time of the run
    #[serde(serialize_with = "crate::logging::nanos::serialize")]
    pub elapsed: Duration,
    /// Why the run stopped
    pub termination_reason: &'static str,
    /// Statistics, one entry per generation including the initial one
    pub history: Vec<GenerationStats>,
    /// Final non-dominated front (multi-objective engines only)
    pub front: Vec<S>,
}

impl<S: Solution> RunResult<S> {
    /// Create a new run result
    pub fn new(
        best: S,
        generations: usize,
        elapsed: Duration,
        termination_reason: &'static str,
    ) -> Self {
        let best_fitness = best.fitness();
        Self {
            best,
            best_fitness,
            generations,
            elapsed,
            termination_reason,
            history: Vec::new(),
            front: Vec::new(),
        }
    }

    /// Add per-generation statistics
    pub fn with_history(mut self, history: Vec<GenerationStats>) -> Self {
        self.history = history;
        self
    }

    /// Add the final non-dominated front
    pub fn with_front(mut self, front: Vec<S>) -> Self {
        self.front = front;
        self
    }

    /// Best-so-far fitness after each generation
    pub fn fitness_history(&self) -> Vec<f64> {
        self.history.iter().map(|g| g.best_fitness).collect()
    }

    /// Objective vectors of the final front
    pub fn front_objectives(&self) -> Vec<Vec<f64>> {
        self.front.iter().map(|s| s.objectives().to_vec()).collect()
    }
}

pub mod prelude {
    pub use super::{GenerationStats, RunResult};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Serialize)]
    struct Fixed(Vec<f64>);

    impl Solution for Fixed {
        fn objectives(&self) -> &[f64] {
            &self.0
        }

        fn fitness(&self) -> f64 {
            self.0.iter().sum()
        }
    }

    #[test]
    fn test_generation_stats() {
        let pop = vec![Fixed(vec![1.0]), Fixed(vec![3.0]), Fixed(vec![5.0])];
        let stats = GenerationStats::from_solutions(4, &pop, 0.5);
        assert_eq!(stats.generation, 4);
        assert_eq!(stats.population_size, 3);
        assert_eq!(stats.best_fitness, 0.5);
        assert_eq!(stats.generation_best, 1.0);
        assert_eq!(stats.mean_fitness, 3.0);
    }

    #[test]
    fn test_generation_stats_empty() {
        let stats = GenerationStats::from_solutions::<Fixed>(0, &[], 1.0);
        assert_eq!(stats.population_size, 0);
        assert_eq!(stats.mean_fitness, 0.0);
    }

    #[test]
    fn test_run_result() {
        let history = vec![
            GenerationStats::from_solutions(0, &[Fixed(vec![2.0])], 2.0),
            GenerationStats::from_solutions(1, &[Fixed(vec![1.0])], 1.0),
        ];
        let result = RunResult::new(Fixed(vec![0.25, 0.75]), 1, Duration::from_millis(5), "done")
            .with_history(history)
            .with_front(vec![Fixed(vec![0.25, 0.75]), Fixed(vec![0.75, 0.25])]);

        assert_eq!(result.best_fitness, 1.0);
        assert_eq!(result.fitness_history(), vec![2.0, 1.0]);
        assert_eq!(result.front_objectives()[1], vec![0.75, 0.25]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["elapsed"], 5_000_000);
        assert_eq!(json["termination_reason"], "done");
    }
}
