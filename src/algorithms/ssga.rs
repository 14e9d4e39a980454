//! Steady-state genetic algorithm
//!
//! The population is never replaced wholesale. Each step picks two distinct
//! parents by binary tournament, breeds one or two children and lets them
//! replace the worst members.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithms::context::{
    check_population, check_population_size, check_probability, RunContext,
};
use crate::diagnostics::{GenerationStats, RunResult};
use crate::error::{EvoResult, EvolutionError};
use crate::logging::{ProgressLogger, StepCounter};
use crate::operators::selection::fitness_tournament;
use crate::operators::traits::{CrossoverStrategy, MutationStrategy, Operators};
use crate::population::population::Population;
use crate::problem::traits::{Problem, Solution};
use crate::termination::{CancellationToken, TerminationCriterion};

/// Configuration for [`Ssga`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SsgaConfig {
    /// Population size
    pub population_size: usize,
    /// Probability that the parents are recombined rather than copied
    pub crossover_probability: f64,
}

impl Default for SsgaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            crossover_probability: 1.0,
        }
    }
}

impl SsgaConfig {
    /// Set population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set crossover probability
    pub fn with_crossover_probability(mut self, probability: f64) -> Self {
        self.crossover_probability = probability;
        self
    }

    /// Check the parameters
    pub fn validate(&self) -> EvoResult<()> {
        check_population_size(self.population_size)?;
        check_probability("crossover probability", self.crossover_probability)
    }
}

/// Steady-state GA over a single scalar fitness (lower is better)
pub struct Ssga<P: Problem, M, C, L> {
    ctx: RunContext<P, L>,
    config: SsgaConfig,
    operators: Operators<M, C>,
    population: Population<P::Solution>,
    generation: usize,
}

impl<P, M, C, L> Ssga<P, M, C, L>
where
    P: Problem,
    M: MutationStrategy<P::Solution>,
    C: CrossoverStrategy<P::Solution>,
    L: ProgressLogger,
{
    /// Create an engine; fails on an invalid configuration
    pub fn new(
        problem: impl Into<Arc<P>>,
        termination: impl TerminationCriterion + 'static,
        config: SsgaConfig,
        operators: Operators<M, C>,
        logger: L,
    ) -> EvoResult<Self> {
        config.validate()?;
        Ok(Self {
            ctx: RunContext::new(problem.into(), Box::new(termination), logger),
            config,
            operators,
            population: Population::new(),
            generation: 0,
        })
    }

    /// Stop at the next step boundary once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.ctx.set_cancellation(token);
        self
    }

    /// Handle that cancels this engine's runs
    pub fn cancellation_token(&self) -> CancellationToken {
        self.ctx.cancellation_token()
    }

    /// The configuration
    pub fn config(&self) -> &SsgaConfig {
        &self.config
    }

    /// The progress logger
    pub fn logger(&self) -> &L {
        self.ctx.logger()
    }

    /// Start the next run from `solution` and mutated copies of it
    pub fn seed<R: Rng>(&mut self, solution: &P::Solution, rng: &mut R) {
        let size = self.config.population_size;
        self.population = Population::seeded(solution, size, &self.operators.mutation, rng);
    }

    /// Start the next run from an explicit population of exactly `population_size`
    pub fn set_population(&mut self, solutions: Vec<P::Solution>) -> EvoResult<()> {
        check_population(&solutions, self.config.population_size)?;
        self.population = Population::from_vec(solutions);
        Ok(())
    }

    /// Copy of the current population, best first after a run
    pub fn population(&self) -> Vec<P::Solution> {
        self.population.as_slice().to_vec()
    }

    /// Replacement steps completed by the last run
    pub fn steps(&self) -> usize {
        self.generation
    }

    /// Two distinct tournament winners
    fn select_parents<R: Rng>(&self, rng: &mut R) -> (usize, usize) {
        let fitness: Vec<f64> = self.population.iter().map(Solution::fitness).collect();
        let first = fitness_tournament(&fitness, rng);
        loop {
            let second = fitness_tournament(&fitness, rng);
            if second != first {
                return (first, second);
            }
        }
    }

    /// Run replacement steps until the termination criterion or cancellation
    /// stops the run
    ///
    /// A step record is logged for step 0 and then whenever the leading
    /// fitness changes.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> EvoResult<RunResult<P::Solution>> {
        let size = self.config.population_size;

        self.ctx.start();
        self.generation = 0;
        if self.population.len() != size {
            self.population = Population::random(self.ctx.problem(), size, rng);
        }
        self.population.sort_by_fitness();

        let mut best = self
            .population
            .get(0)
            .ok_or(EvolutionError::EmptyPopulation)?
            .clone();
        let mut last_logged = best.fitness();

        info!(problem = self.ctx.problem().name(), population = size, "SSGA started");
        self.ctx.log_step(StepCounter::Step(0), &best, None)?;
        let mut history = vec![GenerationStats::from_solutions(
            0,
            self.population.as_slice(),
            best.fitness(),
        )];

        let reason = loop {
            if let Some(reason) = self.ctx.should_stop(self.generation, best.fitness()) {
                break reason;
            }

            let (i, j) = self.select_parents(rng);
            let children = self.operators.vary(
                &self.population[i],
                &self.population[j],
                self.config.crossover_probability,
                rng,
            );
            // worst members sit at the tail
            for (k, child) in children.into_iter().take(size).enumerate() {
                self.population.replace(size - 1 - k, child);
            }
            self.population.sort_by_fitness();
            self.generation += 1;

            let leader = &self.population[0];
            if leader.fitness() < best.fitness() {
                debug!(step = self.generation, fitness = leader.fitness(), "new best");
                best = leader.clone();
            }
            if leader.fitness() != last_logged {
                last_logged = leader.fitness();
                self.ctx
                    .log_step(StepCounter::Step(self.generation), leader, None)?;
            }
            history.push(GenerationStats::from_solutions(
                self.generation,
                self.population.as_slice(),
                best.fitness(),
            ));
        };

        info!(
            steps = self.generation,
            best_fitness = best.fitness(),
            reason,
            "SSGA finished"
        );
        Ok(RunResult::new(best, self.generation, self.ctx.elapsed(), reason).with_history(history))
    }
}
