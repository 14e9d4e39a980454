//! Generational genetic algorithm
//!
//! Every generation the population is sorted by fitness, the elite is carried
//! over unchanged and the rest of the next population is bred from parents
//! drawn uniformly out of the mating pool (the best share of the population).

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::algorithms::context::{
    check_population, check_population_size, check_probability, RunContext,
};
use crate::diagnostics::{GenerationStats, RunResult};
use crate::error::{EvoResult, EvolutionError};
use crate::logging::{ProgressLogger, StepCounter};
use crate::operators::selection::distinct_pair;
use crate::operators::traits::{CrossoverStrategy, MutationStrategy, Operators};
use crate::population::population::Population;
use crate::problem::traits::{Problem, Solution};
use crate::termination::{CancellationToken, TerminationCriterion};

/// Configuration for [`Sga`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SgaConfig {
    /// Population size
    pub population_size: usize,
    /// Share of the population carried over unchanged
    pub elite_percentile: f64,
    /// Share of the population parents are drawn from
    pub mating_pool_percentile: f64,
    /// Probability that a parent pair is recombined rather than copied
    pub crossover_probability: f64,
}

impl Default for SgaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_percentile: 0.1,
            mating_pool_percentile: 0.5,
            crossover_probability: 1.0,
        }
    }
}

impl SgaConfig {
    /// Set population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the fraction of the population carried over unchanged
    pub fn with_elite_percentile(mut self, percentile: f64) -> Self {
        self.elite_percentile = percentile;
        self
    }

    /// Set the fraction of the population parents are drawn from
    pub fn with_mating_pool_percentile(mut self, percentile: f64) -> Self {
        self.mating_pool_percentile = percentile;
        self
    }

    /// Set crossover probability
    pub fn with_crossover_probability(mut self, probability: f64) -> Self {
        self.crossover_probability = probability;
        self
    }

    /// Number of individuals carried over unchanged
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_percentile) as usize
    }

    /// Number of individuals parents are drawn from
    pub fn mating_pool_size(&self) -> usize {
        (self.population_size as f64 * self.mating_pool_percentile) as usize
    }

    /// Check the parameters
    pub fn validate(&self) -> EvoResult<()> {
        check_population_size(self.population_size)?;
        check_probability("elite percentile", self.elite_percentile)?;
        check_probability("mating pool percentile", self.mating_pool_percentile)?;
        check_probability("crossover probability", self.crossover_probability)?;
        if self.mating_pool_size() < 2 {
            return Err(EvolutionError::Configuration(format!(
                "mating pool of {} individuals cannot supply two distinct parents",
                self.mating_pool_size()
            )));
        }
        if self.elite_count() == 0 {
            warn!(
                population_size = self.population_size,
                elite_percentile = self.elite_percentile,
                "elite is empty, best individuals may be lost between generations"
            );
        }
        Ok(())
    }
}

/// Generational GA over a single scalar fitness (lower is better)
pub struct Sga<P: Problem, M, C, L> {
    ctx: RunContext<P, L>,
    config: SgaConfig,
    operators: Operators<M, C>,
    population: Population<P::Solution>,
    generation: usize,
}

impl<P, M, C, L> Sga<P, M, C, L>
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
        config: SgaConfig,
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

    /// Stop at the next generation boundary once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.ctx.set_cancellation(token);
        self
    }

    /// Handle that cancels this engine's runs
    pub fn cancellation_token(&self) -> CancellationToken {
        self.ctx.cancellation_token()
    }

    /// The configuration
    pub fn config(&self) -> &SgaConfig {
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

    /// Generations completed by the last run
    pub fn steps(&self) -> usize {
        self.generation
    }

    /// Evolve until the termination criterion or cancellation stops the run
    ///
    /// Starts from the seeded population if there is one, otherwise from a
    /// random population. A step record is logged for generation 0 and then
    /// whenever the leading fitness changes.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> EvoResult<RunResult<P::Solution>> {
        let size = self.config.population_size;
        let elite = self.config.elite_count();
        let pool = self.config.mating_pool_size();

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

        info!(
            problem = self.ctx.problem().name(),
            population = size,
            elite,
            mating_pool = pool,
            "SGA started"
        );
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

            let mut next = Population::with_capacity(size);
            for survivor in self.population.iter().take(elite) {
                next.push(survivor.clone());
            }
            while next.len() < size {
                let (i, j) = distinct_pair(pool, rng);
                let children = self.operators.vary(
                    &self.population[i],
                    &self.population[j],
                    self.config.crossover_probability,
                    rng,
                );
                for child in children.into_iter().take(size - next.len()) {
                    next.push(child);
                }
            }
            next.sort_by_fitness();
            self.population = next;
            self.generation += 1;

            let leader = &self.population[0];
            if leader.fitness() < best.fitness() {
                debug!(
                    generation = self.generation,
                    fitness = leader.fitness(),
                    "new best"
                );
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
            generations = self.generation,
            best_fitness = best.fitness(),
            reason,
            "SGA finished"
        );
        Ok(RunResult::new(best, self.generation, self.ctx.elapsed(), reason).with_history(history))
    }
}
