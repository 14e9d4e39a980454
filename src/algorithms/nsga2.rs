//! NSGA-II (Non-dominated Sorting Genetic Algorithm II)
//!
//! Elitist multi-objective search: parents and offspring compete together and
//! survivors are chosen front by front, with crowding distance breaking the tie
//! inside the front that overflows.
//!
//! Reference: Deb, K., Pratap, A., Agarwal, S., & Meyarivan, T. (2002).
//! A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II.
//! IEEE Transactions on Evolutionary Computation, 6(2).

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
use crate::operators::selection::binary_tournament;
use crate::operators::traits::{CrossoverStrategy, MutationStrategy, Operators};
use crate::pareto::ranking::{crowding_distance, fast_non_dominated_sort};
use crate::population::population::Population;
use crate::problem::traits::{Problem, Solution};
use crate::termination::{CancellationToken, TerminationCriterion};

/// NSGA-II individual with rank and crowding info
#[derive(Clone, Debug)]
pub struct Nsga2Individual<S> {
    /// The wrapped solution
    pub solution: S,
    /// Pareto rank (0 = first front)
    pub rank: usize,
    /// Crowding distance within its front
    pub crowding_distance: f64,
}

impl<S> Nsga2Individual<S> {
    /// Wrap a solution; rank and crowding are assigned by the next sort
    pub fn new(solution: S) -> Self {
        Self {
            solution,
            rank: usize::MAX,
            crowding_distance: 0.0,
        }
    }
}

impl<S: Solution> AsRef<[f64]> for Nsga2Individual<S> {
    fn as_ref(&self) -> &[f64] {
        self.solution.objectives()
    }
}

/// Crowded comparison operator
///
/// Returns true if a is better than b (lower rank, or same rank with higher crowding distance)
pub fn crowded_comparison<S>(a: &Nsga2Individual<S>, b: &Nsga2Individual<S>) -> bool {
    a.rank < b.rank || (a.rank == b.rank && a.crowding_distance > b.crowding_distance)
}

/// Sort `individuals` into fronts and store each one's rank and crowding distance
///
/// Returns the fronts as index lists, best front first.
pub fn assign_rank_and_crowding<S: Solution>(
    individuals: &mut [Nsga2Individual<S>],
) -> Vec<Vec<usize>> {
    let fronts = fast_non_dominated_sort(individuals);
    for (rank, front) in fronts.iter().enumerate() {
        let distances = crowding_distance(individuals, front);
        for (&i, distance) in front.iter().zip(distances) {
            individuals[i].rank = rank;
            individuals[i].crowding_distance = distance;
        }
    }
    fronts
}

/// Environmental selection: keep `capacity` of `combined`
///
/// Whole fronts are taken in rank order. The first front that does not fit is
/// sorted by descending crowding distance and cut to fill the remaining slots.
/// Survivors come back with rank and crowding recomputed among themselves.
pub fn select_survivors<S: Solution>(
    mut combined: Vec<Nsga2Individual<S>>,
    capacity: usize,
) -> Vec<Nsga2Individual<S>> {
    let fronts = assign_rank_and_crowding(&mut combined);

    let mut chosen = Vec::with_capacity(capacity);
    for mut front in fronts {
        let room = capacity - chosen.len();
        if room == 0 {
            break;
        }
        if front.len() <= room {
            chosen.extend(front);
        } else {
            front.sort_by(|&a, &b| {
                combined[b]
                    .crowding_distance
                    .total_cmp(&combined[a].crowding_distance)
            });
            chosen.extend(front.into_iter().take(room));
            break;
        }
    }

    let mut slots: Vec<Option<Nsga2Individual<S>>> = combined.into_iter().map(Some).collect();
    let mut survivors: Vec<_> = chosen.into_iter().filter_map(|i| slots[i].take()).collect();
    assign_rank_and_crowding(&mut survivors);
    survivors
}

/// Configuration for [`Nsga2`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Nsga2Config {
    /// Population size (also the offspring count per generation)
    pub population_size: usize,
    /// Probability that a parent pair is recombined rather than copied
    pub crossover_probability: f64,
    /// Attach the current first front to every step record
    pub verbose: bool,
}

impl Default for Nsga2Config {
    fn default() -> Self {
        Self {
            population_size: 100,
            crossover_probability: 1.0,
            verbose: false,
        }
    }
}

impl Nsga2Config {
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

    /// Log the first front with every generation
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the parameters
    pub fn validate(&self) -> EvoResult<()> {
        check_population_size(self.population_size)?;
        check_probability("crossover probability", self.crossover_probability)
    }
}

/// NSGA-II algorithm
pub struct Nsga2<P: Problem, M, C, L> {
    ctx: RunContext<P, L>,
    config: Nsga2Config,
    operators: Operators<M, C>,
    population: Vec<Nsga2Individual<P::Solution>>,
    generation: usize,
}

impl<P, M, C, L> Nsga2<P, M, C, L>
where
    P: Problem,
    M: MutationStrategy<P::Solution>,
    C: CrossoverStrategy<P::Solution>,
    L: ProgressLogger,
{
    /// Create a new NSGA-II engine; fails on an invalid configuration
    pub fn new(
        problem: impl Into<Arc<P>>,
        termination: impl TerminationCriterion + 'static,
        config: Nsga2Config,
        operators: Operators<M, C>,
        logger: L,
    ) -> EvoResult<Self> {
        config.validate()?;
        Ok(Self {
            ctx: RunContext::new(problem.into(), Box::new(termination), logger),
            config,
            operators,
            population: Vec::new(),
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

    pub fn config(&self) -> &Nsga2Config {
        &self.config
    }

    pub fn logger(&self) -> &L {
        self.ctx.logger()
    }

    /// Start the next run from `solution` and mutated copies of it
    pub fn seed<R: Rng>(&mut self, solution: &P::Solution, rng: &mut R) {
        let size = self.config.population_size;
        let seeded = Population::seeded(solution, size, &self.operators.mutation, rng);
        self.population = seeded.into_iter().map(Nsga2Individual::new).collect();
    }

    /// Start the next run from an explicit population of exactly `population_size`
    pub fn set_population(&mut self, solutions: Vec<P::Solution>) -> EvoResult<()> {
        check_population(&solutions, self.config.population_size)?;
        self.population = solutions.into_iter().map(Nsga2Individual::new).collect();
        Ok(())
    }

    /// Copy of the current population's solutions
    pub fn population(&self) -> Vec<P::Solution> {
        self.population.iter().map(|ind| ind.solution.clone()).collect()
    }

    /// Current population with rank and crowding
    pub fn individuals(&self) -> &[Nsga2Individual<P::Solution>] {
        &self.population
    }

    /// Generations completed by the last run
    pub fn steps(&self) -> usize {
        self.generation
    }

    /// Get the Pareto front (rank 0 solutions)
    pub fn pareto_front(&self) -> Vec<P::Solution> {
        self.population
            .iter()
            .filter(|ind| ind.rank == 0)
            .map(|ind| ind.solution.clone())
            .collect()
    }

    /// Create `population_size` evaluated offspring
    fn create_offspring<R: Rng>(&self, rng: &mut R) -> Vec<Nsga2Individual<P::Solution>> {
        let size = self.config.population_size;
        let parents = &self.population;
        let mut children = Vec::with_capacity(size + 1);

        while children.len() < size {
            let i = binary_tournament(parents.len(), rng, |a, b| {
                crowded_comparison(&parents[a], &parents[b])
            });
            let j = binary_tournament(parents.len(), rng, |a, b| {
                crowded_comparison(&parents[a], &parents[b])
            });
            children.extend(self.operators.vary(
                &parents[i].solution,
                &parents[j].solution,
                self.config.crossover_probability,
                rng,
            ));
        }
        children.truncate(size);

        let offspring = Population::from_vec(children);
        offspring.evaluate();
        offspring.into_iter().map(Nsga2Individual::new).collect()
    }

    /// Best-fitness member of the first front
    fn front_leader(&self) -> Option<&P::Solution> {
        self.population
            .iter()
            .filter(|ind| ind.rank == 0)
            .map(|ind| &ind.solution)
            .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    fn log_generation(&mut self, best: &P::Solution) -> EvoResult<()> {
        let front = self.config.verbose.then(|| {
            self.population
                .iter()
                .filter(|ind| ind.rank == 0)
                .map(|ind| ind.solution.objectives().to_vec())
                .collect()
        });
        self.ctx
            .log_step(StepCounter::Generation(self.generation), best, front)
    }

    /// Evolve until the termination criterion or cancellation stops the run
    ///
    /// One step record is logged per generation, including generation 0.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> EvoResult<RunResult<P::Solution>> {
        let size = self.config.population_size;

        self.ctx.start();
        self.generation = 0;
        if self.population.len() != size {
            let initial = Population::random(self.ctx.problem(), size, rng);
            self.population = initial.into_iter().map(Nsga2Individual::new).collect();
        }
        assign_rank_and_crowding(&mut self.population);

        let mut best = self
            .front_leader()
            .ok_or(EvolutionError::EmptyPopulation)?
            .clone();

        info!(
            problem = self.ctx.problem().name(),
            population = size,
            "NSGA-II started"
        );
        self.log_generation(&best)?;
        let mut history = vec![self.stats(best.fitness())];

        let reason = loop {
            if let Some(reason) = self.ctx.should_stop(self.generation, best.fitness()) {
                break reason;
            }

            let offspring = self.create_offspring(rng);
            let mut combined = std::mem::take(&mut self.population);
            combined.extend(offspring);
            self.population = select_survivors(combined, size);
            self.generation += 1;

            if let Some(leader) = self.front_leader() {
                if leader.fitness() < best.fitness() {
                    debug!(
                        generation = self.generation,
                        fitness = leader.fitness(),
                        "new best"
                    );
                    best = leader.clone();
                }
            }
            self.log_generation(&best)?;
            history.push(self.stats(best.fitness()));
        };

        info!(
            generations = self.generation,
            best_fitness = best.fitness(),
            front_size = self.population.iter().filter(|ind| ind.rank == 0).count(),
            reason,
            "NSGA-II finished"
        );
        Ok(RunResult::new(best, self.generation, self.ctx.elapsed(), reason)
            .with_history(history)
            .with_front(self.pareto_front()))
    }

    fn stats(&self, best_fitness: f64) -> GenerationStats {
        let solutions = self.population();
        GenerationStats::from_solutions(self.generation, &solutions, best_fitness)
    }
}
