//! SPEA2 (Strength Pareto Evolutionary Algorithm 2)
//!
//! Keeps a fixed-size external archive of the best individuals found so far.
//! Every generation the population and the archive are scored together:
//!
//! - strength: how many individuals one dominates
//! - raw fitness: summed strength of everything dominating it (0 = non-dominated)
//! - density: `1 / (d_k + 2)` from the k-th nearest neighbor in objective space
//!
//! The next archive keeps the non-dominated set, topped up with the best
//! dominated individuals or thinned by nearest-neighbor truncation. Parents are
//! drawn from the archive only.
//!
//! Reference: Zitzler, E., Laumanns, M., & Thiele, L. (2001).
//! SPEA2: Improving the Strength Pareto Evolutionary Algorithm. TIK-Report 103.

use std::cmp::Ordering;
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
use crate::pareto::density::{default_density_k, distance_matrix, kth_smallest, knn_density};
use crate::pareto::ranking::dominates;
use crate::population::population::Population;
use crate::problem::traits::{Problem, Solution};
use crate::termination::{CancellationToken, TerminationCriterion};

/// SPEA2 individual with its fitness components
#[derive(Clone, Debug)]
pub struct Spea2Individual<S> {
    /// The wrapped solution
    pub solution: S,
    /// Number of individuals this one dominates
    pub strength: usize,
    /// Sum of the strengths of all individuals dominating this one
    pub raw_fitness: f64,
    /// k-th nearest neighbor density score, in `(0, 0.5]`
    pub density: f64,
    /// `raw_fitness + density`, lower is better
    pub fitness: f64,
}

impl<S> Spea2Individual<S> {
    pub fn new(solution: S) -> Self {
        Self {
            solution,
            strength: 0,
            raw_fitness: 0.0,
            density: 0.0,
            fitness: 0.0,
        }
    }

    /// Raw fitness below one means nothing dominates this individual
    pub fn is_non_dominated(&self) -> bool {
        self.raw_fitness < 1.0
    }
}

impl<S: Solution> AsRef<[f64]> for Spea2Individual<S> {
    fn as_ref(&self) -> &[f64] {
        self.solution.objectives()
    }
}

/// Score every individual against all others
///
/// `k` selects the neighbor used for density (1-based, clamped to the number
/// of other individuals).
pub fn assign_fitness<S: Solution>(individuals: &mut [Spea2Individual<S>], k: usize) {
    let n = individuals.len();

    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in 0..n {
            if i != j && dominates(individuals[j].as_ref(), individuals[i].as_ref()) {
                dominated_by[i].push(j);
            }
        }
    }

    let mut strength = vec![0usize; n];
    for dominators in &dominated_by {
        for &j in dominators {
            strength[j] += 1;
        }
    }

    let distances = distance_matrix(individuals);
    for (i, mut row) in distances.into_iter().enumerate() {
        row.swap_remove(i);
        let raw_fitness: usize = dominated_by[i].iter().map(|&j| strength[j]).sum();
        let ind = &mut individuals[i];
        ind.strength = strength[i];
        ind.raw_fitness = raw_fitness as f64;
        ind.density = knn_density(kth_smallest(&mut row, k));
        ind.fitness = ind.raw_fitness + ind.density;
    }
}

/// Lexicographic order of two ascending distance lists
fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Remove members one at a time until `capacity` remain
///
/// Each round drops the member closest to its nearest neighbor; ties go to the
/// second nearest, and so on. Boundary points of the front are kept longest.
pub fn truncate_archive<S: Solution>(
    members: Vec<Spea2Individual<S>>,
    capacity: usize,
) -> Vec<Spea2Individual<S>> {
    let distances = distance_matrix(&members);
    let mut alive: Vec<usize> = (0..members.len()).collect();

    while alive.len() > capacity {
        let neighbors: Vec<Vec<f64>> = alive
            .iter()
            .map(|&i| {
                let mut row: Vec<f64> = alive
                    .iter()
                    .filter(|&&j| j != i)
                    .map(|&j| distances[i][j])
                    .collect();
                row.sort_by(|a, b| a.total_cmp(b));
                row
            })
            .collect();

        let victim = (0..alive.len())
            .min_by(|&a, &b| lexicographic(&neighbors[a], &neighbors[b]))
            .unwrap_or(0);
        alive.remove(victim);
    }

    let mut slots: Vec<Option<Spea2Individual<S>>> = members.into_iter().map(Some).collect();
    alive.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Build the next archive of exactly `capacity` members from scored individuals
///
/// Fewer than `capacity` individuals yield all of them.
pub fn environmental_selection<S: Solution>(
    combined: Vec<Spea2Individual<S>>,
    capacity: usize,
) -> Vec<Spea2Individual<S>> {
    let (mut archive, mut dominated): (Vec<_>, Vec<_>) =
        combined.into_iter().partition(Spea2Individual::is_non_dominated);

    match archive.len().cmp(&capacity) {
        Ordering::Less => {
            dominated.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
            let missing = capacity - archive.len();
            archive.extend(dominated.into_iter().take(missing));
            archive
        }
        Ordering::Greater => truncate_archive(archive, capacity),
        Ordering::Equal => archive,
    }
}

/// Configuration for [`Spea2`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Spea2Config {
    /// Offspring bred per generation
    pub population_size: usize,
    /// Fixed size of the external archive
    pub archive_size: usize,
    /// Probability that a parent pair is recombined rather than copied
    pub crossover_probability: f64,
    /// Neighbor used for density; `sqrt(population + archive)` when unset
    pub density_kth: Option<usize>,
    /// Attach the archive's non-dominated front to every step record
    pub verbose: bool,
}

impl Default for Spea2Config {
    fn default() -> Self {
        Self {
            population_size: 100,
            archive_size: 50,
            crossover_probability: 1.0,
            density_kth: None,
            verbose: false,
        }
    }
}

impl Spea2Config {
    /// Set population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set archive size
    pub fn with_archive_size(mut self, size: usize) -> Self {
        self.archive_size = size;
        self
    }

    /// Set crossover probability
    pub fn with_crossover_probability(mut self, probability: f64) -> Self {
        self.crossover_probability = probability;
        self
    }

    /// Use the `k`-th nearest neighbor for density
    pub fn with_density_kth(mut self, k: usize) -> Self {
        self.density_kth = Some(k);
        self
    }

    /// Log the archive front with every generation
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Neighbor index used for density over `sample_size` individuals
    pub fn density_k(&self, sample_size: usize) -> usize {
        self.density_kth
            .unwrap_or_else(|| default_density_k(sample_size))
    }

    /// Check the parameters
    pub fn validate(&self) -> EvoResult<()> {
        check_population_size(self.population_size)?;
        if self.archive_size == 0 || self.archive_size > self.population_size {
            return Err(EvolutionError::Configuration(format!(
                "archive size must be in [1, {}], got {}",
                self.population_size, self.archive_size
            )));
        }
        if self.density_kth == Some(0) {
            return Err(EvolutionError::Configuration(
                "density neighbor index must be at least 1".to_string(),
            ));
        }
        check_probability("crossover probability", self.crossover_probability)
    }
}

/// SPEA2 algorithm
pub struct Spea2<P: Problem, M, C, L> {
    ctx: RunContext<P, L>,
    config: Spea2Config,
    operators: Operators<M, C>,
    population: Population<P::Solution>,
    archive: Vec<Spea2Individual<P::Solution>>,
    generation: usize,
}

impl<P, M, C, L> Spea2<P, M, C, L>
where
    P: Problem,
    M: MutationStrategy<P::Solution>,
    C: CrossoverStrategy<P::Solution>,
    L: ProgressLogger,
{
    /// Create a new SPEA2 engine; fails on an invalid configuration
    pub fn new(
        problem: impl Into<Arc<P>>,
        termination: impl TerminationCriterion + 'static,
        config: Spea2Config,
        operators: Operators<M, C>,
        logger: L,
    ) -> EvoResult<Self> {
        config.validate()?;
        Ok(Self {
            ctx: RunContext::new(problem.into(), Box::new(termination), logger),
            config,
            operators,
            population: Population::new(),
            archive: Vec::new(),
            generation: 0,
        })
    }

    /// Stop at the next generation boundary once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.ctx.set_cancellation(token);
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.ctx.cancellation_token()
    }

    pub fn config(&self) -> &Spea2Config {
        &self.config
    }

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

    /// Copy of the current population
    pub fn population(&self) -> Vec<P::Solution> {
        self.population.as_slice().to_vec()
    }

    /// Copy of the current archive
    pub fn archive(&self) -> Vec<P::Solution> {
        self.archive.iter().map(|ind| ind.solution.clone()).collect()
    }

    /// Current archive with fitness components
    pub fn archive_individuals(&self) -> &[Spea2Individual<P::Solution>] {
        &self.archive
    }

    pub fn steps(&self) -> usize {
        self.generation
    }

    /// Non-dominated members of the archive
    pub fn pareto_front(&self) -> Vec<P::Solution> {
        self.archive
            .iter()
            .filter(|ind| ind.is_non_dominated())
            .map(|ind| ind.solution.clone())
            .collect()
    }

    /// Score population and archive together and keep the next archive
    fn update_archive(&mut self) {
        let previous = std::mem::take(&mut self.archive);
        let mut combined: Vec<_> = self
            .population
            .iter()
            .cloned()
            .map(Spea2Individual::new)
            .chain(previous.into_iter().map(|ind| Spea2Individual::new(ind.solution)))
            .collect();

        let k = self.config.density_k(combined.len());
        assign_fitness(&mut combined, k);
        self.archive = environmental_selection(combined, self.config.archive_size);
    }

    /// Breed the next population from the archive
    fn reproduce<R: Rng>(&self, rng: &mut R) -> Population<P::Solution> {
        let size = self.config.population_size;
        let fitness: Vec<f64> = self.archive.iter().map(|ind| ind.fitness).collect();
        let mut children = Vec::with_capacity(size + 1);

        while children.len() < size {
            let i = fitness_tournament(&fitness, rng);
            let j = fitness_tournament(&fitness, rng);
            children.extend(self.operators.vary(
                &self.archive[i].solution,
                &self.archive[j].solution,
                self.config.crossover_probability,
                rng,
            ));
        }
        children.truncate(size);

        let population = Population::from_vec(children);
        population.evaluate();
        population
    }

    /// Lowest scalar fitness in the archive
    fn archive_leader(&self) -> Option<&P::Solution> {
        self.archive
            .iter()
            .map(|ind| &ind.solution)
            .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    fn log_generation(&mut self, best: &P::Solution) -> EvoResult<()> {
        let front = self.config.verbose.then(|| {
            self.archive
                .iter()
                .filter(|ind| ind.is_non_dominated())
                .map(|ind| ind.solution.objectives().to_vec())
                .collect()
        });
        self.ctx
            .log_step(StepCounter::Generation(self.generation), best, front)
    }

    /// Evolve until the termination criterion or cancellation stops the run
    ///
    /// Generation 0 scores the initial population into the first archive. One
    /// step record is logged per generation.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> EvoResult<RunResult<P::Solution>> {
        let size = self.config.population_size;

        self.ctx.start();
        self.generation = 0;
        self.archive.clear();
        if self.population.len() != size {
            self.population = Population::random(self.ctx.problem(), size, rng);
        }
        self.population.evaluate();
        self.update_archive();

        let mut best = self
            .archive_leader()
            .ok_or(EvolutionError::EmptyPopulation)?
            .clone();

        info!(
            problem = self.ctx.problem().name(),
            population = size,
            archive = self.config.archive_size,
            "SPEA2 started"
        );
        self.log_generation(&best)?;
        let mut history = vec![GenerationStats::from_solutions(
            0,
            self.population.as_slice(),
            best.fitness(),
        )];

        let reason = loop {
            if let Some(reason) = self.ctx.should_stop(self.generation, best.fitness()) {
                break reason;
            }

            self.population = self.reproduce(rng);
            self.update_archive();
            self.generation += 1;

            if let Some(leader) = self.archive_leader() {
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
            "SPEA2 finished"
        );
        Ok(RunResult::new(best, self.generation, self.ctx.elapsed(), reason)
            .with_history(history)
            .with_front(self.pareto_front()))
    }
}
