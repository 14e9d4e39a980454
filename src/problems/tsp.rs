//! Travelling salesman on the plane
//!
//! Tours start and end at city 0; the genome is the visiting order of the
//! remaining cities.

use std::sync::Arc;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{EvoResult, EvolutionError, GenomeError, OperatorResult};
use crate::problem::cache::ObjectiveCache;
use crate::problem::traits::{Evolvable, Problem, ReferenceSolution, ReferenceSolver, Solution};

/// A city position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub x: f64,
    pub y: f64,
}

impl City {
    /// Create a city
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another city
    pub fn distance(&self, other: &City) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// TSP instance
#[derive(Clone, Debug, Serialize)]
pub struct TspProblem {
    name: String,
    cities: Arc<[City]>,
}

impl TspProblem {
    /// Create an instance; at least two cities are required
    pub fn new(cities: Vec<City>) -> EvoResult<Self> {
        if cities.len() < 2 {
            return Err(EvolutionError::Configuration(
                "TSP needs at least 2 cities".to_string(),
            ));
        }
        Ok(Self {
            name: "TSP".to_string(),
            cities: cities.into(),
        })
    }

    /// `n` cities uniformly placed in a `side × side` square
    pub fn random<R: Rng>(n: usize, side: f64, rng: &mut R) -> EvoResult<Self> {
        let cities = (0..n)
            .map(|_| City::new(rng.gen::<f64>() * side, rng.gen::<f64>() * side))
            .collect();
        Self::new(cities)
    }

    /// Cities of this instance
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Build a solution from a visiting order of cities `1..n`
    pub fn solution(&self, order: Vec<usize>) -> EvoResult<TspSolution> {
        let n = self.cities.len();
        let mut seen = vec![false; n];
        let valid = order.len() == n - 1
            && order.iter().all(|&c| {
                let fresh = c > 0 && c < n && !seen[c];
                if fresh {
                    seen[c] = true;
                }
                fresh
            });
        if !valid {
            return Err(GenomeError::InvalidStructure(format!(
                "order must be a permutation of 1..{n}"
            ))
            .into());
        }
        Ok(TspSolution::new(self.clone(), order))
    }
}

impl Problem for TspProblem {
    type Solution = TspSolution;

    fn name(&self) -> &str {
        &self.name
    }

    fn random_solution<R: Rng>(&self, rng: &mut R) -> TspSolution {
        let mut order: Vec<usize> = (1..self.cities.len()).collect();
        order.shuffle(rng);
        TspSolution::new(self.clone(), order)
    }
}

impl ReferenceSolver for TspProblem {
    /// Exhaustive search over all visiting orders
    ///
    /// Factorial in the number of cities; intended for small instances.
    fn reference_solution(&self) -> ReferenceSolution<TspSolution> {
        let start = Instant::now();
        let mut order: Vec<usize> = (1..self.cities.len()).collect();
        let mut best_order = order.clone();
        let mut best_length = tour_length(&self.cities, &order);
        let mut visited = 1usize;

        while next_permutation(&mut order) {
            visited += 1;
            let length = tour_length(&self.cities, &order);
            if length < best_length {
                best_length = length;
                best_order.copy_from_slice(&order);
            }
        }

        debug!(tours = visited, best = best_length, "brute-force TSP finished");
        ReferenceSolution::new(TspSolution::new(self.clone(), best_order), start.elapsed())
    }
}

/// Length of the closed tour `0 -> order... -> 0`
fn tour_length(cities: &[City], order: &[usize]) -> f64 {
    let mut length = 0.0;
    let mut current = &cities[0];
    for &i in order {
        length += current.distance(&cities[i]);
        current = &cities[i];
    }
    length + current.distance(&cities[0])
}

/// Advance to the next lexicographic permutation; `false` after the last one
fn next_permutation(values: &mut [usize]) -> bool {
    if values.len() < 2 {
        return false;
    }
    let mut i = values.len() - 1;
    while i > 0 && values[i - 1] >= values[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = values.len() - 1;
    while values[j] <= values[i - 1] {
        j -= 1;
    }
    values.swap(i - 1, j);
    values[i..].reverse();
    true
}

/// A tour through all cities
#[derive(Clone, Debug)]
pub struct TspSolution {
    problem: TspProblem,
    order: Vec<usize>,
    cache: ObjectiveCache,
}

impl TspSolution {
    fn new(problem: TspProblem, order: Vec<usize>) -> Self {
        Self {
            problem,
            order,
            cache: ObjectiveCache::new(),
        }
    }

    /// Visiting order of cities `1..n`
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Closed tour length
    pub fn length(&self) -> f64 {
        self.objectives()[0]
    }
}

impl Solution for TspSolution {
    fn objectives(&self) -> &[f64] {
        self.cache
            .get_or_compute(|| vec![tour_length(&self.problem.cities, &self.order)])
    }

    fn fitness(&self) -> f64 {
        self.objectives()[0]
    }
}

/// Keep `keeper`'s genes where `mask` is set, fill the rest with `donor`'s
/// remaining cities in `donor`'s order
fn order_fill(keeper: &[usize], donor: &[usize], mask: &[bool], num_cities: usize) -> Vec<usize> {
    let mut used = vec![false; num_cities];
    for (&gene, _) in keeper.iter().zip(mask).filter(|(_, keep)| **keep) {
        used[gene] = true;
    }
    let mut fill = donor.iter().copied().filter(|&c| !used[c]);
    keeper
        .iter()
        .zip(mask)
        .map(|(&gene, &keep)| if keep { gene } else { fill.next().unwrap_or(gene) })
        .collect()
}

impl Evolvable for TspSolution {
    /// Uniform order crossover
    ///
    /// A random mask fixes genes of one parent; the gaps are filled with the
    /// missing cities in the other parent's order. Children are always valid
    /// permutations.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> OperatorResult<Vec<Self>> {
        if self.order.len() != other.order.len() {
            return OperatorResult::Failed(
                GenomeError::DimensionMismatch {
                    expected: self.order.len(),
                    actual: other.order.len(),
                }
                .into(),
            );
        }

        let n = self.problem.cities.len();
        let mask: Vec<bool> = (0..self.order.len()).map(|_| rng.gen_bool(0.5)).collect();
        let inverse: Vec<bool> = mask.iter().map(|&m| !m).collect();

        let child1 = order_fill(&self.order, &other.order, &mask, n);
        let child2 = order_fill(&other.order, &self.order, &inverse, n);

        OperatorResult::Success(vec![
            Self::new(self.problem.clone(), child1),
            Self::new(self.problem.clone(), child2),
        ])
    }

    /// Every position is swapped with a random partner with probability `rate`
    fn mutate<R: Rng>(&self, rate: f64, rng: &mut R) -> Self {
        let mut order = self.order.clone();
        let len = order.len();
        for i in 0..len {
            if rng.gen::<f64>() < rate {
                let j = rng.gen_range(0..len);
                order.swap(i, j);
            }
        }
        Self::new(self.problem.clone(), order)
    }
}

impl Serialize for TspSolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TspSolution", 3)?;
        state.serialize_field("order", &self.order)?;
        state.serialize_field("objectives", self.objectives())?;
        state.serialize_field("fitness", &self.fitness())?;
        state.end()
    }
}
