//! Multi-dimensional bounded knapsack
//!
//! A genome is an amount per item. Fitness is the negated packed value, divided
//! by 10 once for every violated resource constraint.

use std::sync::Arc;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{EvoResult, EvolutionError, GenomeError, OperatorResult};
use crate::problem::cache::ObjectiveCache;
use crate::problem::traits::{Evolvable, Problem, Solution};

/// Penalty divisor applied once per violated constraint
pub const VIOLATION_PENALTY: f64 = 10.0;

/// An item that can be packed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Value of one unit
    pub value: u64,
    /// Resources one unit consumes, one entry per constraint
    pub resources: Vec<u64>,
}

impl Item {
    /// Create an item
    pub fn new(value: u64, resources: Vec<u64>) -> Self {
        Self { value, resources }
    }
}

/// Parameters for generating a random knapsack instance
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KnapsackParams {
    /// Number of items
    pub items: usize,
    /// Exclusive upper bound on item values
    pub max_value: u64,
    /// Exclusive upper bound on per-resource consumption (at least 1 is used)
    pub max_resource: u64,
    /// Exclusive upper bound on amounts in random solutions
    pub max_amount: u32,
    /// Capacity per resource dimension
    pub constraints: Vec<u64>,
}

impl Default for KnapsackParams {
    fn default() -> Self {
        Self {
            items: 20,
            max_value: 100,
            max_resource: 50,
            max_amount: 2,
            constraints: vec![250],
        }
    }
}

/// Knapsack problem instance
#[derive(Clone, Debug, Serialize)]
pub struct KnapsackProblem {
    name: String,
    items: Arc<[Item]>,
    constraints: Arc<[u64]>,
    max_amount: u32,
}

impl KnapsackProblem {
    /// Create an instance from explicit items and capacities
    ///
    /// Every item must have exactly one resource entry per constraint.
    pub fn new(items: Vec<Item>, constraints: Vec<u64>) -> EvoResult<Self> {
        if items.is_empty() {
            return Err(EvolutionError::Configuration(
                "knapsack needs at least one item".to_string(),
            ));
        }
        if constraints.is_empty() {
            return Err(EvolutionError::Configuration(
                "knapsack needs at least one constraint".to_string(),
            ));
        }
        if let Some(item) = items.iter().find(|i| i.resources.len() != constraints.len()) {
            return Err(GenomeError::DimensionMismatch {
                expected: constraints.len(),
                actual: item.resources.len(),
            }
            .into());
        }

        Ok(Self {
            name: "Knapsack".to_string(),
            items: items.into(),
            constraints: constraints.into(),
            max_amount: 2,
        })
    }

    /// Generate a random instance
    pub fn random<R: Rng>(params: &KnapsackParams, rng: &mut R) -> EvoResult<Self> {
        if params.max_value == 0 || params.max_resource < 2 || params.max_amount == 0 {
            return Err(EvolutionError::Configuration(
                "knapsack bounds must allow at least one value".to_string(),
            ));
        }
        let items = (0..params.items)
            .map(|_| {
                let resources = params
                    .constraints
                    .iter()
                    .map(|_| rng.gen_range(1..params.max_resource))
                    .collect();
                Item::new(rng.gen_range(0..params.max_value), resources)
            })
            .collect();
        Ok(Self::new(items, params.constraints.clone())?.with_max_amount(params.max_amount))
    }

    /// Exclusive upper bound on amounts in random solutions (default 2: 0 or 1 of each)
    pub fn with_max_amount(mut self, max_amount: u32) -> Self {
        self.max_amount = max_amount.max(1);
        self
    }

    /// Set the instance name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Items of this instance
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Capacity per resource dimension
    pub fn constraints(&self) -> &[u64] {
        &self.constraints
    }

    /// Build a solution from explicit amounts
    pub fn solution(&self, amounts: Vec<u32>) -> EvoResult<KnapsackSolution> {
        if amounts.len() != self.items.len() {
            return Err(GenomeError::DimensionMismatch {
                expected: self.items.len(),
                actual: amounts.len(),
            }
            .into());
        }
        Ok(KnapsackSolution::new(self.clone(), amounts))
    }
}

impl Problem for KnapsackProblem {
    type Solution = KnapsackSolution;

    fn name(&self) -> &str {
        &self.name
    }

    fn random_solution<R: Rng>(&self, rng: &mut R) -> KnapsackSolution {
        let amounts = (0..self.items.len())
            .map(|_| rng.gen_range(0..self.max_amount))
            .collect();
        KnapsackSolution::new(self.clone(), amounts)
    }
}

/// Amounts packed per item
#[derive(Clone, Debug)]
pub struct KnapsackSolution {
    problem: KnapsackProblem,
    amounts: Vec<u32>,
    cache: ObjectiveCache,
}

impl KnapsackSolution {
    fn new(problem: KnapsackProblem, amounts: Vec<u32>) -> Self {
        Self {
            problem,
            amounts,
            cache: ObjectiveCache::new(),
        }
    }

    /// Amount of each item
    pub fn amounts(&self) -> &[u32] {
        &self.amounts
    }

    /// Total packed value
    pub fn value(&self) -> u64 {
        self.problem
            .items
            .iter()
            .zip(&self.amounts)
            .map(|(item, &n)| item.value * u64::from(n))
            .sum()
    }

    /// Resource usage per dimension
    pub fn usage(&self) -> Vec<u64> {
        let mut usage = vec![0u64; self.problem.constraints.len()];
        for (item, &n) in self.problem.items.iter().zip(&self.amounts) {
            for (used, &r) in usage.iter_mut().zip(&item.resources) {
                *used += r * u64::from(n);
            }
        }
        usage
    }

    /// Number of violated constraints
    pub fn violations(&self) -> usize {
        self.usage()
            .iter()
            .zip(self.problem.constraints.iter())
            .filter(|(used, cap)| used > cap)
            .count()
    }

    /// Whether every constraint holds
    pub fn is_feasible(&self) -> bool {
        self.violations() == 0
    }

    fn compute_objectives(&self) -> Vec<f64> {
        let exponent = i32::try_from(self.violations()).unwrap_or(i32::MAX);
        let penalized = self.value() as f64 / VIOLATION_PENALTY.powi(exponent);
        vec![-penalized]
    }
}

impl Solution for KnapsackSolution {
    fn objectives(&self) -> &[f64] {
        self.cache.get_or_compute(|| self.compute_objectives())
    }

    fn fitness(&self) -> f64 {
        self.objectives()[0]
    }
}

impl Evolvable for KnapsackSolution {
    /// Uniform crossover: every gene comes from either parent with equal odds
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> OperatorResult<Vec<Self>> {
        if self.amounts.len() != other.amounts.len() {
            return OperatorResult::Failed(
                GenomeError::DimensionMismatch {
                    expected: self.amounts.len(),
                    actual: other.amounts.len(),
                }
                .into(),
            );
        }

        let mut child1 = Vec::with_capacity(self.amounts.len());
        let mut child2 = Vec::with_capacity(self.amounts.len());
        for (&a, &b) in self.amounts.iter().zip(&other.amounts) {
            if rng.gen_bool(0.5) {
                child1.push(a);
                child2.push(b);
            } else {
                child1.push(b);
                child2.push(a);
            }
        }

        OperatorResult::Success(vec![
            Self::new(self.problem.clone(), child1),
            Self::new(self.problem.clone(), child2),
        ])
    }

    /// Each amount moves with probability `rate` by a normal step scaled by
    /// `10 * rate * max(amount, 1)`, never below zero
    fn mutate<R: Rng>(&self, rate: f64, rng: &mut R) -> Self {
        let amounts = self
            .amounts
            .iter()
            .map(|&n| {
                if rng.gen::<f64>() >= rate {
                    return n;
                }
                let z: f64 = rng.sample(StandardNormal);
                let delta = (f64::from(n.max(1)) * 10.0 * rate * z).round();
                (f64::from(n) + delta).clamp(0.0, f64::from(u32::MAX)) as u32
            })
            .collect();
        Self::new(self.problem.clone(), amounts)
    }
}

impl Serialize for KnapsackSolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("KnapsackSolution", 4)?;
        state.serialize_field("amounts", &self.amounts)?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("objectives", self.objectives())?;
        state.serialize_field("fitness", &self.fitness())?;
        state.end()
    }
}
