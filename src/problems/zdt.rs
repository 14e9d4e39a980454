//! ZDT two-objective test suite
//!
//! Reference: Zitzler, E., Deb, K., & Thiele, L. (2000).
//! Comparison of Multiobjective Evolutionary Algorithms: Empirical Results.
//! Evolutionary Computation, 8(2).

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{EvoResult, EvolutionError, GenomeError, OperatorResult};
use crate::problem::cache::ObjectiveCache;
use crate::problem::traits::{Evolvable, Problem, Solution};

/// Mutation step as a fraction of a variable's range
const MUTATION_SIGMA: f64 = 0.1;

/// Which ZDT function
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZdtVariant {
    /// Convex front
    Zdt1,
    /// Non-convex front
    Zdt2,
    /// Disconnected front
    Zdt3,
    /// Many local fronts (x1.. in [-5, 5])
    Zdt4,
    /// Non-uniform density along the front
    Zdt6,
}

impl ZdtVariant {
    /// Bounds of variable `index`
    pub fn bounds(&self, index: usize) -> (f64, f64) {
        match self {
            Self::Zdt4 if index > 0 => (-5.0, 5.0),
            _ => (0.0, 1.0),
        }
    }

    /// Objective vector `[f1, f2]` for decision vector `x`; `x` has at least two variables
    pub(crate) fn evaluate(&self, x: &[f64]) -> [f64; 2] {
        let rest = &x[1..];
        let m = rest.len() as f64;
        let sum: f64 = rest.iter().sum();

        match self {
            Self::Zdt1 => {
                let f1 = x[0];
                let g = 1.0 + 9.0 * sum / m;
                [f1, g * (1.0 - (f1 / g).sqrt())]
            }
            Self::Zdt2 => {
                let f1 = x[0];
                let g = 1.0 + 9.0 * sum / m;
                [f1, g * (1.0 - (f1 / g).powi(2))]
            }
            Self::Zdt3 => {
                let f1 = x[0];
                let g = 1.0 + 9.0 * sum / m;
                let h = 1.0 - (f1 / g).sqrt() - (f1 / g) * (10.0 * PI * f1).sin();
                [f1, g * h]
            }
            Self::Zdt4 => {
                let f1 = x[0];
                let g = 1.0
                    + 10.0 * m
                    + rest
                        .iter()
                        .map(|xi| xi * xi - 10.0 * (4.0 * PI * xi).cos())
                        .sum::<f64>();
                [f1, g * (1.0 - (f1 / g).sqrt())]
            }
            Self::Zdt6 => {
                let f1 = 1.0 - (-4.0 * x[0]).exp() * (6.0 * PI * x[0]).sin().powi(6);
                let g = 1.0 + 9.0 * (sum / m).powf(0.25);
                [f1, g * (1.0 - (f1 / g).powi(2))]
            }
        }
    }
}

impl fmt::Display for ZdtVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Zdt1 => "ZDT1",
            Self::Zdt2 => "ZDT2",
            Self::Zdt3 => "ZDT3",
            Self::Zdt4 => "ZDT4",
            Self::Zdt6 => "ZDT6",
        };
        f.write_str(name)
    }
}

/// A ZDT instance of a given dimensionality
#[derive(Clone, Debug, Serialize)]
pub struct ZdtProblem {
    name: Arc<str>,
    variant: ZdtVariant,
    dimensions: usize,
}

impl ZdtProblem {
    /// Create an instance; ZDT functions need at least 2 variables
    pub fn new(variant: ZdtVariant, dimensions: usize) -> EvoResult<Self> {
        if dimensions < 2 {
            return Err(EvolutionError::Configuration(format!(
                "{variant} requires at least 2 dimensions, got {dimensions}"
            )));
        }
        Ok(Self {
            name: variant.to_string().into(),
            variant,
            dimensions,
        })
    }

    /// The ZDT function
    pub fn variant(&self) -> ZdtVariant {
        self.variant
    }

    /// Number of decision variables
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Build a solution from an explicit decision vector (clamped to bounds)
    pub fn solution(&self, x: Vec<f64>) -> EvoResult<ZdtSolution> {
        if x.len() != self.dimensions {
            return Err(GenomeError::DimensionMismatch {
                expected: self.dimensions,
                actual: x.len(),
            }
            .into());
        }
        let x = x
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let (lo, hi) = self.variant.bounds(i);
                v.clamp(lo, hi)
            })
            .collect();
        Ok(ZdtSolution::new(self.clone(), x))
    }
}

impl Problem for ZdtProblem {
    type Solution = ZdtSolution;

    fn name(&self) -> &str {
        &self.name
    }

    fn random_solution<R: Rng>(&self, rng: &mut R) -> ZdtSolution {
        let x = (0..self.dimensions)
            .map(|i| {
                let (lo, hi) = self.variant.bounds(i);
                rng.gen_range(lo..=hi)
            })
            .collect();
        ZdtSolution::new(self.clone(), x)
    }
}

/// A decision vector of a ZDT problem
#[derive(Clone, Debug)]
pub struct ZdtSolution {
    problem: ZdtProblem,
    x: Vec<f64>,
    cache: ObjectiveCache,
}

impl ZdtSolution {
    fn new(problem: ZdtProblem, x: Vec<f64>) -> Self {
        Self {
            problem,
            x,
            cache: ObjectiveCache::new(),
        }
    }

    /// Decision variables
    pub fn x(&self) -> &[f64] {
        &self.x
    }
}

impl Solution for ZdtSolution {
    fn objectives(&self) -> &[f64] {
        self.cache
            .get_or_compute(|| self.problem.variant.evaluate(&self.x).to_vec())
    }

    /// Sum of both objectives
    fn fitness(&self) -> f64 {
        self.objectives().iter().sum()
    }
}

impl Evolvable for ZdtSolution {
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> OperatorResult<Vec<Self>> {
        if self.x.len() != other.x.len() {
            return OperatorResult::Failed(
                GenomeError::DimensionMismatch {
                    expected: self.x.len(),
                    actual: other.x.len(),
                }
                .into(),
            );
        }

        let mut child1 = self.x.clone();
        let mut child2 = other.x.clone();
        for i in 0..child1.len() {
            if rng.gen_bool(0.5) {
                std::mem::swap(&mut child1[i], &mut child2[i]);
            }
        }

        OperatorResult::Success(vec![
            Self::new(self.problem.clone(), child1),
            Self::new(self.problem.clone(), child2),
        ])
    }

    /// Gaussian perturbation of each variable with probability `rate`,
    /// sigma a tenth of the variable's range, clamped to bounds
    fn mutate<R: Rng>(&self, rate: f64, rng: &mut R) -> Self {
        let variant = self.problem.variant;
        let x = self
            .x
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if rng.gen::<f64>() >= rate {
                    return v;
                }
                let (lo, hi) = variant.bounds(i);
                let z: f64 = rng.sample(StandardNormal);
                (v + z * MUTATION_SIGMA * (hi - lo)).clamp(lo, hi)
            })
            .collect();
        Self::new(self.problem.clone(), x)
    }
}

impl Serialize for ZdtSolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ZdtSolution", 3)?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("objectives", self.objectives())?;
        state.serialize_field("fitness", &self.fitness())?;
        state.end()
    }
}
