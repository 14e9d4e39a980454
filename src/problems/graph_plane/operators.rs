//! Layout-specific variation operators
//!
//! Every operator returns a new layout; parents are never touched.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{GenomeError, OperatorResult};
use crate::operators::traits::{CrossoverStrategy, MutationStrategy};
use crate::problems::graph_plane::solution::{GraphPlaneSolution, VertexPos};

/// Guard against coincident vertices
const MIN_DISTANCE: f64 = 1e-9;

fn normal<R: Rng>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// Move vertex `index` by a normal step of `scale` times the canvas size
fn gaussian_step<R: Rng>(
    solution: &GraphPlaneSolution,
    positions: &mut [VertexPos],
    index: usize,
    scale: f64,
    rng: &mut R,
) {
    let problem = solution.problem();
    let p = positions[index];
    positions[index] = problem.clamp(VertexPos::new(
        p.x + normal(rng) * problem.width() * scale,
        p.y + normal(rng) * problem.height() * scale,
    ));
}

fn random_vertex<R: Rng>(solution: &GraphPlaneSolution, rng: &mut R) -> usize {
    rng.gen_range(0..solution.positions().len())
}

fn random_tangled<R: Rng>(solution: &GraphPlaneSolution, rng: &mut R) -> Option<usize> {
    solution.tangled_vertices().choose(rng).copied()
}

/// Spring length used by the tension operators
fn tension_spring_length(solution: &GraphPlaneSolution) -> f64 {
    let problem = solution.problem();
    let n = solution.positions().len() as f64;
    0.5 * (problem.width() * problem.height() / n).sqrt()
}

/// Repulsion on `u` from every other vertex, `k²/d²` times the offset
fn repulsion(positions: &[VertexPos], u: usize, k: f64) -> (f64, f64) {
    let pu = positions[u];
    positions
        .iter()
        .enumerate()
        .filter(|&(v, _)| v != u)
        .fold((0.0, 0.0), |(fx, fy), (_, pv)| {
            let (dx, dy) = (pu.x - pv.x, pu.y - pv.y);
            let d = dx.hypot(dy) + MIN_DISTANCE;
            let force = k * k / (d * d);
            (fx + dx * force, fy + dy * force)
        })
}

/// Apply a displacement to `u`, capped at `min(width, height) * epsilon`
fn displace(
    solution: &GraphPlaneSolution,
    u: usize,
    (dx, dy): (f64, f64),
    epsilon: f64,
) -> GraphPlaneSolution {
    let problem = solution.problem();
    let mut positions = solution.positions().to_vec();
    let magnitude = dx.hypot(dy);
    let cap = problem.width().min(problem.height()) * epsilon;
    let scale = if magnitude > 0.0 {
        magnitude.min(cap) / magnitude
    } else {
        0.0
    };
    let p = positions[u];
    positions[u] = problem.clamp(VertexPos::new(p.x + dx * scale, p.y + dy * scale));
    solution.with_positions(positions)
}

/// Relocate one random vertex uniformly on the canvas
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct UniformMutation;

impl MutationStrategy<GraphPlaneSolution> for UniformMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let mut positions = solution.positions().to_vec();
        let i = random_vertex(solution, rng);
        positions[i] = solution.random_position(rng);
        solution.with_positions(positions)
    }
}

/// Relocate one tangled vertex uniformly; untangled layouts are copied
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct FixedUniformMutation;

impl MutationStrategy<GraphPlaneSolution> for FixedUniformMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let Some(i) = random_tangled(solution, rng) else {
            return solution.clone();
        };
        let mut positions = solution.positions().to_vec();
        positions[i] = solution.random_position(rng);
        solution.with_positions(positions)
    }
}

/// Move one random vertex by a normal step of `k` times the canvas size
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NormMutation {
    pub k: f64,
}

impl NormMutation {
    pub fn new(k: f64) -> Self {
        Self { k }
    }
}

impl MutationStrategy<GraphPlaneSolution> for NormMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let mut positions = solution.positions().to_vec();
        let i = random_vertex(solution, rng);
        gaussian_step(solution, &mut positions, i, self.k, rng);
        solution.with_positions(positions)
    }
}

/// Move one tangled vertex by a normal step of a tenth of the canvas
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct FixedNormMutation;

impl MutationStrategy<GraphPlaneSolution> for FixedNormMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let Some(i) = random_tangled(solution, rng) else {
            return solution.clone();
        };
        let mut positions = solution.positions().to_vec();
        gaussian_step(solution, &mut positions, i, 0.1, rng);
        solution.with_positions(positions)
    }
}

/// Scale one coordinate of a tangled vertex by a factor in `[0.8, 1.2)`
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct FixedPercentageMutation;

impl MutationStrategy<GraphPlaneSolution> for FixedPercentageMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let Some(i) = random_tangled(solution, rng) else {
            return solution.clone();
        };
        let problem = solution.problem();
        let mut positions = solution.positions().to_vec();
        let factor = rng.gen_range(0.8..1.2);
        let p = positions[i];
        positions[i] = if rng.gen_bool(0.5) {
            problem.clamp(VertexPos::new(p.x * factor, p.y))
        } else {
            problem.clamp(VertexPos::new(p.x, p.y * factor))
        };
        solution.with_positions(positions)
    }
}

/// [`NormMutation`] that keeps the parent whenever the step adds crossings
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConservativeNormMutation {
    pub k: f64,
}

impl ConservativeNormMutation {
    pub fn new(k: f64) -> Self {
        Self { k }
    }
}

impl MutationStrategy<GraphPlaneSolution> for ConservativeNormMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let candidate = NormMutation::new(self.k).mutate(solution, rng);
        if candidate.crossings() > solution.crossings() {
            solution.clone()
        } else {
            candidate
        }
    }
}

/// Untangle with [`FixedNormMutation`], or polish a planar layout
///
/// A layout without crossings gets up to `max_steps` small single-vertex
/// moves; the first move that keeps the layout crossing-free is returned.
/// When none does, the parent comes back unchanged.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AdaptiveNormMutation {
    pub max_steps: usize,
}

impl AdaptiveNormMutation {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }
}

impl MutationStrategy<GraphPlaneSolution> for AdaptiveNormMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        if solution.crossings() > 0 {
            return FixedNormMutation.mutate(solution, rng);
        }

        for _ in 0..self.max_steps {
            let mut positions = solution.positions().to_vec();
            let i = random_vertex(solution, rng);
            gaussian_step(solution, &mut positions, i, 0.02, rng);
            let candidate = solution.with_positions(positions);
            if candidate.crossings() == 0 {
                return candidate;
            }
        }
        solution.clone()
    }
}

/// Reflect one random vertex across the vertical or horizontal center line
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct MirrorMutation;

impl MutationStrategy<GraphPlaneSolution> for MirrorMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let problem = solution.problem();
        let mut positions = solution.positions().to_vec();
        let i = random_vertex(solution, rng);
        let p = positions[i];
        positions[i] = if rng.gen_bool(0.5) {
            VertexPos::new(problem.width() - p.x, p.y)
        } else {
            VertexPos::new(p.x, problem.height() - p.y)
        };
        solution.with_positions(positions)
    }
}

/// One force-directed step for a single random vertex
///
/// Repulsion from every vertex plus spring attraction from its neighbors,
/// capped at `min(width, height) * epsilon`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TensionVectorMutation {
    pub epsilon: f64,
}

impl TensionVectorMutation {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl MutationStrategy<GraphPlaneSolution> for TensionVectorMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let positions = solution.positions();
        let u = random_vertex(solution, rng);
        let k = tension_spring_length(solution);

        let (mut fx, mut fy) = repulsion(positions, u, k);
        let pu = positions[u];
        for v in solution.problem().graph().neighbors(u) {
            let pv = positions[v];
            let (dx, dy) = (pu.x - pv.x, pu.y - pv.y);
            let d = dx.hypot(dy) + MIN_DISTANCE;
            let force = d * d / k;
            fx -= dx / d * force;
            fy -= dy / d * force;
        }

        displace(solution, u, (fx, fy), self.epsilon)
    }
}

/// Repulsion-only tension step for a tangled vertex
///
/// Untangled layouts are copied. One step is taken; it may leave crossings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FixedTensionVectorMutation {
    pub epsilon: f64,
}

impl FixedTensionVectorMutation {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl MutationStrategy<GraphPlaneSolution> for FixedTensionVectorMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let Some(u) = random_tangled(solution, rng) else {
            return solution.clone();
        };
        let force = repulsion(solution.positions(), u, tension_spring_length(solution));
        displace(solution, u, force, self.epsilon)
    }
}

/// Move every vertex with probability `w/(w+1) + 0.1`, where `w` counts the
/// crossings its edges take part in
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct NormWeightedMutation;

impl MutationStrategy<GraphPlaneSolution> for NormWeightedMutation {
    fn mutate<R: Rng>(&self, solution: &GraphPlaneSolution, rng: &mut R) -> GraphPlaneSolution {
        let weights = solution.crossing_weights();
        let mut positions = solution.positions().to_vec();
        for (i, &w) in weights.iter().enumerate() {
            let w = w as f64;
            let p = w / (w + 1.0) + 0.1;
            if rng.gen::<f64>() < p {
                gaussian_step(solution, &mut positions, i, 1.0, rng);
            }
        }
        solution.with_positions(positions)
    }
}

/// Swap each vertex between the parents with probability `swap_probability`
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UniformCrossover {
    pub swap_probability: f64,
}

impl UniformCrossover {
    pub fn new(swap_probability: f64) -> Self {
        Self { swap_probability }
    }
}

impl Default for UniformCrossover {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl CrossoverStrategy<GraphPlaneSolution> for UniformCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &GraphPlaneSolution,
        parent2: &GraphPlaneSolution,
        rng: &mut R,
    ) -> OperatorResult<Vec<GraphPlaneSolution>> {
        let (a, b) = (parent1.positions(), parent2.positions());
        if a.len() != b.len() {
            return OperatorResult::Failed(
                GenomeError::DimensionMismatch {
                    expected: a.len(),
                    actual: b.len(),
                }
                .into(),
            );
        }

        let mut child1 = Vec::with_capacity(a.len());
        let mut child2 = Vec::with_capacity(a.len());
        for (&pa, &pb) in a.iter().zip(b) {
            if rng.gen::<f64>() < self.swap_probability {
                child1.push(pb);
                child2.push(pa);
            } else {
                child1.push(pa);
                child2.push(pb);
            }
        }

        OperatorResult::Success(vec![
            parent1.with_positions(child1),
            parent1.with_positions(child2),
        ])
    }
}
