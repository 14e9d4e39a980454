//! Fruchterman–Reingold layout
//!
//! Vertices repel each other and edges pull their endpoints together like
//! springs. A linearly cooling temperature caps how far a vertex may move in
//! one iteration. The simulation does not improve monotonically, so the best
//! layout seen can be returned instead of the last one.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EvoResult, EvolutionError};
use crate::logging::{ProgressLogger, StepCounter, StepRecord};
use crate::problem::traits::{ReferenceSolution, Solution};
use crate::problems::graph_plane::solution::{GraphPlaneSolution, VertexPos};

/// Guard against coincident vertices
const MIN_DISTANCE: f64 = 1e-9;

/// Configuration for [`ForceDirectedLayout`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceDirectedConfig {
    /// Number of simulation steps
    pub iterations: usize,
    /// Maximum displacement in the first step, in canvas units
    pub initial_temperature: f64,
    /// Spring length as a fraction of `min(width, height) / sqrt(n)`
    pub spring_k_scale: f64,
    /// Return the best layout seen instead of the final one
    pub track_best: bool,
}

impl Default for ForceDirectedConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            initial_temperature: 0.1,
            spring_k_scale: 0.7,
            track_best: true,
        }
    }
}

impl ForceDirectedConfig {
    /// Set the number of simulation steps
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the starting temperature
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    /// Set the spring length scale
    pub fn with_spring_k_scale(mut self, scale: f64) -> Self {
        self.spring_k_scale = scale;
        self
    }

    /// Return the best layout seen instead of the final one
    pub fn with_track_best(mut self, track_best: bool) -> Self {
        self.track_best = track_best;
        self
    }

    /// Check the parameters
    pub fn validate(&self) -> EvoResult<()> {
        if !(self.initial_temperature >= 0.0 && self.initial_temperature.is_finite()) {
            return Err(EvolutionError::Configuration(format!(
                "initial temperature must be finite and non-negative, got {}",
                self.initial_temperature
            )));
        }
        if !(self.spring_k_scale > 0.0 && self.spring_k_scale.is_finite()) {
            return Err(EvolutionError::Configuration(format!(
                "spring constant scale must be positive, got {}",
                self.spring_k_scale
            )));
        }
        Ok(())
    }
}

/// Force-directed layout solver
pub struct ForceDirectedLayout<L> {
    config: ForceDirectedConfig,
    logger: L,
}

impl<L: ProgressLogger> ForceDirectedLayout<L> {
    /// Create a solver; fails on an invalid configuration
    pub fn new(config: ForceDirectedConfig, logger: L) -> EvoResult<Self> {
        config.validate()?;
        Ok(Self { config, logger })
    }

    /// The configuration
    pub fn config(&self) -> &ForceDirectedConfig {
        &self.config
    }

    /// Consume the solver, returning its logger
    pub fn into_logger(self) -> L {
        self.logger
    }

    /// Ideal edge length for a layout
    pub fn spring_length(&self, layout: &GraphPlaneSolution) -> f64 {
        let problem = layout.problem();
        let n = layout.positions().len() as f64;
        self.config.spring_k_scale * problem.width().min(problem.height()) / n.sqrt()
    }

    /// Run the simulation starting from `initial`
    ///
    /// Every iteration logs an `iteration` record; one more record carries the
    /// returned layout. Zero iterations return `initial` unchanged.
    pub fn solve(
        &mut self,
        initial: &GraphPlaneSolution,
    ) -> EvoResult<ReferenceSolution<GraphPlaneSolution>> {
        let start = Instant::now();
        let iterations = self.config.iterations;

        if iterations == 0 {
            return Ok(ReferenceSolution::new(initial.clone(), start.elapsed()));
        }

        let problem = initial.problem();
        let adjacency = problem.graph().adjacency();
        let k = self.spring_length(initial);
        let cooling = self.config.initial_temperature / iterations as f64;
        let mut temperature = self.config.initial_temperature;

        info!(
            vertices = initial.positions().len(),
            edges = problem.graph().num_edges(),
            iterations,
            spring_length = k,
            "force-directed layout started"
        );

        let mut current = initial.clone();
        let mut best = initial.clone();

        for iteration in 0..iterations {
            let positions = current.positions();
            let displacement = forces(positions, &adjacency, k);

            let next: Vec<VertexPos> = positions
                .iter()
                .zip(&displacement)
                .map(|(p, &(dx, dy))| {
                    let magnitude = dx.hypot(dy);
                    if magnitude <= 0.0 {
                        return *p;
                    }
                    let scale = magnitude.min(temperature.max(0.0)) / magnitude;
                    problem.clamp(VertexPos::new(p.x + dx * scale, p.y + dy * scale))
                })
                .collect();
            temperature -= cooling;

            current = current.with_positions(next);
            if current.fitness() < best.fitness() {
                debug!(iteration, fitness = current.fitness(), "new best layout");
                best = current.clone();
            }

            let record =
                StepRecord::new(start.elapsed(), StepCounter::Iteration(iteration), &current);
            self.logger.log_step(&record)?;
        }

        let result = if self.config.track_best { best } else { current };
        let record = StepRecord::new(start.elapsed(), StepCounter::Iteration(iterations), &result);
        self.logger.log_step(&record)?;

        info!(
            crossings = result.crossings(),
            fitness = result.fitness(),
            "force-directed layout finished"
        );
        Ok(ReferenceSolution::new(result, start.elapsed()))
    }
}

/// Net displacement of every vertex
///
/// Repulsion `k²/d` between every pair, attraction `d²/k` along every edge,
/// both directed along the connecting line.
fn forces(positions: &[VertexPos], adjacency: &[Vec<usize>], k: f64) -> Vec<(f64, f64)> {
    let n = positions.len();
    let mut displacement = vec![(0.0, 0.0); n];

    for i in 0..n {
        for j in i + 1..n {
            let (dx, dy) = (positions[i].x - positions[j].x, positions[i].y - positions[j].y);
            let d = dx.hypot(dy) + MIN_DISTANCE;
            let force = k * k / d;
            let (ux, uy) = (dx / d * force, dy / d * force);
            displacement[i].0 += ux;
            displacement[i].1 += uy;
            displacement[j].0 -= ux;
            displacement[j].1 -= uy;
        }
    }

    for (u, neighbors) in adjacency.iter().enumerate() {
        // each edge once, from its lower endpoint
        for &v in neighbors.iter().filter(|&&v| v > u) {
            let (dx, dy) = (positions[u].x - positions[v].x, positions[u].y - positions[v].y);
            let d = dx.hypot(dy) + MIN_DISTANCE;
            let force = d * d / k;
            let (ux, uy) = (dx / d * force, dy / d * force);
            displacement[u].0 -= ux;
            displacement[u].1 -= uy;
            displacement[v].0 += ux;
            displacement[v].1 += uy;
        }
    }

    displacement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{MemoryLogger, NullLogger};
    use crate::problem::traits::Problem;
    use crate::problems::graph_plane::graph::{Edge, Graph};
    use crate::problems::graph_plane::solution::GraphPlaneProblem;
    use rand::SeedableRng;

    fn pair() -> GraphPlaneSolution {
        let graph = Graph::new(2, vec![Edge::new(0, 1)]).unwrap();
        let problem = GraphPlaneProblem::new(graph, 1.0, 1.0).unwrap();
        problem
            .solution(vec![VertexPos::new(0.4, 0.5), VertexPos::new(0.6, 0.5)])
            .unwrap()
    }

    #[test]
    fn test_zero_iterations_returns_input() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let problem = GraphPlaneProblem::random(8, 0.4, 1.0, 1.0, &mut rng).unwrap();
        let initial = problem.random_solution(&mut rng);

        let config = ForceDirectedConfig::default().with_iterations(0);
        let mut solver = ForceDirectedLayout::new(config, MemoryLogger::new()).unwrap();
        let result = solver.solve(&initial).unwrap();

        assert_eq!(result.solution.positions(), initial.positions());
        assert!(solver.into_logger().records().is_empty());
    }

    #[test]
    fn test_two_vertices_settle_at_spring_length() {
        let initial = pair();
        let config = ForceDirectedConfig::default()
            .with_iterations(300)
            .with_initial_temperature(0.1)
            .with_track_best(false);
        let mut solver = ForceDirectedLayout::new(config, NullLogger).unwrap();
        let k = solver.spring_length(&initial);

        let result = solver.solve(&initial).unwrap().solution;
        let p = result.positions();
        assert!((p[0].distance(&p[1]) - k).abs() < 0.01);
        assert_eq!(result.crossings(), 0);
    }

    #[test]
    fn test_logs_every_iteration_plus_result() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let problem = GraphPlaneProblem::random(6, 0.5, 1.0, 1.0, &mut rng).unwrap();
        let initial = problem.random_solution(&mut rng);

        let config = ForceDirectedConfig::default().with_iterations(25);
        let mut solver = ForceDirectedLayout::new(config, MemoryLogger::new()).unwrap();
        let result = solver.solve(&initial).unwrap();
        let records = solver.into_logger().into_records();

        assert_eq!(records.len(), 26);
        assert_eq!(records[0]["iteration"], 0);
        assert_eq!(records[25]["iteration"], 25);
        assert_eq!(records[25]["solution"]["fitness"], result.solution.fitness());
    }

    #[test]
    fn test_track_best_never_worse_than_input() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(13);
        let problem = GraphPlaneProblem::random(15, 0.3, 1.0, 1.0, &mut rng).unwrap();
        let initial = problem.random_solution(&mut rng);

        let config = ForceDirectedConfig::default().with_iterations(100);
        let mut solver = ForceDirectedLayout::new(config, NullLogger).unwrap();
        let result = solver.solve(&initial).unwrap().solution;
        assert!(result.fitness() <= initial.fitness());
        assert!(result
            .positions()
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ForceDirectedConfig::default().with_spring_k_scale(0.0);
        assert!(ForceDirectedLayout::new(config, NullLogger).is_err());
        let config = ForceDirectedConfig::default().with_initial_temperature(-1.0);
        assert!(config.validate().is_err());
    }
}
