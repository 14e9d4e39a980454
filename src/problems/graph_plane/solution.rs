//! Graph layouts on a rectangular canvas

use std::f64::consts::TAU;
use std::sync::Arc;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{EvoResult, EvolutionError, GenomeError, OperatorResult};
use crate::problem::cache::ObjectiveCache;
use crate::problem::traits::{Evolvable, Problem, Solution};
use crate::problems::graph_plane::graph::{Edge, Graph};

/// Weight of the aesthetic objectives in the scalar fitness
pub const AESTHETIC_WEIGHT: f64 = 0.1;

/// Step of the embedded mutation as a fraction of the canvas
const EMBEDDED_SIGMA: f64 = 0.05;

/// Position of one vertex
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexPos {
    pub x: f64,
    pub y: f64,
}

impl VertexPos {
    /// Create a position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance(&self, other: &VertexPos) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Counter-clockwise orientation test
fn ccw(a: VertexPos, b: VertexPos, c: VertexPos) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Whether segment `ab` properly crosses segment `cd`
pub fn segments_intersect(a: VertexPos, b: VertexPos, c: VertexPos, d: VertexPos) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// Lay out a fixed graph on a `width × height` canvas
#[derive(Clone, Debug, Serialize)]
pub struct GraphPlaneProblem {
    name: String,
    width: f64,
    height: f64,
    graph: Arc<Graph>,
}

impl GraphPlaneProblem {
    /// Create a problem for `graph`
    pub fn new(graph: Graph, width: f64, height: f64) -> EvoResult<Self> {
        if !(width > 0.0 && width.is_finite() && height > 0.0 && height.is_finite()) {
            return Err(EvolutionError::Configuration(format!(
                "canvas must have positive finite size, got {width}x{height}"
            )));
        }
        Ok(Self {
            name: "GraphPlane".to_string(),
            width,
            height,
            graph: Arc::new(graph),
        })
    }

    /// Problem over a random graph
    pub fn random<R: Rng>(
        num_vertices: usize,
        edge_fill: f64,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> EvoResult<Self> {
        Self::new(Graph::random(num_vertices, edge_fill, rng)?, width, height)
    }

    /// Problem over a random planar graph, so a crossing-free layout exists
    pub fn random_planar<R: Rng>(
        num_vertices: usize,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> EvoResult<Self> {
        Self::new(Graph::random_planar(num_vertices, rng)?, width, height)
    }

    /// The graph to lay out
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Canvas width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Clamp a position onto the canvas
    pub fn clamp(&self, pos: VertexPos) -> VertexPos {
        VertexPos::new(pos.x.clamp(0.0, self.width), pos.y.clamp(0.0, self.height))
    }

    /// Build a layout from explicit positions (clamped onto the canvas)
    pub fn solution(&self, positions: Vec<VertexPos>) -> EvoResult<GraphPlaneSolution> {
        if positions.len() != self.graph.num_vertices() {
            return Err(GenomeError::DimensionMismatch {
                expected: self.graph.num_vertices(),
                actual: positions.len(),
            }
            .into());
        }
        let positions = positions.into_iter().map(|p| self.clamp(p)).collect();
        Ok(GraphPlaneSolution::new(self.clone(), positions))
    }

    fn random_position<R: Rng>(&self, rng: &mut R) -> VertexPos {
        VertexPos::new(rng.gen::<f64>() * self.width, rng.gen::<f64>() * self.height)
    }
}

impl Problem for GraphPlaneProblem {
    type Solution = GraphPlaneSolution;

    fn name(&self) -> &str {
        &self.name
    }

    fn random_solution<R: Rng>(&self, rng: &mut R) -> GraphPlaneSolution {
        let positions = (0..self.graph.num_vertices())
            .map(|_| self.random_position(rng))
            .collect();
        GraphPlaneSolution::new(self.clone(), positions)
    }
}

/// One position per vertex
///
/// Objectives are `[crossings, edge length dispersion, angle penalty]`.
#[derive(Clone, Debug)]
pub struct GraphPlaneSolution {
    problem: GraphPlaneProblem,
    positions: Vec<VertexPos>,
    cache: ObjectiveCache,
}

impl GraphPlaneSolution {
    pub(crate) fn new(problem: GraphPlaneProblem, positions: Vec<VertexPos>) -> Self {
        Self {
            problem,
            positions,
            cache: ObjectiveCache::new(),
        }
    }

    /// A new layout of the same problem; positions must already be on the canvas
    pub(crate) fn with_positions(&self, positions: Vec<VertexPos>) -> Self {
        Self::new(self.problem.clone(), positions)
    }

    /// A uniformly random position on the canvas
    pub(crate) fn random_position<R: Rng>(&self, rng: &mut R) -> VertexPos {
        self.problem.random_position(rng)
    }

    /// The problem this layout belongs to
    pub fn problem(&self) -> &GraphPlaneProblem {
        &self.problem
    }

    /// Vertex positions
    pub fn positions(&self) -> &[VertexPos] {
        &self.positions
    }

    fn segment(&self, edge: &Edge) -> (VertexPos, VertexPos) {
        (self.positions[edge.from], self.positions[edge.to])
    }

    /// Every pair of crossing edges
    pub fn crossing_pairs(&self) -> Vec<(Edge, Edge)> {
        let edges = self.problem.graph.edges();
        let mut pairs = Vec::new();
        for (i, e1) in edges.iter().enumerate() {
            let (a, b) = self.segment(e1);
            for e2 in &edges[i + 1..] {
                if e1.shares_vertex(e2) {
                    continue;
                }
                let (c, d) = self.segment(e2);
                if segments_intersect(a, b, c, d) {
                    pairs.push((*e1, *e2));
                }
            }
        }
        pairs
    }

    /// Number of edge crossings
    pub fn crossings(&self) -> usize {
        self.objectives()[0] as usize
    }

    /// Crossings each vertex's incident edges take part in
    pub fn crossing_weights(&self) -> Vec<usize> {
        let mut weights = vec![0; self.positions.len()];
        for (e1, e2) in self.crossing_pairs() {
            for v in [e1.from, e1.to, e2.from, e2.to] {
                weights[v] += 1;
            }
        }
        weights
    }

    /// Vertices incident to at least one crossing edge, ascending
    pub fn tangled_vertices(&self) -> Vec<usize> {
        self.crossing_weights()
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 0)
            .map(|(v, _)| v)
            .collect()
    }

    /// Coefficient of variation of the edge lengths (0 when undefined)
    pub fn edge_dispersion(&self) -> f64 {
        let lengths: Vec<f64> = self
            .problem
            .graph
            .edges()
            .iter()
            .map(|e| {
                let (a, b) = self.segment(e);
                a.distance(&b)
            })
            .collect();
        if lengths.is_empty() {
            return 0.0;
        }
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        if mean <= f64::EPSILON {
            return 0.0;
        }
        let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt() / mean
    }

    /// Mean over vertices of degree >= 2 of `1 - smallest gap / (2π / degree)`
    ///
    /// 0 means incident edges are evenly spread around every vertex.
    pub fn angle_penalty(&self) -> f64 {
        let adjacency = self.problem.graph.adjacency();
        let mut total = 0.0;
        let mut counted = 0usize;

        for (v, neighbors) in adjacency.iter().enumerate() {
            if neighbors.len() < 2 {
                continue;
            }
            let origin = self.positions[v];
            let mut angles: Vec<f64> = neighbors
                .iter()
                .map(|&u| {
                    let p = self.positions[u];
                    (p.y - origin.y).atan2(p.x - origin.x)
                })
                .collect();
            angles.sort_by(f64::total_cmp);

            let wrap = angles[0] + TAU - angles[angles.len() - 1];
            let min_gap = angles
                .windows(2)
                .map(|w| w[1] - w[0])
                .fold(wrap, f64::min);
            let ideal = TAU / neighbors.len() as f64;

            total += (1.0 - min_gap / ideal).clamp(0.0, 1.0);
            counted += 1;
        }

        if counted == 0 {
            0.0
        } else {
            total / counted as f64
        }
    }

    fn compute_objectives(&self) -> Vec<f64> {
        vec![
            self.crossing_pairs().len() as f64,
            self.edge_dispersion(),
            self.angle_penalty(),
        ]
    }
}

impl Solution for GraphPlaneSolution {
    fn objectives(&self) -> &[f64] {
        self.cache.get_or_compute(|| self.compute_objectives())
    }

    /// Crossings dominate; dispersion and angles break ties
    fn fitness(&self) -> f64 {
        let o = self.objectives();
        o[0] + AESTHETIC_WEIGHT * (o[1] + o[2])
    }
}

impl Evolvable for GraphPlaneSolution {
    /// Each vertex takes its position from either parent with equal odds
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> OperatorResult<Vec<Self>> {
        if self.positions.len() != other.positions.len() {
            return OperatorResult::Failed(
                GenomeError::DimensionMismatch {
                    expected: self.positions.len(),
                    actual: other.positions.len(),
                }
                .into(),
            );
        }

        let (child1, child2): (Vec<VertexPos>, Vec<VertexPos>) = self
            .positions
            .iter()
            .zip(&other.positions)
            .map(|(&a, &b)| if rng.gen_bool(0.5) { (a, b) } else { (b, a) })
            .unzip();

        OperatorResult::Success(vec![self.with_positions(child1), self.with_positions(child2)])
    }

    /// Each vertex moves with probability `rate` by a normal step of 5% of the canvas
    fn mutate<R: Rng>(&self, rate: f64, rng: &mut R) -> Self {
        let (w, h) = (self.problem.width, self.problem.height);
        let positions = self
            .positions
            .iter()
            .map(|&p| {
                if rng.gen::<f64>() >= rate {
                    return p;
                }
                let dx: f64 = rng.sample(StandardNormal);
                let dy: f64 = rng.sample(StandardNormal);
                self.problem.clamp(VertexPos::new(
                    p.x + dx * EMBEDDED_SIGMA * w,
                    p.y + dy * EMBEDDED_SIGMA * h,
                ))
            })
            .collect();
        self.with_positions(positions)
    }
}

impl Serialize for GraphPlaneSolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GraphPlaneSolution", 3)?;
        state.serialize_field("vertices", &self.positions)?;
        state.serialize_field("objectives", self.objectives())?;
        state.serialize_field("fitness", &self.fitness())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    /// K4 on a unit canvas
    fn k4() -> GraphPlaneProblem {
        let graph = Graph::new(
            4,
            vec![
                Edge::new(0, 1),
                Edge::new(0, 2),
                Edge::new(0, 3),
                Edge::new(1, 2),
                Edge::new(1, 3),
                Edge::new(2, 3),
            ],
        )
        .unwrap();
        GraphPlaneProblem::new(graph, 1.0, 1.0).unwrap()
    }

    fn pos(points: &[(f64, f64)]) -> Vec<VertexPos> {
        points.iter().map(|&(x, y)| VertexPos::new(x, y)).collect()
    }

    #[test]
    fn test_random_planar_problem() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(50);
        let problem = GraphPlaneProblem::random_planar(50, 2.0, 1.0, &mut rng).unwrap();
        assert_eq!(problem.graph().num_vertices(), 50);
        assert!(problem.graph().num_edges() <= 3 * 50 - 6);

        let layout = problem.random_solution(&mut rng);
        assert!(layout.positions().iter().all(|p| p.x <= 2.0 && p.y <= 1.0));
        assert!(GraphPlaneProblem::random_planar(2, 1.0, 1.0, &mut rng).is_err());
    }

    #[test]
    fn test_segments_intersect() {
        let a = VertexPos::new(0.0, 0.0);
        let b = VertexPos::new(1.0, 1.0);
        let c = VertexPos::new(0.0, 1.0);
        let d = VertexPos::new(1.0, 0.0);
        assert!(segments_intersect(a, b, c, d));
        assert!(!segments_intersect(a, c, b, d));
    }

    #[test]
    fn test_convex_k4_has_one_crossing() {
        let problem = k4();
        let s = problem
            .solution(pos(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]))
            .unwrap();
        assert_eq!(s.crossings(), 1);
        assert_eq!(s.tangled_vertices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_planar_k4_has_no_crossing() {
        let problem = k4();
        let s = problem
            .solution(pos(&[(0.5, 0.4), (0.0, 0.0), (1.0, 0.0), (0.5, 1.0)]))
            .unwrap();
        assert_eq!(s.crossings(), 0);
        assert!(s.tangled_vertices().is_empty());
        assert!(s.fitness() < 1.0);
    }

    #[test]
    fn test_uniform_edges_have_no_dispersion() {
        let graph = Graph::new(3, vec![Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
        let problem = GraphPlaneProblem::new(graph, 2.0, 2.0).unwrap();
        let s = problem
            .solution(pos(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]))
            .unwrap();
        assert_relative_eq!(s.edge_dispersion(), 0.0);
        // straight line: the two edges are opposite, ideal spread
        assert_relative_eq!(s.angle_penalty(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collapsed_edges_penalized() {
        let graph = Graph::new(3, vec![Edge::new(0, 1), Edge::new(0, 2)]).unwrap();
        let problem = GraphPlaneProblem::new(graph, 1.0, 1.0).unwrap();
        let s = problem
            .solution(pos(&[(0.0, 0.0), (1.0, 0.0), (0.5, 0.0)]))
            .unwrap();
        assert_relative_eq!(s.angle_penalty(), 1.0);
        assert!(s.edge_dispersion() > 0.0);
    }

    #[test]
    fn test_solution_clamps_and_checks_length() {
        let problem = k4();
        let s = problem
            .solution(pos(&[(-1.0, 2.0), (0.5, 0.5), (0.5, 0.5), (0.5, 0.5)]))
            .unwrap();
        assert_eq!(s.positions()[0], VertexPos::new(0.0, 1.0));
        assert!(problem.solution(pos(&[(0.0, 0.0)])).is_err());
    }

    #[test]
    fn test_embedded_operators_stay_on_canvas() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(21);
        let problem = GraphPlaneProblem::random(12, 0.3, 3.0, 2.0, &mut rng).unwrap();
        let a = problem.random_solution(&mut rng);
        let b = problem.random_solution(&mut rng);
        let children = a.crossover(&b, &mut rng).value().unwrap();
        assert_eq!(children.len(), 2);
        for child in children {
            let m = child.mutate(1.0, &mut rng);
            assert!(m
                .positions()
                .iter()
                .all(|p| (0.0..=3.0).contains(&p.x) && (0.0..=2.0).contains(&p.y)));
        }
    }

    #[test]
    fn test_serialized_shape() {
        let problem = k4();
        let s = problem
            .solution(pos(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]))
            .unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["vertices"][2]["x"], 1.0);
        assert_eq!(json["objectives"][0], 1.0);
    }
}
