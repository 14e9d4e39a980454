//! Simple undirected graphs

use std::collections::HashSet;

use delaunator::Point;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError, GenomeError};
use crate::problems::graph_plane::solution::VertexPos;

/// An undirected edge, stored with `from < to`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

impl Edge {
    /// Create an edge between two vertices in either order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// Whether the two edges have an endpoint in common
    pub fn shares_vertex(&self, other: &Edge) -> bool {
        self.from == other.from
            || self.from == other.to
            || self.to == other.from
            || self.to == other.to
    }

    /// The endpoint opposite to `vertex`, if `vertex` is on this edge
    pub fn other(&self, vertex: usize) -> Option<usize> {
        if self.from == vertex {
            Some(self.to)
        } else if self.to == vertex {
            Some(self.from)
        } else {
            None
        }
    }
}

/// A simple graph: no self-loops, no parallel edges
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    num_vertices: usize,
    edges: Vec<Edge>,
}

impl Graph {
    /// Create a graph from explicit edges
    pub fn new(num_vertices: usize, edges: Vec<Edge>) -> EvoResult<Self> {
        if num_vertices == 0 {
            return Err(EvolutionError::Configuration(
                "graph needs at least one vertex".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(edges.len());
        for edge in &edges {
            if edge.from >= num_vertices || edge.to >= num_vertices {
                return Err(GenomeError::InvalidStructure(format!(
                    "edge {}-{} references a vertex outside 0..{num_vertices}",
                    edge.from, edge.to
                ))
                .into());
            }
            if edge.from >= edge.to {
                return Err(GenomeError::InvalidStructure(format!(
                    "edge {}-{} is a self-loop or not normalized",
                    edge.from, edge.to
                ))
                .into());
            }
            if !seen.insert(*edge) {
                return Err(GenomeError::InvalidStructure(format!(
                    "duplicate edge {}-{}",
                    edge.from, edge.to
                ))
                .into());
            }
        }

        Ok(Self {
            num_vertices,
            edges,
        })
    }

    /// Random simple graph with `floor(edge_fill * n(n-1)/2)` edges
    pub fn random<R: Rng>(num_vertices: usize, edge_fill: f64, rng: &mut R) -> EvoResult<Self> {
        if !(0.0..=1.0).contains(&edge_fill) {
            return Err(EvolutionError::Configuration(format!(
                "edge fill must be in [0, 1], got {edge_fill}"
            )));
        }

        let max_edges = num_vertices * num_vertices.saturating_sub(1) / 2;
        let num_edges = (edge_fill * max_edges as f64) as usize;

        let mut pairs: Vec<Edge> = (0..num_vertices)
            .flat_map(|u| (u + 1..num_vertices).map(move |v| Edge::new(u, v)))
            .collect();
        pairs.shuffle(rng);
        pairs.truncate(num_edges);
        pairs.sort_unstable();

        Self::new(num_vertices, pairs)
    }

    /// Random planar graph: the Delaunay triangulation of uniform points in the unit square
    pub fn random_planar<R: Rng>(num_vertices: usize, rng: &mut R) -> EvoResult<Self> {
        Self::random_planar_embedding(num_vertices, rng).map(|(graph, _)| graph)
    }

    /// Like [`Graph::random_planar`], also returning the sampled points.
    ///
    /// Placing every vertex at its point gives a layout without crossings.
    pub fn random_planar_embedding<R: Rng>(
        num_vertices: usize,
        rng: &mut R,
    ) -> EvoResult<(Self, Vec<VertexPos>)> {
        if num_vertices < 3 {
            return Err(EvolutionError::Configuration(format!(
                "planar graph needs at least 3 vertices, got {num_vertices}"
            )));
        }

        let points: Vec<Point> = (0..num_vertices)
            .map(|_| Point {
                x: rng.gen(),
                y: rng.gen(),
            })
            .collect();
        let triangulation = delaunator::triangulate(&points);

        let mut edges: Vec<Edge> = triangulation
            .triangles
            .chunks_exact(3)
            .flat_map(|t| [Edge::new(t[0], t[1]), Edge::new(t[1], t[2]), Edge::new(t[2], t[0])])
            .collect();
        edges.sort_unstable();
        edges.dedup();

        let graph = Self::new(num_vertices, edges)?;
        let positions = points.iter().map(|p| VertexPos::new(p.x, p.y)).collect();
        Ok((graph, positions))
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// The edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Neighbor lists indexed by vertex
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.num_vertices];
        for edge in &self.edges {
            adjacency[edge.from].push(edge.to);
            adjacency[edge.to].push(edge.from);
        }
        adjacency
    }

    /// Neighbors of one vertex
    pub fn neighbors(&self, vertex: usize) -> Vec<usize> {
        self.edges.iter().filter_map(|e| e.other(vertex)).collect()
    }

    /// Number of edge pairs that do not share a vertex, i.e. could cross
    pub fn max_possible_intersections(&self) -> usize {
        let mut count = 0;
        for (i, e1) in self.edges.iter().enumerate() {
            count += self.edges[i + 1..]
                .iter()
                .filter(|e2| !e1.shares_vertex(e2))
                .count();
        }
        count
    }
}
