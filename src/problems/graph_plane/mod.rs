//! Crossing-minimizing graph layout
//!
//! Place the vertices of a fixed graph on a rectangular canvas so that as few
//! edges as possible cross. Includes layout-specific mutation operators and a
//! force-directed solver that can seed the genetic engines.

pub mod force;
pub mod graph;
pub mod operators;
pub mod solution;

pub use force::{ForceDirectedConfig, ForceDirectedLayout};
pub use graph::{Edge, Graph};
pub use operators::{
    AdaptiveNormMutation, ConservativeNormMutation, FixedNormMutation, FixedPercentageMutation,
    FixedTensionVectorMutation, FixedUniformMutation, MirrorMutation, NormMutation,
    NormWeightedMutation, TensionVectorMutation, UniformCrossover, UniformMutation,
};
pub use solution::{
    segments_intersect, GraphPlaneProblem, GraphPlaneSolution, VertexPos, AESTHETIC_WEIGHT,
};

pub mod prelude {
    pub use super::force::{ForceDirectedConfig, ForceDirectedLayout};
    pub use super::graph::{Edge, Graph};
    pub use super::operators::*;
    pub use super::solution::{
        segments_intersect, GraphPlaneProblem, GraphPlaneSolution, VertexPos, AESTHETIC_WEIGHT,
    };
}
