//! Benchmark problems
//!
//! Concrete problem families used by drivers and tests: bounded knapsack,
//! travelling salesman, the ZDT suite and graph-plane layout.

pub mod graph_plane;
pub mod knapsack;
pub mod tsp;
pub mod zdt;

pub mod prelude {
    pub use super::graph_plane::prelude::*;
    pub use super::knapsack::*;
    pub use super::tsp::*;
    pub use super::zdt::*;
}
