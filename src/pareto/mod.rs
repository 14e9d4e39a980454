//! Pareto dominance and diversity utilities
//!
//! Shared building blocks for the multi-objective engines. All functions work on
//! anything that can be viewed as an objective slice (`AsRef<[f64]>`), so they
//! accept plain `Vec<f64>` points as well as engine individuals.

pub mod density;
pub mod ranking;

pub mod prelude {
    pub use super::density::*;
    pub use super::ranking::*;
}
