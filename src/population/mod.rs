//! Population management
//!
//! This module provides the Population container used by the single-objective
//! engines and as the starting point of the multi-objective ones.

#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::population::*;
}
