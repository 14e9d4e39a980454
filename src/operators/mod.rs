//! Variation operators
//!
//! This module provides the mutation and crossover strategy traits, adapters for
//! closures and for operators embedded on solution types, and parent selection.

pub mod embedded;
pub mod functional;
pub mod selection;
pub mod traits;

pub use embedded::{EmbeddedCrossover, EmbeddedMutation};
pub use functional::{FnCrossover, FnMutation, NoMutation};
pub use traits::{CrossoverStrategy, MutationStrategy, Operators};

pub mod prelude {
    pub use super::embedded::*;
    pub use super::functional::*;
    pub use super::selection::*;
    pub use super::traits::*;
}
