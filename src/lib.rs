//! # moea-harness
//!
//! A research harness for evolutionary multi-objective optimization.
//!
//! The library provides four optimizer engines that share one problem/solution
//! contract, plus a force-directed layout solver for the graph-plane benchmark.
//!
//! ## Core Concepts
//!
//! - **Problems and solutions**: engines are generic over [`problem::Problem`] and
//!   [`problem::Solution`]; every objective is minimized
//! - **Strategy operators**: mutation and crossover are injected as
//!   [`operators::MutationStrategy`] / [`operators::CrossoverStrategy`] values, either
//!   closures or the operators a solution type embeds
//! - **Pareto ranking**: dominance, non-dominated sorting, crowding distance and
//!   k-nearest-neighbor density live in [`pareto`]
//! - **Progress log**: engines emit JSON-lines step records through a
//!   [`logging::ProgressLogger`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use moea_harness::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let problem = ZdtProblem::new(ZdtVariant::Zdt1, 10)?;
//!
//! let mut engine = Nsga2::new(
//!     problem,
//!     MaxGenerations::new(100),
//!     Nsga2Config::default().with_population_size(50),
//!     Operators::embedded(0.1),
//!     NullLogger,
//! )?;
//! let result = engine.run(&mut rng)?;
//! println!("front size: {}", result.front.len());
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod operators;
pub mod pareto;
pub mod population;
pub mod problem;
pub mod problems;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::logging::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::pareto::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::problem::prelude::*;
    pub use crate::problems::prelude::*;
    pub use crate::termination::prelude::*;
}
