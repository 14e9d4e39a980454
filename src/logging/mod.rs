//! Progress logging
//!
//! Engines report progress through a [`ProgressLogger`]: one JSON object per
//! line, first the problem, then one record per logged step. The driver owns
//! setup (`init_logging`, `log_problem`); engines only call `log_step`.

pub mod logger;
pub mod nanos;
pub mod record;

pub use logger::{JsonlLogger, MemoryLogger, NullLogger, ProgressLogger};
pub use record::{StepCounter, StepRecord};

pub mod prelude {
    pub use super::logger::*;
    pub use super::record::*;
}
