//! Evolutionary algorithms
//!
//! Four engines share one run context: the generational GA ([`sga`]), the
//! steady-state GA ([`ssga`]) and the multi-objective NSGA-II ([`nsga2`]) and
//! SPEA2 ([`spea2`]).

pub mod context;
pub mod nsga2;
pub mod sga;
pub mod spea2;
pub mod ssga;

pub mod prelude {
    pub use super::context::{RunContext, CANCELLED};
    pub use super::nsga2::*;
    pub use super::sga::*;
    pub use super::spea2::*;
    pub use super::ssga::*;
}
