//! Problem and solution contract
//!
//! Every search space implements [`Problem`], every candidate point implements
//! [`Solution`]. Engines are generic over these traits and never over concrete
//! genome types.

pub mod cache;
pub mod traits;

pub mod prelude {
    pub use super::cache::*;
    pub use super::traits::*;
}
