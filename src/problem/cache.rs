//! Memoized objective vectors
//!
//! Solutions compute their objectives lazily, once per instance. Variation
//! operators always build a new solution, so a cache never outlives its genome.

use std::sync::OnceLock;

/// Compute-once storage for an objective vector
#[derive(Clone, Debug, Default)]
pub struct ObjectiveCache {
    cell: OnceLock<Vec<f64>>,
}

impl ObjectiveCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached vector, computing it on first access
    pub fn get_or_compute<F>(&self, compute: F) -> &[f64]
    where
        F: FnOnce() -> Vec<f64>,
    {
        self.cell.get_or_init(compute)
    }

    /// Whether the objectives have been computed
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Drop the cached value after an in-place genome edit
    pub fn invalidate(&mut self) {
        self.cell.take();
    }
}
