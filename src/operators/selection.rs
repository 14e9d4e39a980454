//! Parent selection helpers
//!
//! Engines select parents by index so the pool can be any slice they own.

use rand::Rng;

/// Binary tournament over `0..len`
///
/// Samples two indices uniformly (with replacement) and returns the winner
/// according to `better(a, b)`, which must return `true` when `a` beats `b`.
/// If both draws coincide that index is returned. `len` must be non-zero.
pub fn binary_tournament<R, F>(len: usize, rng: &mut R, better: F) -> usize
where
    R: Rng,
    F: Fn(usize, usize) -> bool,
{
    debug_assert!(len > 0, "tournament over an empty pool");
    let i = rng.gen_range(0..len);
    let j = rng.gen_range(0..len);
    if i == j || !better(j, i) {
        i
    } else {
        j
    }
}

/// Binary tournament on scalar fitness (lower wins)
pub fn fitness_tournament<R: Rng>(fitness: &[f64], rng: &mut R) -> usize {
    binary_tournament(fitness.len(), rng, |a, b| fitness[a] < fitness[b])
}

/// Two distinct indices drawn uniformly from `0..len` by rejection
///
/// `len` must be at least 2.
pub fn distinct_pair<R: Rng>(len: usize, rng: &mut R) -> (usize, usize) {
    debug_assert!(len >= 2, "need two candidates for a distinct pair");
    loop {
        let i = rng.gen_range(0..len);
        let j = rng.gen_range(0..len);
        if i != j {
            return (i, j);
        }
    }
}
