//! Shared helpers for integration tests

use std::sync::Once;

use rand::rngs::StdRng;
use rand::SeedableRng;

static TRACING: Once = Once::new();

/// Route engine diagnostics to the test output, once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic generator for replayable runs
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
