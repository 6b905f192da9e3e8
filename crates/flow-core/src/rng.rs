//! The single random source threaded through every stochastic component.
//!
//! Model functions are generic over `rand::Rng`; the engine owns exactly
//! one `SimRng` and lends it out, so a fixed seed replays a run exactly.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub type SimRng = ChaCha8Rng;

/// Deterministic generator for tests and reproducible runs.
pub fn seeded(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generator seeded from OS entropy.
pub fn from_entropy() -> SimRng {
    ChaCha8Rng::from_entropy()
}
