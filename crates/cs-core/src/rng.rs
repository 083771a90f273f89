//! Deterministic random draws for the sampling policy.
//!
//! The penetration-rate decision consumes exactly one uniform draw per
//! newly-appeared vehicle.  [`UnitDraw`] abstracts the source of those draws
//! so tests can feed a fixed sequence; [`SimRng`] is the seeded production
//! source.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`.
pub trait UnitDraw {
    fn draw(&mut self) -> f64;
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG.
///
/// Used only from the single-threaded tick, so no synchronisation is needed.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed from the OS entropy source (non-reproducible runs).
    pub fn from_entropy() -> Self {
        SimRng(SmallRng::from_entropy())
    }
}

impl UnitDraw for SimRng {
    #[inline]
    fn draw(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}
