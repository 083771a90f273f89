//! Penetration-rate sampling.
//!
//! Each vehicle is considered exactly once, at its first appearance.  A
//! uniform draw `u` in `[0, 1)` includes it iff `u < rate`, so a rate of 1
//! always includes and a rate of 0 never does.  Rejected ids are remembered
//! for the rest of the run and never drawn for again.

use std::collections::HashSet;

use cs_core::{EntityId, SimRng, SyncConfig, UnitDraw};

use crate::{SyncError, SyncResult};

pub struct SamplingPolicy<D: UnitDraw = SimRng> {
    rate:        f64,
    draw:        D,
    sampled_out: HashSet<EntityId>,
    draws:       u64,
}

impl SamplingPolicy<SimRng> {
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(config.penetration_rate, Self::seeded_rng(config))
    }

    /// Draw source for `config`: `sampling_seed`, or entropy when unset.
    pub fn seeded_rng(config: &SyncConfig) -> SimRng {
        match config.sampling_seed {
            Some(seed) => SimRng::new(seed),
            None       => SimRng::from_entropy(),
        }
    }
}

impl<D: UnitDraw> SamplingPolicy<D> {
    pub fn new(rate: f64, draw: D) -> SyncResult<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(SyncError::Config(format!("penetration rate {rate} outside [0, 1]")));
        }
        Ok(Self { rate, draw, sampled_out: HashSet::new(), draws: 0 })
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Draws consumed so far.
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    #[inline]
    pub fn is_sampled_out(&self, id: &EntityId) -> bool {
        self.sampled_out.contains(id)
    }

    pub fn sampled_out_count(&self) -> usize {
        self.sampled_out.len()
    }

    /// Decide whether `id` is mirrored.  Previously rejected ids return
    /// `false` without a draw.
    pub fn admit(&mut self, id: &EntityId) -> bool {
        if self.sampled_out.contains(id) {
            return false;
        }
        self.draws += 1;
        if self.draw.draw() < self.rate {
            true
        } else {
            self.sampled_out.insert(id.clone());
            false
        }
    }
}
