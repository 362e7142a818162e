//! Shared random number source.
//!
//! All gameplay randomness (spawn rings, spread, drops, upgrade shuffles) draws from one
//! resource so tests can seed it.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Uniformly distributed unit vector.
    pub fn unit_direction(&mut self) -> Vec2 {
        Vec2::from_angle(self.0.gen_range(0.0..std::f32::consts::TAU))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f32) -> bool {
        self.0.gen_range(0.0..1.0) < p.clamp(0.0, 1.0)
    }

    /// Uniform float in `[lo, hi)`. Returns `lo` for an empty range.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo { self.0.gen_range(lo..hi) } else { lo }
    }

    /// Uniform index in `0..len`. `None` for an empty collection.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.0.gen_range(0..len))
    }
}
