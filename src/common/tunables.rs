//! Tunable gameplay constants.
//!
//! Distances and speeds are authored in meters (and meters per second).
//! Rendering and physics work in pixels; convert with [`Tunables::px`].

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// Half size of the walled arena, in meters.
    pub arena_half_extents: Vec2,

    pub player_move_speed: f32,
    pub player_rotation_speed: f32,
    pub player_max_health: i32,

    /// Run length; surviving this long wins.
    pub run_time_limit: f32,
    pub time_between_waves: f32,
    pub boss_interval: f32,
    pub wave_spawn_min_distance: f32,
    pub wave_spawn_max_distance: f32,
    pub trickle_interval: f32,
    pub trickle_distance: f32,

    pub experience_to_first_level: f32,
    pub experience_growth: f32,
    /// A level-up heals `max_health / level_up_heal_divisor`.
    pub level_up_heal_divisor: i32,
    pub upgrade_option_count: usize,

    pub knockback_impulse: f32,
    pub projectile_pool_size: usize,

    pub orb_move_speed: f32,
    pub orb_attraction_radius: f32,
    pub orb_collect_radius: f32,
    pub orb_lifetime: f32,
    pub orb_drift_impulse: f32,
    pub magnet_pull_speed: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 32.0,
            arena_half_extents: Vec2::new(40.0, 24.0),

            player_move_speed: 5.0,
            player_rotation_speed: 10.0,
            player_max_health: 100,

            run_time_limit: 1800.0,
            time_between_waves: 60.0,
            boss_interval: 300.0,
            wave_spawn_min_distance: 10.0,
            wave_spawn_max_distance: 15.0,
            trickle_interval: 2.0,
            trickle_distance: 5.0,

            experience_to_first_level: 100.0,
            experience_growth: 1.2,
            level_up_heal_divisor: 4,
            upgrade_option_count: 3,

            knockback_impulse: 5.0,
            projectile_pool_size: 256,

            orb_move_speed: 5.0,
            orb_attraction_radius: 3.0,
            orb_collect_radius: 0.5,
            orb_lifetime: 30.0,
            orb_drift_impulse: 2.0,
            magnet_pull_speed: 5.0,
        }
    }
}

impl Tunables {
    /// Meters to pixels.
    #[inline]
    pub fn px(&self, meters: f32) -> f32 {
        meters * self.pixels_per_meter
    }

    /// Pixels to meters.
    #[inline]
    pub fn meters(&self, pixels: f32) -> f32 {
        pixels / self.pixels_per_meter
    }
}
