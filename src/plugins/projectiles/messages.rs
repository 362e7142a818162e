//! Buffered spawn requests.
//!
//! Weapons write intent; the allocator is the single consumer that touches the pool.

use bevy::prelude::*;

/// Fire one projectile. Position and velocity in pixels.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnProjectileRequest {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub lifetime: f32,
}
