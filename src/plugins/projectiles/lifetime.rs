//! Projectiles expire after their lifetime or once they leave the arena.

use bevy::prelude::*;

use super::components::{Lifetime, PooledProjectile, ProjectileState};
use crate::plugins::world::Arena;

pub fn expire_projectiles(
    time: Res<Time>,
    arena: Res<Arena>,
    mut q: Query<(&mut Lifetime, &mut ProjectileState, &Transform), With<PooledProjectile>>,
) {
    for (mut lifetime, mut state, tf) in &mut q {
        if *state != ProjectileState::Active {
            continue;
        }
        lifetime.tick(time.delta());
        if lifetime.is_finished() || !arena.contains(tf.translation.truncate()) {
            *state = ProjectileState::PendingReturn;
        }
    }
}
