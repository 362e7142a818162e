//! Return commit: recycle projectiles back into the pool.
//!
//! Sole writer of the inactive invariants: hidden, still, empty collision filters.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{PooledProjectile, ProjectileEntity, ProjectileState};
use super::pool::{ProjectilePool, inactive_projectile_layers};

pub fn return_to_pool_commit(
    mut pool: ResMut<ProjectilePool>,
    mut q: Query<
        (Entity, &mut ProjectileState, &mut Visibility, &mut LinearVelocity, &mut CollisionLayers),
        With<PooledProjectile>,
    >,
) {
    for (e, mut state, mut vis, mut vel, mut layers) in &mut q {
        if *state != ProjectileState::PendingReturn {
            continue;
        }

        *state = ProjectileState::Inactive;
        *vis = Visibility::Hidden;
        vel.0 = Vec2::ZERO;
        *layers = inactive_projectile_layers();

        pool.push_free(ProjectileEntity(e));
    }
}

/// Leaving a run: everything in flight goes back to the pool.
pub fn recall_all_projectiles(mut q: Query<&mut ProjectileState, With<PooledProjectile>>) {
    for mut state in &mut q {
        if *state == ProjectileState::Active {
            *state = ProjectileState::PendingReturn;
        }
    }
}
