//! Spawn consumer: activate projectiles from the pool.
//!
//! Every entity in the free list is a pooled projectile, so a failed lookup is a bug and
//! panics. An empty pool is a capacity decision: the request is dropped.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::components::{Lifetime, PooledProjectile, Projectile, ProjectileEntity, ProjectileState};
use super::messages::SpawnProjectileRequest;
use super::pool::{ProjectilePool, active_projectile_layers};

pub fn allocate_projectiles_from_pool(
    mut pool: ResMut<ProjectilePool>,
    mut reader: MessageReader<SpawnProjectileRequest>,
    mut q: Query<
        (
            &mut ProjectileState,
            &mut Projectile,
            &mut Lifetime,
            &mut Transform,
            &mut LinearVelocity,
            &mut Visibility,
            &mut CollisionLayers,
        ),
        With<PooledProjectile>,
    >,
) {
    for req in reader.read() {
        let Some(ProjectileEntity(e)) = pool.pop_free() else {
            debug!("Projectile pool empty, request dropped");
            continue;
        };

        let (mut state, mut projectile, mut lifetime, mut tf, mut vel, mut vis, mut layers) = q
            .get_mut(e)
            .expect("ProjectilePool contained an entity missing pooled projectile components");

        *state = ProjectileState::Active;
        projectile.damage = req.damage;
        *lifetime = Lifetime::from_seconds(req.lifetime);
        tf.translation = req.pos.extend(2.0);
        tf.rotation = Quat::from_rotation_z(req.vel.to_angle());
        vel.0 = req.vel;
        *vis = Visibility::Visible;
        *layers = active_projectile_layers();
    }
}
