use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{Lifetime, PooledProjectile, Projectile, ProjectileEntity, ProjectileState};
use crate::common::layers::Layer;
use crate::common::tunables::Tunables;

const PROJECTILE_RADIUS_METERS: f32 = 0.15;

#[derive(Resource, Debug)]
pub struct ProjectilePool {
    free: Vec<ProjectileEntity>,
    capacity: usize,
}

impl ProjectilePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<ProjectileEntity> {
        self.free.pop()
    }

    #[inline]
    pub fn push_free(&mut self, e: ProjectileEntity) {
        debug_assert!(self.free.len() < self.capacity, "projectile returned twice");
        self.free.push(e);
    }
}

#[inline]
pub(crate) fn active_projectile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerProjectile, [Layer::World, Layer::Enemy])
}

/// Empty filters: an inactive projectile collides with nothing.
#[inline]
pub(crate) fn inactive_projectile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerProjectile, [] as [Layer; 0])
}

/// Pre-spawn every projectile, inactive. They live for the whole app.
pub fn init_projectile_pool(mut commands: Commands, tunables: Res<Tunables>, mut pool: ResMut<ProjectilePool>) {
    pool.free.clear();
    let radius = tunables.px(PROJECTILE_RADIUS_METERS);

    for _ in 0..pool.capacity {
        let e = commands
            .spawn((
                Name::new("Projectile(Pooled)"),
                PooledProjectile,
                ProjectileState::Inactive,
                Projectile { damage: 0 },
                Lifetime::default(),
                Sprite {
                    color: Color::srgb(0.55, 0.8, 1.0),
                    custom_size: Some(Vec2::new(radius * 3.0, radius * 1.4)),
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, 2.0),
                Visibility::Hidden,
                RigidBody::Kinematic,
                Collider::circle(radius),
                Sensor,
                inactive_projectile_layers(),
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ))
            .id();
        pool.free.push(ProjectileEntity(e));
    }
    debug!("Projectile pool ready ({} slots)", pool.capacity);
}
