//! Projectile hits, from avian `CollisionStart` messages.
//!
//! A projectile hits at most one thing per step: walls just return it, enemies get a
//! `DamageEnemy` and then it returns.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};
use crate::common::layers::Layer;
use crate::common::messages::DamageEnemy;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

#[inline]
fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

pub fn process_projectile_collisions(
    mut started: MessageReader<CollisionStart>,
    q_is_projectile: Query<(), With<PooledProjectile>>,
    mut q_projectiles: Query<(&Projectile, &mut ProjectileState), With<PooledProjectile>>,
    q_layers: Query<&CollisionLayers>,
    mut damage: MessageWriter<DamageEnemy>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let p1 = q_is_projectile.contains(t1.collider);
        let p2 = q_is_projectile.contains(t2.collider);
        if !(p1 ^ p2) {
            continue;
        }
        let (projectile_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };

        if !seen.insert(projectile_side.collider) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let Ok((projectile, mut state)) = q_projectiles.get_mut(projectile_side.collider) else {
            continue;
        };
        if *state != ProjectileState::Active {
            continue;
        }

        if is_in_layer(other_layers, Layer::World) {
            *state = ProjectileState::PendingReturn;
        } else if is_in_layer(other_layers, Layer::Enemy) {
            damage.write(DamageEnemy {
                target: other_side.gameplay_owner(),
                amount: projectile.damage,
            });
            *state = ProjectileState::PendingReturn;
        }
    }
}
