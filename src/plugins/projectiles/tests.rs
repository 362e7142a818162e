//! Deterministic projectile tests.
//!
//! Collisions are not produced by the physics pipeline here: tests inject `CollisionStart`
//! messages and run the resolve system once.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{Lifetime, PooledProjectile, Projectile, ProjectileState};
use super::messages::SpawnProjectileRequest;
use super::{allocator, collision, commit, lifetime, pool};
use crate::common::layers::Layer;
use crate::common::messages::DamageEnemy;
use crate::common::test_utils::{drain_messages, ensure_messages, run_system_once};
use crate::common::tunables::Tunables;
use crate::plugins::world::Arena;

fn pool_world(capacity: usize) -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(pool::ProjectilePool::new(capacity));
    ensure_messages::<SpawnProjectileRequest>(&mut world);
    ensure_messages::<DamageEnemy>(&mut world);
    ensure_messages::<CollisionStart>(&mut world);
    run_system_once(&mut world, pool::init_projectile_pool);
    world
}

/// Fire one projectile and return the entity the allocator picked.
fn fire(world: &mut World, pos: Vec2, vel: Vec2, damage: i32) -> Entity {
    let before = active(world);
    world.write_message(SpawnProjectileRequest { pos, vel, damage, lifetime: 1.0 });
    run_system_once(world, allocator::allocate_projectiles_from_pool);
    // A fresh reader would see this request again on the next call.
    drain_messages::<SpawnProjectileRequest>(world);
    active(world)
        .into_iter()
        .find(|e| !before.contains(e))
        .expect("a projectile was activated")
}

fn active(world: &mut World) -> Vec<Entity> {
    let mut q = world.query_filtered::<(Entity, &ProjectileState), With<PooledProjectile>>();
    q.iter(world)
        .filter(|(_, s)| **s == ProjectileState::Active)
        .map(|(e, _)| e)
        .collect()
}

fn write_collision(world: &mut World, a: Entity, b: Entity, body_b: Option<Entity>) {
    world.write_message(CollisionStart {
        collider1: a,
        collider2: b,
        body1: Some(a),
        body2: body_b,
    });
}

#[test]
fn pool_spawns_capacity_inactive_projectiles() {
    let mut world = pool_world(8);
    assert_eq!(world.resource::<pool::ProjectilePool>().available(), 8);

    let mut q = world.query_filtered::<
        (&ProjectileState, &Visibility, &CollisionLayers, &RigidBody),
        With<PooledProjectile>,
    >();
    let all: Vec<_> = q.iter(&world).collect();
    assert_eq!(all.len(), 8);
    for (state, vis, layers, body) in all {
        assert_eq!(*state, ProjectileState::Inactive);
        assert_eq!(*vis, Visibility::Hidden);
        assert_eq!(*body, RigidBody::Kinematic);
        assert!(layers.memberships.has_all(Layer::PlayerProjectile));
        assert!(!layers.filters.has_all(Layer::Enemy));
        assert!(!layers.filters.has_all(Layer::World));
    }
}

#[test]
fn allocator_activates_and_aims() {
    let mut world = pool_world(2);
    let e = fire(&mut world, Vec2::new(10.0, 20.0), Vec2::new(0.0, 300.0), 7);

    assert_eq!(world.get::<Transform>(e).unwrap().translation.truncate(), Vec2::new(10.0, 20.0));
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(0.0, 300.0));
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Visible);
    assert_eq!(world.get::<Projectile>(e).unwrap(), &Projectile { damage: 7 });
    let lifetime = world.get::<Lifetime>(e).unwrap();
    assert_eq!(lifetime.duration(), Duration::from_secs(1));
    assert!(!lifetime.is_finished());

    let layers = world.get::<CollisionLayers>(e).unwrap();
    assert!(layers.filters.has_all(Layer::Enemy));
    assert!(layers.filters.has_all(Layer::World));

    // Pointing along +Y.
    let facing = world.get::<Transform>(e).unwrap().rotation * Vec3::X;
    assert!((facing.truncate() - Vec2::Y).length() < 1e-4);
    assert_eq!(world.resource::<pool::ProjectilePool>().available(), 1);
}

#[test]
fn empty_pool_drops_requests() {
    let mut world = pool_world(1);
    for _ in 0..3 {
        world.write_message(SpawnProjectileRequest {
            pos: Vec2::ZERO,
            vel: Vec2::X,
            damage: 1,
            lifetime: 1.0,
        });
    }
    run_system_once(&mut world, allocator::allocate_projectiles_from_pool);

    assert_eq!(active(&mut world).len(), 1);
    assert_eq!(world.resource::<pool::ProjectilePool>().available(), 0);
}

#[test]
fn commit_recycles_pending_projectiles() {
    let mut world = pool_world(1);
    let e = fire(&mut world, Vec2::ZERO, Vec2::X * 10.0, 1);
    *world.get_mut::<ProjectileState>(e).unwrap() = ProjectileState::PendingReturn;

    run_system_once(&mut world, commit::return_to_pool_commit);

    assert_eq!(*world.get::<ProjectileState>(e).unwrap(), ProjectileState::Inactive);
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Hidden);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::ZERO);
    assert!(!world.get::<CollisionLayers>(e).unwrap().filters.has_all(Layer::Enemy));
    assert_eq!(world.resource::<pool::ProjectilePool>().available(), 1);
}

#[test]
fn enemy_hit_damages_and_returns() {
    let mut world = pool_world(1);
    let p = fire(&mut world, Vec2::ZERO, Vec2::X, 9);
    let enemy = world.spawn(CollisionLayers::new(Layer::Enemy, [Layer::PlayerProjectile])).id();

    write_collision(&mut world, p, enemy, Some(enemy));
    run_system_once(&mut world, collision::process_projectile_collisions);

    assert_eq!(
        drain_messages::<DamageEnemy>(&mut world),
        vec![DamageEnemy { target: enemy, amount: 9 }]
    );
    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::PendingReturn);
}

#[test]
fn enemy_on_either_side_of_the_pair_is_hit() {
    let mut world = pool_world(1);
    let p = fire(&mut world, Vec2::ZERO, Vec2::X, 4);
    let enemy = world.spawn(CollisionLayers::new(Layer::Enemy, [Layer::PlayerProjectile])).id();

    world.write_message(CollisionStart {
        collider1: enemy,
        collider2: p,
        body1: Some(enemy),
        body2: Some(p),
    });
    run_system_once(&mut world, collision::process_projectile_collisions);

    assert_eq!(drain_messages::<DamageEnemy>(&mut world).len(), 1);
}

#[test]
fn one_hit_per_projectile_per_step() {
    let mut world = pool_world(1);
    let p = fire(&mut world, Vec2::ZERO, Vec2::X, 4);
    let a = world.spawn(CollisionLayers::new(Layer::Enemy, [Layer::PlayerProjectile])).id();
    let b = world.spawn(CollisionLayers::new(Layer::Enemy, [Layer::PlayerProjectile])).id();

    write_collision(&mut world, p, a, Some(a));
    write_collision(&mut world, p, b, Some(b));
    run_system_once(&mut world, collision::process_projectile_collisions);

    let hits = drain_messages::<DamageEnemy>(&mut world);
    assert_eq!(hits, vec![DamageEnemy { target: a, amount: 4 }]);
}

#[test]
fn wall_hit_returns_without_damage() {
    let mut world = pool_world(1);
    let p = fire(&mut world, Vec2::ZERO, Vec2::X, 4);
    let wall = world.spawn(CollisionLayers::new(Layer::World, [Layer::PlayerProjectile])).id();

    write_collision(&mut world, p, wall, Some(wall));
    run_system_once(&mut world, collision::process_projectile_collisions);

    assert!(drain_messages::<DamageEnemy>(&mut world).is_empty());
    assert_eq!(*world.get::<ProjectileState>(p).unwrap(), ProjectileState::PendingReturn);
}

#[test]
fn inactive_projectile_ignores_collisions() {
    let mut world = pool_world(1);
    let p = fire(&mut world, Vec2::ZERO, Vec2::X, 4);
    *world.get_mut::<ProjectileState>(p).unwrap() = ProjectileState::PendingReturn;
    let enemy = world.spawn(CollisionLayers::new(Layer::Enemy, [Layer::PlayerProjectile])).id();

    write_collision(&mut world, p, enemy, Some(enemy));
    run_system_once(&mut world, collision::process_projectile_collisions);

    assert!(drain_messages::<DamageEnemy>(&mut world).is_empty());
}

#[test]
fn lifetime_and_arena_bounds_expire_projectiles() {
    let mut world = pool_world(3);
    let mut time = Time::<()>::default();
    time.advance_by(Duration::from_millis(500));
    world.insert_resource(time);
    let arena = Arena::from_tunables(&Tunables::default());
    world.insert_resource(arena);

    let short = fire(&mut world, Vec2::ZERO, Vec2::X, 1);
    *world.get_mut::<Lifetime>(short).unwrap() = Lifetime::from_seconds(0.25);
    let long = fire(&mut world, Vec2::ZERO, Vec2::X, 1);
    *world.get_mut::<Lifetime>(long).unwrap() = Lifetime::from_seconds(10.0);
    let outside = fire(&mut world, Vec2::ZERO, Vec2::X, 1);
    *world.get_mut::<Lifetime>(outside).unwrap() = Lifetime::from_seconds(10.0);
    world.get_mut::<Transform>(outside).unwrap().translation.x = arena.half_extents.x + 50.0;

    run_system_once(&mut world, lifetime::expire_projectiles);

    assert_eq!(*world.get::<ProjectileState>(short).unwrap(), ProjectileState::PendingReturn);
    assert_eq!(*world.get::<ProjectileState>(long).unwrap(), ProjectileState::Active);
    assert_eq!(*world.get::<ProjectileState>(outside).unwrap(), ProjectileState::PendingReturn);
}

#[test]
fn recall_returns_everything_in_flight() {
    let mut world = pool_world(4);
    fire(&mut world, Vec2::ZERO, Vec2::X, 1);
    fire(&mut world, Vec2::ZERO, Vec2::Y, 1);

    run_system_once(&mut world, commit::recall_all_projectiles);
    run_system_once(&mut world, commit::return_to_pool_commit);

    assert!(active(&mut world).is_empty());
    assert_eq!(world.resource::<pool::ProjectilePool>().available(), 4);
}
