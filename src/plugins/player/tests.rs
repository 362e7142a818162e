use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use super::*;
use crate::common::messages::{DamagePlayer, HealPlayer};
use crate::common::test_utils::{ensure_messages, run_system_once};
use crate::common::tunables::Tunables;

#[test]
fn spawn_creates_player_with_starting_weapon() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(StartingWeapon(WeaponId::Sword));
    run_system_once(&mut world, super::spawn);

    let (stats, loadout, exp) = world
        .query_filtered::<(&PlayerStats, &Loadout, &Experience), With<Player>>()
        .single(&world)
        .unwrap();
    assert_eq!(stats.health, 100);
    assert_eq!(stats.max_health, 100);
    assert!(loadout.has_weapon(WeaponId::Sword));
    assert_eq!(loadout.weapons.len(), 1);
    assert_eq!(exp.level, 1);
}

#[test]
fn apply_movement_sets_velocity_in_pixels() {
    let mut world = World::new();
    world.insert_resource(Tunables { pixels_per_meter: 10.0, ..default() });
    world.insert_resource(PlayerInput { move_axis: Vec2::new(1.0, 0.0) });
    world.spawn((Player, PlayerStats::new(5.0, 100), LinearVelocity::ZERO));

    run_system_once(&mut world, super::apply_movement);

    let v = world.query::<&LinearVelocity>().iter(&world).next().unwrap();
    assert_eq!(v.0, Vec2::new(50.0, 0.0));
}

#[test]
fn dead_player_does_not_move() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(PlayerInput { move_axis: Vec2::X });
    let mut stats = PlayerStats::new(5.0, 10);
    stats.take_damage(10);
    world.spawn((Player, stats, LinearVelocity(Vec2::ONE)));

    run_system_once(&mut world, super::apply_movement);

    let v = world.query::<&LinearVelocity>().iter(&world).next().unwrap();
    assert_eq!(v.0, Vec2::ZERO);
}

#[test]
fn holding_a_direction_stops_at_the_wall() {
    let mut world = World::new();
    let tunables = Tunables::default();
    let arena = crate::plugins::world::Arena::from_tunables(&tunables);
    let mut time = Time::<()>::default();
    time.advance_by(std::time::Duration::from_secs_f32(1.0 / 64.0));
    let dt = time.delta_secs();
    world.insert_resource(time);
    world.insert_resource(arena);
    world.insert_resource(tunables.clone());
    world.insert_resource(PlayerInput { move_axis: Vec2::new(1.0, 1.0).normalize() });
    let e = world
        .spawn((Player, PlayerStats::new(5.0, 100), Transform::default(), LinearVelocity::ZERO))
        .id();

    // Long enough to cross the whole arena several times.
    for _ in 0..64 * 20 {
        run_system_once(&mut world, super::apply_movement);
        run_system_once(&mut world, super::confine_to_arena);
        let v = world.get::<LinearVelocity>(e).unwrap().0;
        world.get_mut::<Transform>(e).unwrap().translation += (v * dt).extend(0.0);
    }

    let pos = world.get::<Transform>(e).unwrap().translation.truncate();
    assert!(arena.contains(pos));
    let radius = tunables.px(PLAYER_RADIUS_METERS);
    assert!((pos.x - (arena.half_extents.x - radius)).abs() < 1e-2);
    assert!((pos.y - (arena.half_extents.y - radius)).abs() < 1e-2);
}

#[test]
fn facing_follows_last_movement_direction() {
    let mut world = World::new();
    let mut time = Time::<()>::default();
    time.advance_by(std::time::Duration::from_millis(16));
    world.insert_resource(time);
    world.insert_resource(Tunables::default());
    world.insert_resource(PlayerInput { move_axis: Vec2::NEG_X });
    let e = world.spawn((Player, Facing::default(), Transform::default())).id();

    run_system_once(&mut world, super::face_movement);
    assert_eq!(world.get::<Facing>(e).unwrap().0, Vec2::NEG_X);
    assert_ne!(world.get::<Transform>(e).unwrap().rotation, Quat::IDENTITY);

    // Standing still keeps the old facing.
    world.insert_resource(PlayerInput { move_axis: Vec2::ZERO });
    run_system_once(&mut world, super::face_movement);
    assert_eq!(world.get::<Facing>(e).unwrap().0, Vec2::NEG_X);
}

// -----------------------------------------------------------------------------
// Stats
// -----------------------------------------------------------------------------

#[test]
fn take_damage_reports_death_once() {
    let mut s = PlayerStats::new(5.0, 20);
    assert!(!s.take_damage(5));
    assert!(s.take_damage(15));
    assert!(!s.take_damage(5));
    assert!(s.is_dead());
}

#[test]
fn heal_is_capped_and_ignored_when_dead() {
    let mut s = PlayerStats::new(5.0, 100);
    s.take_damage(30);
    s.heal(50);
    assert_eq!(s.health, 100);

    s.take_damage(200);
    s.heal(50);
    assert!(s.is_dead());
}

#[test]
fn recompute_applies_passive_bonuses_from_base() {
    let mut loadout = Loadout::default();
    let mut s = PlayerStats::new(5.0, 100);

    loadout.add_passive(PassiveId::SpeedAmulet);
    loadout.add_passive(PassiveId::HealthBrooch);
    s.recompute(&loadout);
    assert!((s.move_speed - 5.5).abs() < 1e-5);
    assert_eq!(s.max_health, 110);
    assert_eq!(s.health, 110);

    // Recomputing again must not stack bonuses.
    s.recompute(&loadout);
    assert!((s.move_speed - 5.5).abs() < 1e-5);
    assert_eq!(s.max_health, 110);
}

#[test]
fn loadout_rejects_duplicates() {
    let mut l = Loadout::with_weapon(WeaponId::MagicWand);
    assert!(!l.add_weapon(WeaponId::MagicWand));
    assert!(l.add_weapon(WeaponId::Sword));
    assert!(l.add_passive(PassiveId::MagnetRing));
    assert!(!l.add_passive(PassiveId::MagnetRing));
    assert_eq!(l.weapons.len(), 2);
    assert_eq!(l.pickup_radius(), Some(2.0));
}

// -----------------------------------------------------------------------------
// Damage consumer
// -----------------------------------------------------------------------------

fn damage_world() -> World {
    let mut world = World::new();
    ensure_messages::<DamagePlayer>(&mut world);
    ensure_messages::<HealPlayer>(&mut world);
    world.insert_resource(GlobalFx::default());
    world.init_resource::<NextState<RunPhase>>();
    world
}

#[test]
fn damage_message_reduces_health_and_flashes() {
    let mut world = damage_world();
    let e = world.spawn((Player, PlayerStats::new(5.0, 100), LinearVelocity::ZERO)).id();
    world.write_message(DamagePlayer { amount: 5 });
    world.write_message(DamagePlayer { amount: 7 });

    run_system_once(&mut world, super::apply_player_damage);

    assert_eq!(world.get::<PlayerStats>(e).unwrap().health, 88);
    assert!(world.resource::<GlobalFx>().flash_intensity() > 0.0);
    assert!(matches!(*world.resource::<NextState<RunPhase>>(), NextState::Unchanged));
}

#[test]
fn lethal_damage_requests_game_over() {
    let mut world = damage_world();
    world.spawn((Player, PlayerStats::new(5.0, 10), LinearVelocity(Vec2::ONE)));
    world.write_message(DamagePlayer { amount: 25 });

    run_system_once(&mut world, super::apply_player_damage);

    assert!(matches!(
        *world.resource::<NextState<RunPhase>>(),
        NextState::Pending(RunPhase::GameOver)
    ));
}

#[test]
fn heal_message_restores_health() {
    let mut world = damage_world();
    let mut stats = PlayerStats::new(5.0, 100);
    stats.take_damage(40);
    let e = world.spawn((Player, stats)).id();
    world.write_message(HealPlayer { amount: 25 });

    run_system_once(&mut world, super::apply_player_heal);
    assert_eq!(world.get::<PlayerStats>(e).unwrap().health, 85);
}

#[test]
fn plugin_registers_in_app() {
    let mut app = App::new();
    app.add_plugins(StatesPlugin);
    app.init_state::<GameState>();
    app.add_sub_state::<RunPhase>();
    app.insert_resource(Tunables::default());
    super::plugin(&mut app);
    assert!(app.world().get_resource::<PlayerInput>().is_some());
}
