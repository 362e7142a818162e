use bevy::prelude::*;

use super::*;
use crate::common::test_utils::run_system_once;
use crate::plugins::pickups::ExperienceOrb;
use crate::plugins::player::{Loadout, Player};

#[test]
fn bonuses_grow_linearly_with_level() {
    let mut amulet = PassiveItem::new(PassiveId::SpeedAmulet);
    assert!((amulet.speed_bonus() - 0.5).abs() < 1e-5);
    amulet.level_up();
    amulet.level_up();
    assert!((amulet.speed_bonus() - 1.1).abs() < 1e-5);
    assert_eq!(amulet.health_bonus(), 0.0);

    let mut brooch = PassiveItem::new(PassiveId::HealthBrooch);
    brooch.level_up();
    assert_eq!(brooch.health_bonus(), 17.0);

    let mut ring = PassiveItem::new(PassiveId::MagnetRing);
    assert_eq!(ring.pickup_radius(), Some(2.0));
    ring.level_up();
    assert_eq!(ring.pickup_radius(), Some(2.5));
    assert_eq!(PassiveItem::new(PassiveId::SpeedAmulet).pickup_radius(), None);
}

#[test]
fn level_up_stops_at_max() {
    let mut item = PassiveItem::new(PassiveId::HealthBrooch);
    while item.level_up() {}
    assert_eq!(item.level, DEFAULT_MAX_LEVEL);
    assert_eq!(item.health_bonus(), 10.0 + 4.0 * 7.0);
    assert_eq!(item.upgrade_description(), "Max level reached");
}

#[test]
fn description_lists_only_relevant_bonuses() {
    let amulet = PassiveItem::new(PassiveId::SpeedAmulet).upgrade_description();
    assert!(amulet.contains("Speed bonus: 0.5 -> 0.8"));
    assert!(!amulet.contains("Health"));

    let ring = PassiveItem::new(PassiveId::MagnetRing).upgrade_description();
    assert!(ring.contains("Pickup radius: 2.0 -> 2.5"));
    assert!(!ring.contains("Speed"));
}

fn magnet_world(with_ring: bool) -> (World, Entity, Entity) {
    let mut world = World::new();
    let mut time = Time::<()>::default();
    time.advance_by(std::time::Duration::from_millis(100));
    world.insert_resource(time);
    world.insert_resource(Tunables::default());

    let mut loadout = Loadout::default();
    if with_ring {
        loadout.add_passive(PassiveId::MagnetRing);
    }
    world.spawn((Player, loadout, Transform::default()));

    // Ring radius is 2m = 64px; orb_near is inside, orb_far is not.
    let near = world.spawn((ExperienceOrb::new(1.0), Transform::from_xyz(50.0, 0.0, 0.0))).id();
    let far = world.spawn((ExperienceOrb::new(1.0), Transform::from_xyz(200.0, 0.0, 0.0))).id();
    (world, near, far)
}

#[test]
fn magnet_pulls_orbs_inside_radius() {
    let (mut world, near, far) = magnet_world(true);
    run_system_once(&mut world, magnet_pull);

    let near_orb = world.get::<ExperienceOrb>(near).unwrap();
    assert!(near_orb.attracted);
    assert!(world.get::<Transform>(near).unwrap().translation.x < 50.0);

    assert!(!world.get::<ExperienceOrb>(far).unwrap().attracted);
    assert_eq!(world.get::<Transform>(far).unwrap().translation.x, 200.0);
}

#[test]
fn no_ring_no_pull() {
    let (mut world, near, _) = magnet_world(false);
    run_system_once(&mut world, magnet_pull);
    assert!(!world.get::<ExperienceOrb>(near).unwrap().attracted);
}
