//! Core plugin: shared resources, global settings and message buffers.

use bevy::prelude::*;

use crate::common::messages::{DamageEnemy, DamagePlayer, EnemyKilled, GainExperience, HealPlayer};
use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::projectiles::messages::SpawnProjectileRequest;

pub fn plugin(app: &mut App) {
    app.insert_resource(Tunables::default());
    // Keep a seeded RNG if the caller (tests) inserted one first.
    app.init_resource::<GameRng>();
    app.insert_resource(ClearColor(Color::srgb(0.04, 0.05, 0.04)));

    app.add_message::<DamageEnemy>()
        .add_message::<DamagePlayer>()
        .add_message::<GainExperience>()
        .add_message::<HealPlayer>()
        .add_message::<EnemyKilled>()
        .add_message::<SpawnProjectileRequest>();
}
