//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod core;
pub mod enemies;
pub mod fx;
pub mod passives;
pub mod physics;
pub mod pickups;
pub mod player;
pub mod progression;
pub mod projectiles;
pub mod run;
pub mod settings;
pub mod ui;
pub mod upgrades;
pub mod waves;
pub mod weapons;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    settings::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    run::plugin(app);
    player::plugin(app);
    progression::plugin(app);
    enemies::plugin(app);
    waves::plugin(app);
    weapons::plugin(app);
    passives::plugin(app);
    pickups::plugin(app);
    upgrades::plugin(app);
    fx::plugin(app);
    ui::plugin(app);
    app.add_plugins(ProjectilesPlugin);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    lighting::plugin(app);
    camera::plugin(app);
    settings::window_plugin(app);
}
