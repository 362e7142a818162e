//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime.
//! - `horde_survivor::game::configure_headless` installs the gameplay plugins.
#![allow(dead_code)]

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use horde_survivor::common::state::{GameState, RunPhase};
use horde_survivor::plugins::player::Player;

pub fn app_headless() -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((MinimalPlugins, StatesPlugin, AssetPlugin::default(), ScenePlugin));

    horde_survivor::game::configure_headless(&mut app);
    app
}

/// Leave the main menu and run until the player exists.
pub fn start_run(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
    app.update();
}

pub fn player(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Player>>()
        .single(app.world())
        .expect("exactly one player")
}

pub fn game_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

pub fn run_phase(app: &App) -> Option<RunPhase> {
    app.world().get_resource::<State<RunPhase>>().map(|s| *s.get())
}
