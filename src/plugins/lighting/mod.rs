//! Lighting plugin (Firefly) (render-only).
//!
//! A single warm light rides on the player. It shifts toward red as health drops, so the
//! arena itself reads as a health warning.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::player::{Player, PlayerStats};

const HEALTHY: Color = Color::srgb(1.0, 0.9, 0.75);
const WOUNDED: Color = Color::srgb(1.0, 0.35, 0.3);

#[derive(Component)]
pub struct PlayerLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup)
        .add_systems(Update, follow_player_light.run_if(in_state(GameState::InGame)));
}

/// Light tint for a health ratio in `[0, 1]`. Full white-warm until half health.
pub fn light_color(health_ratio: f32) -> Color {
    let danger = (1.0 - health_ratio.clamp(0.0, 1.0) * 2.0).clamp(0.0, 1.0);
    HEALTHY.mix(&WOUNDED, danger)
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: HEALTHY,
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player_light(
    q_player: Query<(&Transform, &PlayerStats), (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<(&mut Transform, &mut PointLight2d), (With<PlayerLight>, Without<Player>)>,
) {
    let Ok((tf_player, stats)) = q_player.single() else {
        return;
    };
    let Ok((mut tf_light, mut light)) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
    light.color = light_color(stats.health_ratio());
}
