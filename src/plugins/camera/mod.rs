//! Camera plugin (render-only).
//!
//! One camera lives for the whole session so menus and the HUD always have a render target.
//! During a run it eases toward the player with frame-rate independent smoothing.
//!
//! ```text
//! Startup:         spawn MainCamera
//! OnEnter(InGame): snap back to the origin
//! PostUpdate:      follow_player (before transform propagation)
//! ```
//!
//! The follow system reads the player `Transform` and writes the camera `Transform`, so the
//! two queries carry `Without<...>` filters to stay disjoint (B0001).

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::player::Player;

pub const CAMERA_Z: f32 = 999.0;

#[derive(Component, Debug, Clone, Copy)]
pub struct MainCamera {
    /// Higher is snappier. `0` freezes the camera.
    pub responsiveness: f32,
}

impl Default for MainCamera {
    fn default() -> Self {
        Self { responsiveness: 5.0 }
    }
}

/// Fraction of the remaining distance to cover this frame.
#[inline]
pub fn follow_alpha(responsiveness: f32, dt: f32) -> f32 {
    if responsiveness <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-responsiveness * dt).exp()
}

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera)
        .add_systems(OnEnter(GameState::InGame), recenter_camera)
        .add_systems(
            PostUpdate,
            follow_player
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera::default(),
        FireflyConfig::default(),
        Transform::from_xyz(0.0, 0.0, CAMERA_Z),
    ));
}

fn recenter_camera(mut q_cam: Query<&mut Transform, With<MainCamera>>) {
    for mut tf in &mut q_cam {
        tf.translation.x = 0.0;
        tf.translation.y = 0.0;
    }
}

pub(crate) fn follow_player(
    time: Res<Time>,
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok((mut tf_cam, cam)) = q_cam.single_mut() else {
        return;
    };

    let alpha = follow_alpha(cam.responsiveness, time.delta_secs());
    let target = tf_player.translation.truncate();
    let current = tf_cam.translation.truncate();
    let next = current + (target - current) * alpha;
    tf_cam.translation.x = next.x;
    tf_cam.translation.y = next.y;
}
