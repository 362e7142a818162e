//! Global "game feel" effects: screen flash, camera shake, hitstop and slowmo.
//!
//! Producers call a preset on [`GlobalFx`] (player hurt, boss down). One consumer,
//! [`apply_global_fx`], turns that intent into camera offset, overlay alpha and
//! virtual-time speed, so nothing else fights over those.
//!
//! Timers tick on real time so they keep running while virtual time is slowed or frozen.
//! Pausing the run uses `Time<Virtual>::pause`, which is independent of the relative
//! speed written here.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy::time::{Real, Virtual};

use crate::common::state::GameState;
use crate::plugins::camera::MainCamera;

/// A value normalized to `[0, 1]`. Clamped on write.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct UnitF32(f32);

impl UnitF32 {
    #[inline]
    pub(crate) fn new_clamped(v: f32) -> Self {
        Self(v.clamp(0.0, 1.0))
    }
    #[inline]
    pub(crate) fn get(self) -> f32 {
        self.0
    }
    #[inline]
    pub(crate) fn add_clamped(&mut self, dv: f32) {
        self.0 = (self.0 + dv).clamp(0.0, 1.0);
    }
    #[inline]
    pub(crate) fn decay_to_zero(&mut self, rate_per_sec: f32, dt: f32) {
        self.0 = (self.0 - rate_per_sec * dt).max(0.0);
    }
}

/// Wall-clock seconds, never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct RealSeconds(f32);

impl RealSeconds {
    #[inline]
    fn new(v: f32) -> Self {
        Self(v.max(0.0))
    }
    #[inline]
    fn get(self) -> f32 {
        self.0
    }
    #[inline]
    fn set_max(&mut self, v: f32) {
        self.0 = self.0.max(v.max(0.0));
    }
    #[inline]
    fn tick_down(&mut self, dt: f32) {
        self.0 = (self.0 - dt).max(0.0);
    }
    #[inline]
    fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

#[derive(Component, Debug, Clone, Copy)]
struct ScreenFlashOverlay;

/// Cached camera and overlay entities, plus last frame's shake so it can be undone.
#[derive(Resource, Debug, Default, Clone, Copy)]
struct FxHandles {
    camera: Option<Entity>,
    overlay: Option<Entity>,
    prev_shake_offset: Vec2,
}

#[derive(Resource, Debug)]
pub struct GlobalFx {
    trauma: UnitF32,
    shake_phase: f32,

    flash: UnitF32,
    flash_color: Color,

    hitstop: RealSeconds,
    slowmo_remaining: RealSeconds,
    slowmo_duration: RealSeconds,
    slowmo_min_speed: f32,
}

impl Default for GlobalFx {
    fn default() -> Self {
        Self {
            trauma: UnitF32::default(),
            shake_phase: 0.0,
            flash: UnitF32::default(),
            flash_color: Color::WHITE,
            hitstop: RealSeconds::default(),
            slowmo_remaining: RealSeconds::default(),
            slowmo_duration: RealSeconds::new(1.0),
            slowmo_min_speed: 0.3,
        }
    }
}

impl GlobalFx {
    /// Red flash and a small kick. Repeated hits keep the flash topped up.
    pub fn trigger_player_hurt(&mut self) {
        self.flash_color = Color::srgb(0.9, 0.1, 0.1);
        self.flash.add_clamped(0.45);
        self.trauma.add_clamped(0.25);
    }

    /// Boss death: heavy shake, white flash, a short freeze and a slowmo tail.
    pub fn trigger_boss_down(&mut self) {
        self.flash_color = Color::WHITE;
        self.flash = UnitF32::new_clamped(1.0);
        self.trauma.add_clamped(0.95);

        self.hitstop.set_max(0.12);

        self.slowmo_duration = RealSeconds::new(1.2);
        self.slowmo_remaining.set_max(self.slowmo_duration.get());
        self.slowmo_min_speed = 0.25;
    }

    #[inline]
    pub fn flash_intensity(&self) -> f32 {
        self.flash.get()
    }

    #[inline]
    pub fn shake_intensity(&self) -> f32 {
        self.trauma.get()
    }

    #[inline]
    pub fn is_time_altered(&self) -> bool {
        self.hitstop.is_positive() || self.slowmo_remaining.is_positive()
    }
}

pub fn plugin(app: &mut App) {
    app.insert_resource(GlobalFx::default())
        .insert_resource(FxHandles::default())
        .add_systems(OnEnter(GameState::InGame), reset_fx)
        .add_systems(OnExit(GameState::InGame), restore_time_speed)
        .add_systems(
            PostUpdate,
            (ensure_fx_handles, apply_global_fx.after(ensure_fx_handles))
                .run_if(in_state(GameState::InGame)),
        );
}

fn reset_fx(mut fx: ResMut<GlobalFx>, mut handles: ResMut<FxHandles>) {
    *fx = GlobalFx::default();
    *handles = FxHandles::default();
}

/// Leaving a run mid-hitstop must not leave the menu frozen.
fn restore_time_speed(mut virtual_time: ResMut<Time<Virtual>>, mut fx: ResMut<GlobalFx>) {
    *fx = GlobalFx::default();
    virtual_time.set_relative_speed(1.0);
}

fn ensure_fx_handles(
    mut commands: Commands,
    mut handles: ResMut<FxHandles>,
    q_main_cam: Query<Entity, With<MainCamera>>,
    q_any_cam: Query<Entity, With<Camera2d>>,
    q_overlay: Query<Entity, With<ScreenFlashOverlay>>,
) {
    if handles.camera.is_some() && handles.overlay.is_some() {
        return;
    }

    if handles.camera.is_none() {
        handles.camera = q_main_cam.single().ok().or_else(|| q_any_cam.iter().next());
    }

    if handles.overlay.is_none() {
        handles.overlay = q_overlay.single().ok().or_else(|| {
            let e = commands
                .spawn((
                    Name::new("ScreenFlashOverlay"),
                    ScreenFlashOverlay,
                    Sprite {
                        color: Color::srgba(1.0, 1.0, 1.0, 0.0),
                        custom_size: Some(Vec2::splat(5000.0)),
                        ..default()
                    },
                    Transform::from_xyz(0.0, 0.0, 500.0),
                    Visibility::Hidden,
                    DespawnOnExit(GameState::InGame),
                ))
                .id();
            Some(e)
        });
    }
}

/// Quintic easing, used for the slowmo fade-back.
#[inline]
fn smootherstep(x: f32) -> f32 {
    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

/// Sole writer of camera shake, overlay alpha and virtual-time relative speed.
fn apply_global_fx(
    real_time: Res<Time<Real>>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut fx: ResMut<GlobalFx>,
    mut handles: ResMut<FxHandles>,
    mut q_cam_tf: Query<&mut Transform, (With<Camera2d>, Without<ScreenFlashOverlay>)>,
    mut q_overlay: Query<(&mut Transform, &mut Sprite, &mut Visibility), (With<ScreenFlashOverlay>, Without<Camera2d>)>,
) {
    let dt = real_time.delta_secs();

    // Time control runs even without a camera (headless).
    if fx.hitstop.is_positive() {
        fx.hitstop.tick_down(dt);
        virtual_time.set_relative_speed(0.0);
    } else if fx.slowmo_remaining.is_positive() {
        fx.slowmo_remaining.tick_down(dt);

        let dur = fx.slowmo_duration.get().max(0.0001);
        let progress = 1.0 - (fx.slowmo_remaining.get() / dur).clamp(0.0, 1.0);
        let min = fx.slowmo_min_speed.clamp(0.0, 1.0);
        virtual_time.set_relative_speed(min + (1.0 - min) * smootherstep(progress));
    } else if virtual_time.relative_speed() != 1.0 {
        virtual_time.set_relative_speed(1.0);
    }

    fx.shake_phase += dt;
    fx.trauma.decay_to_zero(0.9, dt);
    fx.flash.decay_to_zero(2.5, dt);

    let Some(cam_e) = handles.camera else {
        return;
    };

    // Undo last frame's offset first so shake never drifts.
    if let Ok(mut cam_tf) = q_cam_tf.get_mut(cam_e) {
        cam_tf.translation.x -= handles.prev_shake_offset.x;
        cam_tf.translation.y -= handles.prev_shake_offset.y;
    }
    handles.prev_shake_offset = Vec2::ZERO;

    if fx.trauma.get() > 0.0 {
        let strength = fx.trauma.get() * fx.trauma.get();
        let amp = 24.0 * strength;

        // Deterministic pseudo-noise.
        let x = (fx.shake_phase * 37.0 * std::f32::consts::TAU).sin()
            + 0.5 * (fx.shake_phase * 61.0 * std::f32::consts::TAU).sin();
        let y = (fx.shake_phase * 41.0 * std::f32::consts::TAU).cos()
            + 0.5 * (fx.shake_phase * 53.0 * std::f32::consts::TAU).cos();
        let offset = Vec2::new(x, y).clamp_length_max(1.0) * amp;

        if let Ok(mut cam_tf) = q_cam_tf.get_mut(cam_e) {
            cam_tf.translation.x += offset.x;
            cam_tf.translation.y += offset.y;
            handles.prev_shake_offset = offset;
        }
    }

    let Some(overlay_e) = handles.overlay else {
        return;
    };
    let cam_pos = q_cam_tf.get(cam_e).map(|tf| tf.translation.truncate()).ok();
    if let Ok((mut tf, mut sprite, mut vis)) = q_overlay.get_mut(overlay_e) {
        if let Some(pos) = cam_pos {
            tf.translation.x = pos.x;
            tf.translation.y = pos.y;
        }

        if fx.flash.get() > 0.001 {
            *vis = Visibility::Visible;
            let mut c = fx.flash_color.to_srgba();
            c.alpha = (fx.flash.get() * 0.6).clamp(0.0, 0.6);
            sprite.color = c.into();
        } else {
            *vis = Visibility::Hidden;
        }
    }
}
