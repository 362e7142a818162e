//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource, turn the sprite toward movement
//! - FixedUpdate: apply velocity to kinematic rigid body, then trim it at the arena walls
//! - Update: consume DamagePlayer / HealPlayer messages (single writer of health), after
//!   every system that writes them
//!
//! The player's weapons and passive items live in [`Loadout`]. Derived stats (move speed,
//! max health) are recomputed from base values whenever the loadout changes, never
//! accumulated.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::messages::{DamagePlayer, HealPlayer};
use crate::common::{layers::Layer, state::GameState, state::RunPhase, tunables::Tunables};
use crate::plugins::fx::GlobalFx;
use crate::plugins::passives::{PassiveId, PassiveItem};
use crate::plugins::progression::Experience;
use crate::plugins::weapons::{StartingWeapon, Weapon, WeaponId};
use crate::plugins::world::Arena;

const PLAYER_RADIUS_METERS: f32 = 0.4;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Gameplay numbers of the player. Speeds in m/s.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub base_move_speed: f32,
    pub move_speed: f32,
    pub base_max_health: i32,
    pub max_health: i32,
    pub health: i32,
}

impl PlayerStats {
    pub fn new(move_speed: f32, max_health: i32) -> Self {
        Self {
            base_move_speed: move_speed,
            move_speed,
            base_max_health: max_health,
            max_health,
            health: max_health,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    #[inline]
    pub fn health_ratio(&self) -> f32 {
        (self.health as f32 / self.max_health.max(1) as f32).clamp(0.0, 1.0)
    }

    /// Returns `true` when this damage killed the player.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health -= amount;
        self.is_dead()
    }

    pub fn heal(&mut self, amount: i32) {
        if self.is_dead() {
            return;
        }
        self.health = (self.health + amount.max(0)).min(self.max_health);
    }

    /// Rebuild derived stats from base values plus passive bonuses.
    ///
    /// A max-health increase also raises current health by the same amount.
    pub fn recompute(&mut self, loadout: &Loadout) {
        self.move_speed = self.base_move_speed + loadout.speed_bonus();

        let new_max = self.base_max_health + loadout.health_bonus().round() as i32;
        if new_max > self.max_health && !self.is_dead() {
            self.health += new_max - self.max_health;
        }
        self.max_health = new_max;
        self.health = self.health.min(self.max_health);
    }
}

/// Last non-zero movement direction (unit length). Melee weapons swing this way.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec2::Y)
    }
}

/// Weapons and passive items the player owns. At most one of each kind.
#[derive(Component, Debug, Clone, Default)]
pub struct Loadout {
    pub weapons: Vec<Weapon>,
    pub passives: Vec<PassiveItem>,
}

impl Loadout {
    pub fn with_weapon(id: WeaponId) -> Self {
        let mut loadout = Self::default();
        loadout.add_weapon(id);
        loadout
    }

    pub fn has_weapon(&self, id: WeaponId) -> bool {
        self.weapons.iter().any(|w| w.id == id)
    }

    pub fn has_passive(&self, id: PassiveId) -> bool {
        self.passives.iter().any(|p| p.id == id)
    }

    pub fn weapon(&self, id: WeaponId) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn weapon_mut(&mut self, id: WeaponId) -> Option<&mut Weapon> {
        self.weapons.iter_mut().find(|w| w.id == id)
    }

    pub fn passive(&self, id: PassiveId) -> Option<&PassiveItem> {
        self.passives.iter().find(|p| p.id == id)
    }

    pub fn passive_mut(&mut self, id: PassiveId) -> Option<&mut PassiveItem> {
        self.passives.iter_mut().find(|p| p.id == id)
    }

    /// Returns `false` if the weapon is already owned.
    pub fn add_weapon(&mut self, id: WeaponId) -> bool {
        if self.has_weapon(id) {
            return false;
        }
        self.weapons.push(Weapon::new(id));
        true
    }

    /// Returns `false` if the item is already owned.
    pub fn add_passive(&mut self, id: PassiveId) -> bool {
        if self.has_passive(id) {
            return false;
        }
        self.passives.push(PassiveItem::new(id));
        true
    }

    pub fn speed_bonus(&self) -> f32 {
        self.passives.iter().map(PassiveItem::speed_bonus).sum()
    }

    pub fn health_bonus(&self) -> f32 {
        self.passives.iter().map(PassiveItem::health_bonus).sum()
    }

    /// Largest magnet radius among owned items, in meters.
    pub fn pickup_radius(&self) -> Option<f32> {
        self.passives
            .iter()
            .filter_map(PassiveItem::pickup_radius)
            .reduce(f32::max)
    }
}

#[derive(Resource, Default, Debug)]
pub(crate) struct PlayerInput {
    pub(crate) move_axis: Vec2,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(
            Update,
            (gather_input, face_movement.after(gather_input)).run_if(in_state(RunPhase::Running)),
        )
        .add_systems(
            Update,
            apply_player_damage
                .after(crate::plugins::enemies::enemy_contact_attacks)
                .run_if(in_state(RunPhase::Running)),
        )
        .add_systems(
            Update,
            apply_player_heal
                .after(crate::plugins::progression::apply_experience)
                .after(crate::plugins::pickups::collect_heal_pickups)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            (apply_movement, confine_to_arena.after(apply_movement)).run_if(in_state(RunPhase::Running)),
        )
        .add_systems(OnExit(RunPhase::Running), clear_input);
}

pub(crate) fn spawn(
    mut commands: Commands,
    tunables: Res<Tunables>,
    starting_weapon: Option<Res<StartingWeapon>>,
) {
    let layers = CollisionLayers::new(Layer::Player, [Layer::World, Layer::Enemy]);
    let radius = tunables.px(PLAYER_RADIUS_METERS);
    let weapon = starting_weapon.map(|w| w.0).unwrap_or(WeaponId::MagicWand);

    commands.spawn((
        Name::new("Player"),
        Player,
        PlayerStats::new(tunables.player_move_speed, tunables.player_max_health),
        Experience::new(tunables.experience_to_first_level),
        Loadout::with_weapon(weapon),
        Facing::default(),
        Sprite {
            color: Color::srgb(0.85, 0.8, 0.55),
            custom_size: Some(Vec2::splat(radius * 2.0)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 2.0),
        RigidBody::Kinematic,
        Collider::circle(radius),
        layers,
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));
    info!("Player spawned with {}", weapon.name());
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };
    let mut axis = Vec2::ZERO;

    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axis.y += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axis.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis.x -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
}

fn clear_input(mut input: ResMut<PlayerInput>) {
    input.move_axis = Vec2::ZERO;
}

/// Remember the facing direction and ease the sprite toward it.
fn face_movement(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut Facing, &mut Transform), With<Player>>,
) {
    let Ok((mut facing, mut tf)) = q_player.single_mut() else {
        return;
    };
    if input.move_axis == Vec2::ZERO {
        return;
    }
    facing.0 = input.move_axis;

    // Sprite "up" points along the movement direction.
    let target = Quat::from_rotation_z(input.move_axis.to_angle() - std::f32::consts::FRAC_PI_2);
    let t = (tunables.player_rotation_speed * time.delta_secs()).clamp(0.0, 1.0);
    tf.rotation = tf.rotation.slerp(target, t);
}

fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&PlayerStats, &mut LinearVelocity), With<Player>>,
) {
    let Ok((stats, mut vel)) = q_player.single_mut() else {
        return;
    };
    vel.0 = if stats.is_dead() {
        Vec2::ZERO
    } else {
        input.move_axis * tunables.px(stats.move_speed)
    };
}

/// Kinematic bodies are not stopped by the walls: cut the velocity so the next step ends
/// inside the arena.
fn confine_to_arena(
    time: Res<Time>,
    tunables: Res<Tunables>,
    arena: Option<Res<Arena>>,
    mut q_player: Query<(&Transform, &mut LinearVelocity), With<Player>>,
) {
    let (Some(arena), Ok((tf, mut vel))) = (arena, q_player.single_mut()) else {
        return;
    };
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    let pos = tf.translation.truncate();
    let next = arena.confine(pos + vel.0 * dt, tunables.px(PLAYER_RADIUS_METERS));
    vel.0 = (next - pos) / dt;
}

fn apply_player_damage(
    mut reader: MessageReader<DamagePlayer>,
    mut fx: Option<ResMut<GlobalFx>>,
    mut next_phase: ResMut<NextState<RunPhase>>,
    mut q_player: Query<(&mut PlayerStats, &mut LinearVelocity), With<Player>>,
) {
    let Ok((mut stats, mut vel)) = q_player.single_mut() else {
        reader.clear();
        return;
    };

    for hit in reader.read() {
        let died = stats.take_damage(hit.amount);
        if let Some(fx) = fx.as_deref_mut() {
            fx.trigger_player_hurt();
        }
        if died {
            vel.0 = Vec2::ZERO;
            info!("Player died");
            next_phase.set(RunPhase::GameOver);
            break;
        }
    }
    reader.clear();
}

fn apply_player_heal(mut reader: MessageReader<HealPlayer>, mut q_player: Query<&mut PlayerStats, With<Player>>) {
    let Ok(mut stats) = q_player.single_mut() else {
        reader.clear();
        return;
    };
    for heal in reader.read() {
        stats.heal(heal.amount);
    }
}

#[cfg(test)]
mod tests;
