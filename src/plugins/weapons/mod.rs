//! Weapons plugin: auto-firing weapons owned by the player's `Loadout`.
//!
//! Weapons are plain data inside the loadout, not entities. Every frame each weapon
//! counts down its cooldown; when it fires, the attack is resolved against a snapshot of
//! live enemies and turned into messages:
//!
//! ```text
//! Update (Running)
//!   fire_weapons
//!     - reads: Player Transform + Facing, Enemy Transforms
//!     - mutates: Loadout weapon cooldowns
//!     - writes: DamageEnemy (melee / area), SpawnProjectileRequest (projectile)
//! ```
//!
//! Range checks are plain distance tests over the snapshot; enemy counts are small and it
//! keeps attack resolution deterministic under a seeded RNG.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::messages::DamageEnemy;
use crate::common::rng::GameRng;
use crate::common::state::RunPhase;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::{Enemy, EnemyLifeState};
use crate::plugins::player::{Facing, Loadout, Player};
use crate::plugins::projectiles::messages::SpawnProjectileRequest;

pub const DEFAULT_MAX_LEVEL: u32 = 5;
/// Projectiles leave the player this far ahead of its centre (meters).
const MUZZLE_OFFSET: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponId {
    Sword,
    MagicWand,
    FireBomb,
}

impl WeaponId {
    pub const ALL: [WeaponId; 3] = [WeaponId::Sword, WeaponId::MagicWand, WeaponId::FireBomb];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sword => "Sword",
            Self::MagicWand => "Magic Wand",
            Self::FireBomb => "Fire Bomb",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Sword => "Slashes every enemy in a wide arc in front of you.",
            Self::MagicWand => "Fires a bolt at the nearest enemy.",
            Self::FireBomb => "Blows up around a random enemy, hurting everything nearby.",
        }
    }

    fn base_stats(self) -> WeaponStats {
        match self {
            Self::Sword => WeaponStats { damage: 12, attack_speed: 1.2, attack_range: 2.5 },
            Self::MagicWand => WeaponStats { damage: 10, attack_speed: 1.0, attack_range: 8.0 },
            Self::FireBomb => WeaponStats { damage: 8, attack_speed: 0.5, attack_range: 7.0 },
        }
    }

    fn behaviour(self) -> WeaponBehaviour {
        match self {
            Self::Sword => WeaponBehaviour::Melee { arc_degrees: 90.0 },
            Self::MagicWand => WeaponBehaviour::Projectile {
                speed: 10.0,
                per_attack: 1,
                spread_degrees: 15.0,
            },
            Self::FireBomb => WeaponBehaviour::Area { explosion_radius: 3.0 },
        }
    }
}

/// Weapon used when a run starts.
#[derive(Resource, Debug, Clone, Copy)]
pub struct StartingWeapon(pub WeaponId);

impl Default for StartingWeapon {
    fn default() -> Self {
        Self(WeaponId::MagicWand)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeaponBehaviour {
    /// Hit every enemy in range within `arc_degrees` of the facing direction.
    Melee { arc_degrees: f32 },
    /// Fire at the nearest enemy in range. Speed in m/s.
    Projectile { speed: f32, per_attack: u32, spread_degrees: f32 },
    /// Explode on a random enemy in range.
    Area { explosion_radius: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponStats {
    pub damage: i32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Meters.
    pub attack_range: f32,
}

/// Fractional gain per level above 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelScaling {
    pub damage: f32,
    pub attack_speed: f32,
    pub attack_range: f32,
}

impl Default for LevelScaling {
    fn default() -> Self {
        Self { damage: 0.2, attack_speed: 0.1, attack_range: 0.1 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    pub id: WeaponId,
    pub behaviour: WeaponBehaviour,
    pub base: WeaponStats,
    pub stats: WeaponStats,
    pub scaling: LevelScaling,
    pub level: u32,
    pub max_level: u32,
    cooldown: f32,
}

impl Weapon {
    pub fn new(id: WeaponId) -> Self {
        let base = id.base_stats();
        Self {
            id,
            behaviour: id.behaviour(),
            base,
            stats: base,
            scaling: LevelScaling::default(),
            level: 1,
            max_level: DEFAULT_MAX_LEVEL,
            cooldown: 0.0,
        }
    }

    #[inline]
    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }

    /// Stats this weapon has at `level`, derived from its base stats.
    pub fn stats_at(&self, level: u32) -> WeaponStats {
        let steps = level.saturating_sub(1) as f32;
        WeaponStats {
            damage: (self.base.damage as f32 * (1.0 + steps * self.scaling.damage)).round() as i32,
            attack_speed: self.base.attack_speed * (1.0 + steps * self.scaling.attack_speed),
            attack_range: self.base.attack_range * (1.0 + steps * self.scaling.attack_range),
        }
    }

    /// Returns `false` (and changes nothing) at max level.
    pub fn level_up(&mut self) -> bool {
        if self.is_max_level() {
            return false;
        }
        self.level += 1;
        self.stats = self.stats_at(self.level);
        true
    }

    pub fn upgrade_description(&self) -> String {
        if self.is_max_level() {
            return "Max level reached".to_string();
        }
        let next = self.stats_at(self.level + 1);
        format!(
            "Upgrade {} to level {}:\n\
             - Damage: {} -> {}\n\
             - Attack speed: {:.1} -> {:.1}\n\
             - Range: {:.1} -> {:.1}",
            self.id.name(),
            self.level + 1,
            self.stats.damage,
            next.damage,
            self.stats.attack_speed,
            next.attack_speed,
            self.stats.attack_range,
            next.attack_range,
        )
    }

    /// Advance the cooldown. Returns `true` when the weapon fires this frame.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return false;
        }
        self.cooldown = 1.0 / self.stats.attack_speed.max(f32::EPSILON);
        true
    }
}

/// A live enemy as seen by weapons (pixel space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub entity: Entity,
    pub pos: Vec2,
}

/// A projectile a weapon wants fired (pixel space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: f32,
}

#[derive(Debug, Default, PartialEq)]
pub struct AttackOutcome {
    pub hits: Vec<Entity>,
    pub shots: Vec<Shot>,
}

pub fn targets_in_range(origin: Vec2, range: f32, targets: &[Target]) -> Vec<Target> {
    let r2 = range * range;
    targets
        .iter()
        .copied()
        .filter(|t| t.pos.distance_squared(origin) <= r2)
        .collect()
}

pub fn nearest(origin: Vec2, targets: &[Target]) -> Option<Target> {
    targets
        .iter()
        .copied()
        .min_by(|a, b| a.pos.distance_squared(origin).total_cmp(&b.pos.distance_squared(origin)))
}

/// Whether `pos` lies within `arc_degrees` (total) of `facing`, seen from `origin`.
pub fn within_arc(origin: Vec2, facing: Vec2, pos: Vec2, arc_degrees: f32) -> bool {
    let to_target = (pos - origin).normalize_or_zero();
    if to_target == Vec2::ZERO {
        // Standing on top of the player always counts.
        return true;
    }
    let cos = facing.normalize_or_zero().dot(to_target).clamp(-1.0, 1.0);
    cos.acos().to_degrees() <= arc_degrees * 0.5
}

/// Rotate `dir` by `degrees` counter-clockwise.
#[inline]
pub fn rotate_degrees(dir: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(dir)
}

/// Resolve one attack of `weapon`. Distances in `targets` and `origin` are pixels.
pub fn resolve_attack(
    weapon: &Weapon,
    origin: Vec2,
    facing: Vec2,
    targets: &[Target],
    tunables: &Tunables,
    rng: &mut GameRng,
) -> AttackOutcome {
    let range = tunables.px(weapon.stats.attack_range);
    let in_range = targets_in_range(origin, range, targets);
    let mut out = AttackOutcome::default();
    if in_range.is_empty() {
        return out;
    }

    match weapon.behaviour {
        WeaponBehaviour::Melee { arc_degrees } => {
            out.hits = in_range
                .iter()
                .filter(|t| within_arc(origin, facing, t.pos, arc_degrees))
                .map(|t| t.entity)
                .collect();
        }
        WeaponBehaviour::Projectile { speed, per_attack, spread_degrees } => {
            let Some(target) = nearest(origin, &in_range) else {
                return out;
            };
            let aim = (target.pos - origin).normalize_or(facing);
            let lifetime = weapon.stats.attack_range / speed.max(f32::EPSILON);
            out.shots = (0..per_attack)
                .map(|_| {
                    let dir = rotate_degrees(aim, rng.range(-spread_degrees, spread_degrees));
                    Shot {
                        pos: origin + dir * tunables.px(MUZZLE_OFFSET),
                        vel: dir * tunables.px(speed),
                        lifetime,
                    }
                })
                .collect();
        }
        WeaponBehaviour::Area { explosion_radius } => {
            let Some(i) = rng.index(in_range.len()) else {
                return out;
            };
            let centre = in_range[i].pos;
            out.hits = targets_in_range(centre, tunables.px(explosion_radius), targets)
                .into_iter()
                .map(|t| t.entity)
                .collect();
        }
    }
    out
}

pub fn plugin(app: &mut App) {
    app.init_resource::<StartingWeapon>();
    app.add_systems(Update, fire_weapons.run_if(in_state(RunPhase::Running)));
}

pub fn fire_weapons(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut q_player: Query<(&Transform, &Facing, &mut Loadout), With<Player>>,
    q_enemies: Query<(Entity, &Transform, &EnemyLifeState), With<Enemy>>,
    mut damage: MessageWriter<DamageEnemy>,
    mut shots: MessageWriter<SpawnProjectileRequest>,
) {
    let Ok((player_tf, facing, mut loadout)) = q_player.single_mut() else {
        return;
    };
    let dt = time.delta_secs();
    let origin = player_tf.translation.truncate();

    let targets: Vec<Target> = q_enemies
        .iter()
        .filter(|(_, _, life)| life.is_alive())
        .map(|(entity, tf, _)| Target { entity, pos: tf.translation.truncate() })
        .collect();

    for weapon in loadout.weapons.iter_mut() {
        if !weapon.tick(dt) {
            continue;
        }
        let outcome = resolve_attack(weapon, origin, facing.0, &targets, &tunables, &mut rng);
        let amount = weapon.stats.damage;
        damage.write_batch(outcome.hits.into_iter().map(|target| DamageEnemy { target, amount }));
        shots.write_batch(outcome.shots.into_iter().map(|s| SpawnProjectileRequest {
            pos: s.pos,
            vel: s.vel,
            damage: amount,
            lifetime: s.lifetime,
        }));
    }
}
