//! Enemies: chase the player, hurt on contact, die with a short shrink-and-fade.
//!
//! Schedules:
//! - FixedUpdate: steer toward the player (velocity = chase + knockback)
//! - Update: tick attack and flash timers, contact attacks, consume `DamageEnemy`,
//!   animate dying enemies
//! - PostUpdate: despawn enemies marked `PendingDespawn`
//!
//! `apply_enemy_damage` is the only writer of enemy `Health` and the only producer of
//! `EnemyKilled`. An enemy leaves `Alive` exactly once, so the kill is reported once.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::Occluder2d;
use serde::{Deserialize, Serialize};

use crate::common::layers::Layer;
use crate::common::messages::{DamageEnemy, DamagePlayer, EnemyKilled};
use crate::common::state::{GameState, RunPhase};
use crate::common::tunables::Tunables;
use crate::plugins::fx::{GlobalFx, UnitF32};
use crate::plugins::pickups::DropItem;
use crate::plugins::player::Player;

/// How long an enemy stands still after landing a hit.
const ATTACK_RECOVER_SECS: f32 = 0.5;
const DYING_SECS: f32 = 0.35;
/// Knockback velocity decay rate (1/s).
const KNOCKBACK_DECAY: f32 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Bat,
    Skeleton,
    Ghoul,
    Reaper,
}

/// Per-kind numbers. Speeds in m/s, times in seconds.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct EnemyStats {
    pub name: &'static str,
    pub max_health: i32,
    pub damage: i32,
    pub move_speed: f32,
    pub attack_cooldown: f32,
    pub experience_value: f32,
    pub drop_chance: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            name: "Enemy",
            max_health: 20,
            damage: 5,
            move_speed: 2.0,
            attack_cooldown: 1.0,
            experience_value: 10.0,
            drop_chance: 0.1,
        }
    }
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [EnemyKind::Bat, EnemyKind::Skeleton, EnemyKind::Ghoul, EnemyKind::Reaper];

    pub fn stats(self) -> EnemyStats {
        match self {
            Self::Bat => EnemyStats {
                name: "Bat",
                max_health: 10,
                damage: 3,
                move_speed: 3.0,
                attack_cooldown: 0.8,
                experience_value: 2.0,
                drop_chance: 0.05,
            },
            Self::Skeleton => EnemyStats {
                name: "Skeleton",
                experience_value: 5.0,
                ..default()
            },
            Self::Ghoul => EnemyStats {
                name: "Ghoul",
                max_health: 45,
                damage: 8,
                move_speed: 1.5,
                attack_cooldown: 1.2,
                experience_value: 10.0,
                drop_chance: 0.15,
            },
            Self::Reaper => EnemyStats {
                name: "Reaper",
                max_health: 600,
                damage: 20,
                move_speed: 1.8,
                attack_cooldown: 1.0,
                experience_value: 100.0,
                drop_chance: 1.0,
            },
        }
    }

    #[inline]
    pub fn is_boss(self) -> bool {
        matches!(self, Self::Reaper)
    }

    /// Collider radius in meters.
    pub fn radius(self) -> f32 {
        match self {
            Self::Bat => 0.3,
            Self::Skeleton => 0.4,
            Self::Ghoul => 0.5,
            Self::Reaper => 1.0,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Bat => Color::srgb(0.55, 0.35, 0.7),
            Self::Skeleton => Color::srgb(0.85, 0.85, 0.78),
            Self::Ghoul => Color::srgb(0.35, 0.6, 0.3),
            Self::Reaper => Color::srgb(0.3, 0.05, 0.1),
        }
    }

    /// What may drop (besides the experience orb) when this kind dies.
    pub fn drop_table(self) -> &'static [DropItem] {
        match self {
            Self::Bat | Self::Skeleton => &[DropItem::SmallHeal],
            Self::Ghoul => &[DropItem::SmallHeal, DropItem::LargeHeal],
            Self::Reaper => &[DropItem::LargeHeal],
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }
}

/// `timer` counts down the attack cooldown; while `recover > 0` the enemy stands still.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyAttack {
    pub timer: f32,
    pub recover: f32,
}

/// Extra velocity in px/s from being hit. Decays toward zero.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Knockback(pub Vec2);

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HitFlash(pub(crate) UnitF32);

#[derive(Component, Debug, Clone)]
pub enum EnemyLifeState {
    Alive,
    Dying { timer: Timer },
    Dead,
}

impl EnemyLifeState {
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Despawned in `PostUpdate`, outside the physics step.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, chase_player.run_if(in_state(RunPhase::Running)))
        .add_systems(
            Update,
            (
                tick_enemy_timers,
                enemy_contact_attacks.after(tick_enemy_timers),
                apply_enemy_damage
                    .after(enemy_contact_attacks)
                    .after(crate::plugins::weapons::fire_weapons),
                enemy_death_progress.after(apply_enemy_damage),
            )
                .run_if(in_state(RunPhase::Running)),
        )
        .add_systems(
            PostUpdate,
            despawn_marked_enemies.run_if(in_state(GameState::InGame)),
        );
}

#[inline]
fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::World, Layer::Player, Layer::Enemy, Layer::PlayerProjectile],
    )
}

/// Membership stays `Enemy`, filters are cleared: the corpse touches nothing.
#[inline]
fn non_interacting_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [] as [Layer; 0])
}

/// Spawn one enemy of `kind` at `pos` (pixels).
pub fn spawn_enemy(commands: &mut Commands, tunables: &Tunables, kind: EnemyKind, pos: Vec2) -> Entity {
    let stats = kind.stats();
    let radius = tunables.px(kind.radius());

    let e = commands
        .spawn((
            Name::new(stats.name),
            Enemy { kind },
            Health::new(stats.max_health),
            stats,
            EnemyAttack::default(),
            Knockback::default(),
            HitFlash::default(),
            EnemyLifeState::Alive,
            Sprite {
                color: kind.color(),
                custom_size: Some(Vec2::splat(radius * 2.0)),
                ..default()
            },
            Transform::from_xyz(pos.x, pos.y, 1.0),
            DespawnOnExit(GameState::InGame),
        ))
        .insert((
            RigidBody::Dynamic,
            Collider::circle(radius),
            LockedAxes::ROTATION_LOCKED,
            enemy_layers(),
            LinearVelocity::ZERO,
            CollidingEntities::default(),
            Occluder2d::circle(radius),
        ))
        .id();

    if kind.is_boss() {
        info!("Boss {} spawned", kind.stats().name);
    }
    e
}

fn chase_player(
    tunables: Res<Tunables>,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<
        (&Transform, &EnemyStats, &EnemyAttack, &Knockback, &EnemyLifeState, &mut LinearVelocity, &mut Sprite),
        With<Enemy>,
    >,
) {
    let target = q_player.single().ok().map(|tf| tf.translation.truncate());

    for (tf, stats, attack, knockback, life, mut vel, mut sprite) in &mut q {
        if !life.is_alive() {
            vel.0 = Vec2::ZERO;
            continue;
        }
        let Some(target) = target else {
            vel.0 = knockback.0;
            continue;
        };

        let to_player = target - tf.translation.truncate();
        let chase = if attack.recover > 0.0 {
            Vec2::ZERO
        } else {
            to_player.normalize_or_zero() * tunables.px(stats.move_speed)
        };
        vel.0 = chase + knockback.0;
        sprite.flip_x = to_player.x < 0.0;
    }
}

/// Cooldowns, recovery, knockback decay and hit-flash tint.
fn tick_enemy_timers(
    time: Res<Time>,
    mut q: Query<(&Enemy, &EnemyLifeState, &mut EnemyAttack, &mut Knockback, &mut HitFlash, &mut Sprite)>,
) {
    let dt = time.delta_secs();
    let decay = (-KNOCKBACK_DECAY * dt).exp();

    for (enemy, life, mut attack, mut knockback, mut flash, mut sprite) in &mut q {
        if !life.is_alive() {
            continue;
        }
        attack.timer = (attack.timer - dt).max(0.0);
        attack.recover = (attack.recover - dt).max(0.0);

        knockback.0 *= decay;
        if knockback.0.length_squared() < 1.0 {
            knockback.0 = Vec2::ZERO;
        }

        flash.0.decay_to_zero(6.0, dt);
        let base = enemy.kind.color().to_srgba();
        let f = flash.0.get();
        sprite.color = Color::srgb(
            base.red + (1.0 - base.red) * f,
            base.green + (1.0 - base.green) * f,
            base.blue + (1.0 - base.blue) * f,
        );
    }
}

/// Damage the player while touching them, once per cooldown.
pub fn enemy_contact_attacks(
    q_player: Query<Entity, With<Player>>,
    mut q: Query<(&EnemyStats, &EnemyLifeState, &CollidingEntities, &mut EnemyAttack, &mut LinearVelocity), With<Enemy>>,
    mut damage: MessageWriter<DamagePlayer>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };

    for (stats, life, touching, mut attack, mut vel) in &mut q {
        if !life.is_alive() || attack.timer > 0.0 || !touching.contains(&player) {
            continue;
        }
        attack.timer = stats.attack_cooldown;
        attack.recover = ATTACK_RECOVER_SECS;
        vel.0 = Vec2::ZERO;
        damage.write(DamagePlayer { amount: stats.damage });
    }
}

pub fn apply_enemy_damage(
    mut reader: MessageReader<DamageEnemy>,
    tunables: Res<Tunables>,
    mut fx: Option<ResMut<GlobalFx>>,
    mut killed: MessageWriter<EnemyKilled>,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<
        (
            &Enemy,
            &Transform,
            &mut Health,
            &mut EnemyLifeState,
            &mut Knockback,
            &mut HitFlash,
            &mut CollisionLayers,
            &mut LinearVelocity,
        ),
        Without<PendingDespawn>,
    >,
) {
    let player_pos = q_player.single().ok().map(|tf| tf.translation.truncate());

    for hit in reader.read() {
        let Ok((enemy, tf, mut health, mut life, mut knockback, mut flash, mut layers, mut vel)) =
            q.get_mut(hit.target)
        else {
            continue;
        };
        if !life.is_alive() {
            continue;
        }

        let pos = tf.translation.truncate();
        health.current -= hit.amount;
        flash.0 = UnitF32::new_clamped(1.0);
        if let Some(from) = player_pos {
            knockback.0 += (pos - from).normalize_or_zero() * tunables.px(tunables.knockback_impulse);
        }

        if health.current > 0 {
            continue;
        }

        *life = EnemyLifeState::Dying {
            timer: Timer::from_seconds(DYING_SECS, TimerMode::Once),
        };
        *layers = non_interacting_enemy_layers();
        knockback.0 = Vec2::ZERO;
        vel.0 = Vec2::ZERO;

        killed.write(EnemyKilled {
            enemy: hit.target,
            kind: enemy.kind,
            position: pos,
        });
        if enemy.kind.is_boss() {
            info!("Boss {} defeated", enemy.kind.stats().name);
            if let Some(fx) = fx.as_deref_mut() {
                fx.trigger_boss_down();
            }
        } else {
            debug!("{:?} killed", enemy.kind);
        }
    }
}

/// Shrink and fade, then mark for despawn.
fn enemy_death_progress(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut EnemyLifeState, &mut Sprite, &mut Transform), (With<Enemy>, Without<PendingDespawn>)>,
) {
    for (e, mut life, mut sprite, mut tf) in &mut q {
        let EnemyLifeState::Dying { timer } = &mut *life else {
            continue;
        };
        timer.tick(time.delta());

        let dur = timer.duration().as_secs_f32().max(0.0001);
        let t = (timer.elapsed_secs() / dur).clamp(0.0, 1.0);
        tf.scale = Vec3::splat(1.0 - t);
        let mut c = sprite.color.to_srgba();
        c.alpha = 1.0 - t;
        sprite.color = c.into();

        if timer.is_finished() {
            *life = EnemyLifeState::Dead;
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

fn despawn_marked_enemies(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
