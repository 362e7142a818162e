//! Pickups: experience orbs and heal drops left behind by dead enemies.
//!
//! Orbs are plain transforms, not physics bodies. Attraction and collection are distance
//! checks against the player. Collecting writes `GainExperience` / `HealPlayer`; the
//! progression and player plugins apply them.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use serde::{Deserialize, Serialize};

use crate::common::messages::{EnemyKilled, GainExperience, HealPlayer};
use crate::common::rng::GameRng;
use crate::common::state::{GameState, RunPhase};
use crate::common::tunables::Tunables;
use crate::plugins::player::Player;

const ORB_BASE_SIZE_METERS: f32 = 0.3;
const HEAL_SIZE_METERS: f32 = 0.4;
/// Fraction of the lifetime after which an orb starts blinking.
const BLINK_AFTER: f32 = 0.8;
const BLINK_RATE: f32 = 5.0;
/// Drift velocity decay rate (1/s).
const DRIFT_DECAY: f32 = 4.0;

/// Visual size class of an orb, picked from its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbTier {
    Small,
    Medium,
    Large,
}

impl OrbTier {
    pub fn from_value(value: f32) -> Self {
        if value <= 2.0 {
            Self::Small
        } else if value <= 5.0 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Small => Color::srgb(0.0, 1.0, 1.0),
            Self::Medium => Color::srgb(0.2, 0.35, 1.0),
            Self::Large => Color::srgb(1.0, 0.0, 1.0),
        }
    }

    pub fn scale(self) -> f32 {
        match self {
            Self::Small => 0.8,
            Self::Medium => 1.0,
            Self::Large => 1.2,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct ExperienceOrb {
    pub value: f32,
    /// Once set, the orb homes in on the player until collected.
    pub attracted: bool,
    /// Spawn impulse in px/s, decays to zero.
    pub drift: Vec2,
}

impl ExperienceOrb {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            attracted: false,
            drift: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn tier(&self) -> OrbTier {
        OrbTier::from_value(self.value)
    }
}

/// Uncollected orbs fade out and disappear when this finishes.
#[derive(Component, Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct OrbLifetime(pub Timer);

impl OrbLifetime {
    pub fn from_seconds(secs: f32) -> Self {
        Self(Timer::from_seconds(secs.max(0.0), TimerMode::Once))
    }
}

/// Extra drops an enemy kind can leave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropItem {
    SmallHeal,
    LargeHeal,
}

impl DropItem {
    pub fn heal_amount(self) -> i32 {
        match self {
            Self::SmallHeal => 15,
            Self::LargeHeal => 40,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealPickup {
    pub amount: i32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            spawn_kill_rewards,
            age_orbs,
            move_orbs.after(age_orbs),
            collect_heal_pickups,
        )
            .run_if(in_state(RunPhase::Running)),
    );
}

pub fn spawn_orb(commands: &mut Commands, tunables: &Tunables, value: f32, pos: Vec2, drift: Vec2) -> Entity {
    let orb = ExperienceOrb { drift, ..ExperienceOrb::new(value) };
    let tier = orb.tier();
    commands
        .spawn((
            Name::new("ExperienceOrb"),
            orb,
            OrbLifetime::from_seconds(tunables.orb_lifetime),
            Sprite {
                color: tier.color(),
                custom_size: Some(Vec2::splat(tunables.px(ORB_BASE_SIZE_METERS))),
                ..default()
            },
            Transform::from_xyz(pos.x, pos.y, 0.5).with_scale(Vec3::splat(tier.scale())),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

pub fn spawn_heal_pickup(commands: &mut Commands, tunables: &Tunables, item: DropItem, pos: Vec2) -> Entity {
    commands
        .spawn((
            Name::new("HealPickup"),
            HealPickup {
                amount: item.heal_amount(),
            },
            Sprite {
                color: Color::srgb(0.95, 0.3, 0.4),
                custom_size: Some(Vec2::splat(tunables.px(HEAL_SIZE_METERS))),
                ..default()
            },
            Transform::from_xyz(pos.x, pos.y, 0.5),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

/// Every kill leaves an orb worth the enemy's experience, and maybe a heal.
pub fn spawn_kill_rewards(
    mut commands: Commands,
    mut reader: MessageReader<EnemyKilled>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
) {
    for kill in reader.read() {
        let stats = kill.kind.stats();
        let drift = rng.unit_direction() * tunables.px(tunables.orb_drift_impulse);
        spawn_orb(&mut commands, &tunables, stats.experience_value, kill.position, drift);

        let table = kill.kind.drop_table();
        if !rng.chance(stats.drop_chance) {
            continue;
        }
        if let Some(i) = rng.index(table.len()) {
            spawn_heal_pickup(&mut commands, &tunables, table[i], kill.position);
        }
    }
}

/// Age orbs; blink near the end of their life and despawn when it runs out.
pub fn age_orbs(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut OrbLifetime, &mut Sprite), With<ExperienceOrb>>,
) {
    for (e, mut lifetime, mut sprite) in &mut q {
        lifetime.tick(time.delta());
        if lifetime.is_finished() {
            commands.entity(e).despawn();
            continue;
        }
        if lifetime.fraction() >= BLINK_AFTER {
            let mut c = sprite.color.to_srgba();
            c.alpha = ping_pong(lifetime.elapsed_secs() * BLINK_RATE, 1.0);
            sprite.color = c.into();
        }
    }
}

/// Triangle wave between 0 and `len`.
#[inline]
fn ping_pong(t: f32, len: f32) -> f32 {
    let m = t.rem_euclid(len * 2.0);
    len - (m - len).abs()
}

/// Drift, attraction and collection.
pub fn move_orbs(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut gains: MessageWriter<GainExperience>,
    q_player: Query<&Transform, (With<Player>, Without<ExperienceOrb>)>,
    mut q: Query<(Entity, &mut Transform, &mut ExperienceOrb), Without<Player>>,
) {
    let dt = time.delta_secs();
    let decay = (-DRIFT_DECAY * dt).exp();
    let target = q_player.single().ok().map(|tf| tf.translation.truncate());

    let attraction = tunables.px(tunables.orb_attraction_radius);
    let collect = tunables.px(tunables.orb_collect_radius);
    let step = tunables.px(tunables.orb_move_speed) * dt;

    for (e, mut tf, mut orb) in &mut q {
        let mut pos = tf.translation.truncate() + orb.drift * dt;
        orb.drift *= decay;

        if let Some(target) = target {
            let dist = pos.distance(target);
            if orb.attracted || dist <= attraction {
                orb.attracted = true;
                if dist <= collect {
                    gains.write(GainExperience { amount: orb.value });
                    commands.entity(e).despawn();
                    continue;
                }
                pos = pos.move_towards(target, step);
            }
        }

        tf.translation.x = pos.x;
        tf.translation.y = pos.y;
    }
}

pub fn collect_heal_pickups(
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut heals: MessageWriter<HealPlayer>,
    q_player: Query<&Transform, With<Player>>,
    q: Query<(Entity, &Transform, &HealPickup), Without<Player>>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let target = player_tf.translation.truncate();
    let reach = tunables.px(tunables.orb_collect_radius + HEAL_SIZE_METERS * 0.5);

    for (e, tf, pickup) in &q {
        if tf.translation.truncate().distance(target) <= reach {
            heals.write(HealPlayer { amount: pickup.amount });
            commands.entity(e).despawn();
        }
    }
}
