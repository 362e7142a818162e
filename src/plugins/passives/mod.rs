//! Passive items: stat bonuses that grow with item level.
//!
//! Bonus at level `L` is `base + (L - 1) * per_level`. The player's derived stats are
//! rebuilt from the whole loadout (see `PlayerStats::recompute`), so levelling an item
//! never double-counts.
//!
//! The magnet ring is the only item with behaviour: it pulls nearby experience orbs in.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::state::RunPhase;
use crate::common::tunables::Tunables;
use crate::plugins::pickups::ExperienceOrb;
use crate::plugins::player::{Loadout, Player};

pub const DEFAULT_MAX_LEVEL: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassiveId {
    SpeedAmulet,
    HealthBrooch,
    MagnetRing,
}

impl PassiveId {
    pub const ALL: [PassiveId; 3] = [PassiveId::SpeedAmulet, PassiveId::HealthBrooch, PassiveId::MagnetRing];

    pub fn name(self) -> &'static str {
        match self {
            Self::SpeedAmulet => "Speed Amulet",
            Self::HealthBrooch => "Health Brooch",
            Self::MagnetRing => "Magnet Ring",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SpeedAmulet => "Move faster.",
            Self::HealthBrooch => "Raises maximum health.",
            Self::MagnetRing => "Pulls experience orbs toward you from further away.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PassiveItem {
    pub id: PassiveId,
    pub level: u32,
    pub max_level: u32,
    pub base_speed_bonus: f32,
    pub speed_bonus_per_level: f32,
    pub base_health_bonus: f32,
    pub health_bonus_per_level: f32,
    /// Meters; only the magnet ring has one.
    pub base_pickup_radius: Option<f32>,
    pub pickup_radius_per_level: f32,
}

impl PassiveItem {
    pub fn new(id: PassiveId) -> Self {
        let blank = Self {
            id,
            level: 1,
            max_level: DEFAULT_MAX_LEVEL,
            base_speed_bonus: 0.0,
            speed_bonus_per_level: 0.0,
            base_health_bonus: 0.0,
            health_bonus_per_level: 0.0,
            base_pickup_radius: None,
            pickup_radius_per_level: 0.0,
        };
        match id {
            PassiveId::SpeedAmulet => Self {
                base_speed_bonus: 0.5,
                speed_bonus_per_level: 0.3,
                ..blank
            },
            PassiveId::HealthBrooch => Self {
                base_health_bonus: 10.0,
                health_bonus_per_level: 7.0,
                ..blank
            },
            PassiveId::MagnetRing => Self {
                base_pickup_radius: Some(2.0),
                pickup_radius_per_level: 0.5,
                ..blank
            },
        }
    }

    #[inline]
    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }

    #[inline]
    fn steps(level: u32) -> f32 {
        level.saturating_sub(1) as f32
    }

    pub fn speed_bonus_at(&self, level: u32) -> f32 {
        self.base_speed_bonus + Self::steps(level) * self.speed_bonus_per_level
    }

    pub fn health_bonus_at(&self, level: u32) -> f32 {
        self.base_health_bonus + Self::steps(level) * self.health_bonus_per_level
    }

    pub fn pickup_radius_at(&self, level: u32) -> Option<f32> {
        self.base_pickup_radius
            .map(|r| r + Self::steps(level) * self.pickup_radius_per_level)
    }

    pub fn speed_bonus(&self) -> f32 {
        self.speed_bonus_at(self.level)
    }

    pub fn health_bonus(&self) -> f32 {
        self.health_bonus_at(self.level)
    }

    pub fn pickup_radius(&self) -> Option<f32> {
        self.pickup_radius_at(self.level)
    }

    /// Returns `false` (and changes nothing) at max level.
    pub fn level_up(&mut self) -> bool {
        if self.is_max_level() {
            return false;
        }
        self.level += 1;
        true
    }

    pub fn upgrade_description(&self) -> String {
        if self.is_max_level() {
            return "Max level reached".to_string();
        }
        let next = self.level + 1;
        let mut lines = vec![format!("Upgrade {} to level {next}:", self.id.name())];
        if self.speed_bonus_per_level > 0.0 {
            lines.push(format!(
                "- Speed bonus: {:.1} -> {:.1}",
                self.speed_bonus(),
                self.speed_bonus_at(next)
            ));
        }
        if self.health_bonus_per_level > 0.0 {
            lines.push(format!(
                "- Health bonus: {:.0} -> {:.0}",
                self.health_bonus(),
                self.health_bonus_at(next)
            ));
        }
        if let (Some(now), Some(then)) = (self.pickup_radius(), self.pickup_radius_at(next)) {
            lines.push(format!("- Pickup radius: {now:.1} -> {then:.1}"));
        }
        lines.join("\n")
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        magnet_pull
            .before(crate::plugins::pickups::move_orbs)
            .run_if(in_state(RunPhase::Running)),
    );
}

/// Magnet ring: orbs inside the pickup radius start homing and get an extra pull.
pub fn magnet_pull(
    time: Res<Time>,
    tunables: Res<Tunables>,
    q_player: Query<(&Transform, &Loadout), (With<Player>, Without<ExperienceOrb>)>,
    mut q_orbs: Query<(&mut Transform, &mut ExperienceOrb), Without<Player>>,
) {
    let Ok((player_tf, loadout)) = q_player.single() else {
        return;
    };
    let Some(radius) = loadout.pickup_radius() else {
        return;
    };
    let target = player_tf.translation.truncate();
    let radius_px = tunables.px(radius);
    let step = tunables.px(tunables.magnet_pull_speed) * time.delta_secs();

    for (mut tf, mut orb) in &mut q_orbs {
        let pos = tf.translation.truncate();
        if pos.distance(target) > radius_px {
            continue;
        }
        orb.attracted = true;
        let moved = pos.move_towards(target, step);
        tf.translation.x = moved.x;
        tf.translation.y = moved.y;
    }
}

#[cfg(test)]
mod tests;
