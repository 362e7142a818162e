//! Experience and levels.
//!
//! `GainExperience` is consumed here only. Each level gained heals the player and queues
//! one upgrade choice in [`PendingLevelUps`]; the upgrade menu drains the queue.
//!
//! Gains are applied for the whole run, not only while `Running`: orbs collected in the
//! frame that opens the menu must still count after the choice is made.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::messages::{GainExperience, HealPlayer};
use crate::common::state::{GameState, RunPhase};
use crate::common::tunables::Tunables;
use crate::plugins::player::{Player, PlayerStats};

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Experience {
    pub level: u32,
    pub current: f32,
    pub to_next: f32,
}

impl Experience {
    pub fn new(to_first_level: f32) -> Self {
        Self {
            level: 1,
            current: 0.0,
            to_next: to_first_level.max(1.0),
        }
    }

    /// Add experience, levelling up as many times as it covers. Returns levels gained.
    pub fn gain(&mut self, amount: f32, growth: f32) -> u32 {
        if amount <= 0.0 || !amount.is_finite() {
            return 0;
        }
        self.current += amount;

        let mut gained = 0;
        while self.current >= self.to_next {
            self.current -= self.to_next;
            self.level += 1;
            self.to_next *= growth.max(1.0);
            gained += 1;
        }
        gained
    }

    /// Fill of the experience bar in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        (self.current / self.to_next).clamp(0.0, 1.0)
    }
}

/// Upgrade choices owed to the player.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingLevelUps(pub u32);

pub fn plugin(app: &mut App) {
    app.init_resource::<PendingLevelUps>()
        .add_systems(OnEnter(GameState::InGame), reset_pending)
        .add_systems(
            Update,
            apply_experience
                .after(crate::plugins::pickups::move_orbs)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            Update,
            open_upgrade_menu
                .after(apply_experience)
                .run_if(in_state(RunPhase::Running)),
        );
}

fn reset_pending(mut pending: ResMut<PendingLevelUps>) {
    pending.0 = 0;
}

pub fn apply_experience(
    mut reader: MessageReader<GainExperience>,
    tunables: Res<Tunables>,
    mut pending: ResMut<PendingLevelUps>,
    mut heals: MessageWriter<HealPlayer>,
    mut q_player: Query<(&mut Experience, &PlayerStats), With<Player>>,
) {
    let Ok((mut xp, stats)) = q_player.single_mut() else {
        reader.clear();
        return;
    };

    for gain in reader.read() {
        let levels = xp.gain(gain.amount, tunables.experience_growth);
        if levels == 0 {
            continue;
        }
        info!("Level up: now level {}", xp.level);
        pending.0 += levels;

        let heal = stats.max_health / tunables.level_up_heal_divisor.max(1);
        heals.write_batch((0..levels).map(|_| HealPlayer { amount: heal }));
    }
}

pub fn open_upgrade_menu(pending: Res<PendingLevelUps>, mut next_phase: ResMut<NextState<RunPhase>>) {
    if pending.0 > 0 {
        next_phase.set(RunPhase::LevelUp);
    }
}
