//! Level-up choices.
//!
//! Entering `RunPhase::LevelUp` rolls a hand of [`Upgrade`]s into [`UpgradeChoices`].
//! The UI answers with a [`ChooseUpgrade`] message; each answer consumes one pending
//! level-up. With more pending, a fresh hand is rolled; otherwise the run resumes.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::common::rng::GameRng;
use crate::common::state::RunPhase;
use crate::common::tunables::Tunables;
use crate::plugins::passives::{PassiveId, PassiveItem};
use crate::plugins::player::{Loadout, Player, PlayerStats};
use crate::plugins::progression::PendingLevelUps;
use crate::plugins::weapons::{Weapon, WeaponId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    WeaponLevelUp(WeaponId),
    PassiveLevelUp(PassiveId),
    NewWeapon(WeaponId),
    NewPassive(PassiveId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    pub title: String,
    pub description: String,
}

/// Items that can be offered as new.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct UpgradeCatalog {
    pub weapons: Vec<WeaponId>,
    pub passives: Vec<PassiveId>,
}

impl Default for UpgradeCatalog {
    fn default() -> Self {
        Self {
            weapons: WeaponId::ALL.to_vec(),
            passives: PassiveId::ALL.to_vec(),
        }
    }
}

/// The hand currently on offer.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct UpgradeChoices(pub Vec<Upgrade>);

/// The player's answer: an index into [`UpgradeChoices`], or `None` to skip.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChooseUpgrade(pub Option<usize>);

/// Every upgrade the loadout could take, in catalog order.
pub fn available_upgrades(loadout: &Loadout, catalog: &UpgradeCatalog) -> Vec<Upgrade> {
    let mut out = Vec::new();

    for w in loadout.weapons.iter().filter(|w| !w.is_max_level()) {
        out.push(Upgrade {
            kind: UpgradeKind::WeaponLevelUp(w.id),
            title: format!("Upgrade {}", w.id.name()),
            description: w.upgrade_description(),
        });
    }
    for p in loadout.passives.iter().filter(|p| !p.is_max_level()) {
        out.push(Upgrade {
            kind: UpgradeKind::PassiveLevelUp(p.id),
            title: format!("Upgrade {}", p.id.name()),
            description: p.upgrade_description(),
        });
    }
    for &id in catalog.weapons.iter().filter(|&&id| !loadout.has_weapon(id)) {
        out.push(Upgrade {
            kind: UpgradeKind::NewWeapon(id),
            title: format!("New weapon: {}", id.name()),
            description: id.description().to_string(),
        });
    }
    for &id in catalog.passives.iter().filter(|&&id| !loadout.has_passive(id)) {
        out.push(Upgrade {
            kind: UpgradeKind::NewPassive(id),
            title: format!("New item: {}", id.name()),
            description: id.description().to_string(),
        });
    }
    out
}

/// Shuffle everything available and keep the first `count`.
pub fn generate_options(loadout: &Loadout, catalog: &UpgradeCatalog, count: usize, rng: &mut GameRng) -> Vec<Upgrade> {
    let mut all = available_upgrades(loadout, catalog);
    all.shuffle(&mut rng.0);
    all.truncate(count);
    all
}

/// Apply one upgrade and rebuild derived stats. Returns `false` if nothing changed.
pub fn apply_upgrade(loadout: &mut Loadout, stats: &mut PlayerStats, kind: UpgradeKind) -> bool {
    let changed = match kind {
        UpgradeKind::WeaponLevelUp(id) => loadout.weapon_mut(id).is_some_and(Weapon::level_up),
        UpgradeKind::PassiveLevelUp(id) => loadout.passive_mut(id).is_some_and(PassiveItem::level_up),
        UpgradeKind::NewWeapon(id) => loadout.add_weapon(id),
        UpgradeKind::NewPassive(id) => loadout.add_passive(id),
    };
    if changed {
        stats.recompute(loadout);
    }
    changed
}

pub fn plugin(app: &mut App) {
    app.init_resource::<UpgradeCatalog>()
        .init_resource::<UpgradeChoices>()
        .add_message::<ChooseUpgrade>()
        .add_systems(OnEnter(RunPhase::LevelUp), roll_choices)
        .add_systems(OnExit(RunPhase::LevelUp), clear_choices)
        .add_systems(Update, resolve_choice.run_if(in_state(RunPhase::LevelUp)));
}

/// Fill `UpgradeChoices`; with nothing to offer, drop all pending level-ups and resume.
pub fn roll_choices(
    tunables: Res<Tunables>,
    catalog: Res<UpgradeCatalog>,
    mut rng: ResMut<GameRng>,
    mut choices: ResMut<UpgradeChoices>,
    mut pending: ResMut<PendingLevelUps>,
    mut next_phase: ResMut<NextState<RunPhase>>,
    q_player: Query<&Loadout, With<Player>>,
) {
    let options = q_player
        .single()
        .map(|loadout| generate_options(loadout, &catalog, tunables.upgrade_option_count, &mut rng))
        .unwrap_or_default();

    if options.is_empty() {
        debug!("No upgrades available, skipping {} level-up(s)", pending.0);
        pending.0 = 0;
        choices.0.clear();
        next_phase.set(RunPhase::Running);
        return;
    }
    choices.0 = options;
}

fn clear_choices(mut choices: ResMut<UpgradeChoices>) {
    choices.0.clear();
}

pub fn resolve_choice(
    mut reader: MessageReader<ChooseUpgrade>,
    tunables: Res<Tunables>,
    catalog: Res<UpgradeCatalog>,
    mut rng: ResMut<GameRng>,
    mut choices: ResMut<UpgradeChoices>,
    mut pending: ResMut<PendingLevelUps>,
    mut next_phase: ResMut<NextState<RunPhase>>,
    mut q_player: Query<(&mut Loadout, &mut PlayerStats), With<Player>>,
) {
    // One answer per frame; the hand changes after it.
    let Some(ChooseUpgrade(answer)) = reader.read().next().copied() else {
        return;
    };
    reader.clear();

    let Ok((mut loadout, mut stats)) = q_player.single_mut() else {
        pending.0 = 0;
        next_phase.set(RunPhase::Running);
        return;
    };

    if let Some(upgrade) = answer.and_then(|i| choices.0.get(i)) {
        if apply_upgrade(&mut loadout, &mut stats, upgrade.kind) {
            info!("Upgrade chosen: {}", upgrade.title);
        }
    }
    pending.0 = pending.0.saturating_sub(1);

    if pending.0 == 0 {
        next_phase.set(RunPhase::Running);
        return;
    }
    let options = generate_options(&loadout, &catalog, tunables.upgrade_option_count, &mut rng);
    if options.is_empty() {
        pending.0 = 0;
        next_phase.set(RunPhase::Running);
    }
    choices.0 = options;
}
