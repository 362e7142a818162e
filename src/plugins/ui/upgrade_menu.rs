//! Level-up picker: one card per offered upgrade plus a Skip button.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::{BORDER_COLOR, BUTTON_COLOR, MUTED_TEXT, TEXT_COLOR, button, overlay_root, spacer, title};
use crate::common::state::RunPhase;
use crate::plugins::progression::PendingLevelUps;
use crate::plugins::upgrades::{ChooseUpgrade, Upgrade, UpgradeChoices};

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeButton {
    Choose(usize),
    Skip,
}

impl UpgradeButton {
    pub fn answer(self) -> ChooseUpgrade {
        match self {
            Self::Choose(i) => ChooseUpgrade(Some(i)),
            Self::Skip => ChooseUpgrade(None),
        }
    }
}

#[derive(Component)]
pub struct UpgradeMenuRoot;

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (handle_upgrade_buttons, rebuild_upgrade_menu)
            .chain()
            .run_if(in_state(RunPhase::LevelUp)),
    );
}

pub(crate) fn handle_upgrade_buttons(
    q_buttons: Query<(&Interaction, &UpgradeButton), Changed<Interaction>>,
    mut writer: MessageWriter<ChooseUpgrade>,
) {
    // The first press wins; the cards are rebuilt before another can land.
    if let Some((_, button)) = q_buttons.iter().find(|(i, _)| **i == Interaction::Pressed) {
        writer.write(button.answer());
    }
}

pub(crate) fn rebuild_upgrade_menu(
    mut commands: Commands,
    choices: Res<UpgradeChoices>,
    pending: Res<PendingLevelUps>,
    q_root: Query<Entity, With<UpgradeMenuRoot>>,
) {
    if !choices.is_changed() && !q_root.is_empty() {
        return;
    }
    for e in &q_root {
        commands.entity(e).despawn();
    }
    if choices.0.is_empty() {
        return;
    }

    let heading = if pending.0 > 1 {
        format!("Level Up! ({} choices left)", pending.0)
    } else {
        "Level Up!".to_string()
    };

    commands
        .spawn((
            Name::new("UpgradeMenu"),
            UpgradeMenuRoot,
            overlay_root(),
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            DespawnOnExit(RunPhase::LevelUp),
        ))
        .with_children(|root| {
            title(root, heading, 48.0);
            spacer(root, 16.0);
            root.spawn(Node {
                column_gap: Val::Px(16.0),
                ..default()
            })
            .with_children(|row| {
                for (i, upgrade) in choices.0.iter().enumerate() {
                    card(row, i, upgrade);
                }
            });
            spacer(root, 16.0);
            button(root, "Skip", UpgradeButton::Skip);
        });
}

fn card(parent: &mut ChildSpawnerCommands<'_>, index: usize, upgrade: &Upgrade) {
    parent
        .spawn((
            Button,
            UpgradeButton::Choose(index),
            Node {
                width: Val::Px(240.0),
                min_height: Val::Px(160.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(12.0)),
                row_gap: Val::Px(8.0),
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(BUTTON_COLOR),
            BorderColor::all(BORDER_COLOR),
        ))
        .with_children(|c| {
            c.spawn((
                Text::new(upgrade.title.clone()),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
            ));
            c.spawn((
                Text::new(upgrade.description.clone()),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(MUTED_TEXT),
            ));
        });
}
