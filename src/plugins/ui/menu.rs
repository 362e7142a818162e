//! Main menu with Options, Characters and Credits panels.
//!
//! The visible panel is a resource. Whenever it, the settings or the chosen starting weapon
//! change, the menu root is rebuilt from scratch.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::{MUTED_TEXT, PANEL_COLOR, StaticButtonColor, TEXT_COLOR, button, label, overlay_root, spacer, title};
use crate::common::state::GameState;
use crate::plugins::settings::Settings;
use crate::plugins::weapons::{StartingWeapon, WeaponId};

pub const VOLUME_STEP: f32 = 0.1;
const LOCKED_COLOR: Color = Color::srgb(0.08, 0.08, 0.1);

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuPanel {
    #[default]
    Main,
    Options,
    Characters,
    Credits,
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuButton {
    Play,
    Options,
    Characters,
    Credits,
    Back,
    Quit,
    BgmDown,
    BgmUp,
    SfxDown,
    SfxUp,
    ToggleFullscreen,
    Character(WeaponId),
}

#[derive(Component)]
pub struct MainMenuRoot;

/// A playable character: a name, the weapon it starts with and the high score that unlocks it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Character {
    pub name: &'static str,
    pub weapon: WeaponId,
    pub required_score: u32,
}

impl Character {
    #[inline]
    pub fn is_unlocked(&self, high_score: u32) -> bool {
        high_score >= self.required_score
    }
}

pub const CHARACTERS: [Character; 3] = [
    Character {
        name: "Mage",
        weapon: WeaponId::MagicWand,
        required_score: 0,
    },
    Character {
        name: "Knight",
        weapon: WeaponId::Sword,
        required_score: 500,
    },
    Character {
        name: "Alchemist",
        weapon: WeaponId::FireBomb,
        required_score: 2000,
    },
];

pub fn character_for(weapon: WeaponId) -> Option<&'static Character> {
    CHARACTERS.iter().find(|c| c.weapon == weapon)
}

/// What the app has to do after a menu button was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuOutcome {
    Stay,
    StartRun,
    Quit,
}

/// Snap `value + delta` to the volume grid.
pub fn step_volume(value: f32, delta: f32) -> f32 {
    (((value + delta) / VOLUME_STEP).round() * VOLUME_STEP).clamp(0.0, 1.0)
}

/// Apply a pressed button to menu state. Locked characters are ignored.
pub fn apply_menu_button(
    button: MenuButton,
    panel: &mut MenuPanel,
    settings: &mut Settings,
    starting: &mut StartingWeapon,
) -> MenuOutcome {
    match button {
        MenuButton::Play => return MenuOutcome::StartRun,
        MenuButton::Quit => return MenuOutcome::Quit,
        MenuButton::Options => *panel = MenuPanel::Options,
        MenuButton::Characters => *panel = MenuPanel::Characters,
        MenuButton::Credits => *panel = MenuPanel::Credits,
        MenuButton::Back => *panel = MenuPanel::Main,
        MenuButton::BgmDown => settings.set_bgm_volume(step_volume(settings.bgm_volume, -VOLUME_STEP)),
        MenuButton::BgmUp => settings.set_bgm_volume(step_volume(settings.bgm_volume, VOLUME_STEP)),
        MenuButton::SfxDown => settings.set_sfx_volume(step_volume(settings.sfx_volume, -VOLUME_STEP)),
        MenuButton::SfxUp => settings.set_sfx_volume(step_volume(settings.sfx_volume, VOLUME_STEP)),
        MenuButton::ToggleFullscreen => settings.set_fullscreen(!settings.fullscreen),
        MenuButton::Character(weapon) => {
            if let Some(c) = character_for(weapon).filter(|c| c.is_unlocked(settings.high_score)) {
                starting.0 = c.weapon;
                info!("Selected {}", c.name);
            }
        }
    }
    MenuOutcome::Stay
}

pub fn plugin(app: &mut App) {
    app.init_resource::<MenuPanel>()
        .add_systems(OnEnter(GameState::MainMenu), reset_panel)
        .add_systems(
            Update,
            (handle_menu_buttons, rebuild_menu.after(handle_menu_buttons))
                .run_if(in_state(GameState::MainMenu)),
        );
}

fn reset_panel(mut panel: ResMut<MenuPanel>) {
    *panel = MenuPanel::Main;
}

fn handle_menu_buttons(
    q_buttons: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut panel: ResMut<MenuPanel>,
    mut settings: ResMut<Settings>,
    mut starting: ResMut<StartingWeapon>,
    mut next: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<AppExit>,
) {
    for (interaction, button) in &q_buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match apply_menu_button(*button, &mut panel, &mut settings, &mut starting) {
            MenuOutcome::Stay => {}
            MenuOutcome::StartRun => next.set(GameState::InGame),
            MenuOutcome::Quit => {
                exit.write(AppExit::Success);
            }
        }
    }
}

pub(crate) fn rebuild_menu(
    mut commands: Commands,
    panel: Res<MenuPanel>,
    settings: Res<Settings>,
    starting: Res<StartingWeapon>,
    q_root: Query<Entity, With<MainMenuRoot>>,
) {
    let stale = panel.is_changed() || settings.is_changed() || starting.is_changed();
    if !stale && !q_root.is_empty() {
        return;
    }
    for e in &q_root {
        commands.entity(e).despawn();
    }

    commands
        .spawn((
            Name::new("MainMenu"),
            MainMenuRoot,
            overlay_root(),
            BackgroundColor(PANEL_COLOR),
            DespawnOnExit(GameState::MainMenu),
        ))
        .with_children(|root| match *panel {
            MenuPanel::Main => main_panel(root, &settings, &starting),
            MenuPanel::Options => options_panel(root, &settings),
            MenuPanel::Characters => characters_panel(root, &settings, &starting),
            MenuPanel::Credits => credits_panel(root),
        });
}

fn main_panel(root: &mut ChildSpawnerCommands<'_>, settings: &Settings, starting: &StartingWeapon) {
    title(root, "Horde Survivor", 64.0);
    let who = character_for(starting.0).map_or("Unknown", |c| c.name);
    label(root, format!("Playing as {who}  |  High score: {}", settings.high_score), MUTED_TEXT);
    spacer(root, 24.0);
    button(root, "Play", MenuButton::Play);
    button(root, "Characters", MenuButton::Characters);
    button(root, "Options", MenuButton::Options);
    button(root, "Credits", MenuButton::Credits);
    button(root, "Quit", MenuButton::Quit);
}

fn options_panel(root: &mut ChildSpawnerCommands<'_>, settings: &Settings) {
    title(root, "Options", 48.0);
    spacer(root, 16.0);
    stepper(root, "Music", settings.bgm_volume, MenuButton::BgmDown, MenuButton::BgmUp);
    stepper(root, "Effects", settings.sfx_volume, MenuButton::SfxDown, MenuButton::SfxUp);
    let mode = if settings.fullscreen { "Fullscreen: On" } else { "Fullscreen: Off" };
    button(root, mode, MenuButton::ToggleFullscreen);
    spacer(root, 16.0);
    button(root, "Back", MenuButton::Back);
}

fn stepper(root: &mut ChildSpawnerCommands<'_>, name: &str, value: f32, down: MenuButton, up: MenuButton) {
    root.spawn(Node {
        align_items: AlignItems::Center,
        column_gap: Val::Px(12.0),
        ..default()
    })
    .with_children(|row| {
        small_button(row, "-", down);
        label(row, format!("{name}: {:.0}%", value * 100.0), TEXT_COLOR);
        small_button(row, "+", up);
    });
}

fn small_button(parent: &mut ChildSpawnerCommands<'_>, text: &str, action: MenuButton) {
    parent
        .spawn((
            Button,
            action,
            Node {
                width: Val::Px(40.0),
                height: Val::Px(40.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(super::BUTTON_COLOR),
            BorderColor::all(super::BORDER_COLOR),
        ))
        .with_children(|b| label(b, text, TEXT_COLOR));
}

fn characters_panel(root: &mut ChildSpawnerCommands<'_>, settings: &Settings, starting: &StartingWeapon) {
    title(root, "Characters", 48.0);
    spacer(root, 16.0);
    for c in &CHARACTERS {
        let unlocked = c.is_unlocked(settings.high_score);
        let selected = starting.0 == c.weapon;
        let text = if !unlocked {
            format!("{} (score {} to unlock)", c.name, c.required_score)
        } else if selected {
            format!("> {} - {} <", c.name, c.weapon.name())
        } else {
            format!("{} - {}", c.name, c.weapon.name())
        };

        if unlocked {
            button(root, text, MenuButton::Character(c.weapon));
        } else {
            // Locked: looks like a button but carries no action and never lights up.
            root.spawn((
                Button,
                StaticButtonColor,
                Node {
                    width: Val::Px(260.0),
                    height: Val::Px(44.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(LOCKED_COLOR),
                BorderColor::all(super::BORDER_COLOR),
            ))
            .with_children(|row| label(row, text, MUTED_TEXT));
        }
    }
    spacer(root, 16.0);
    button(root, "Back", MenuButton::Back);
}

fn credits_panel(root: &mut ChildSpawnerCommands<'_>) {
    title(root, "Credits", 48.0);
    spacer(root, 16.0);
    label(root, "Built with Bevy, Avian and Firefly", TEXT_COLOR);
    label(root, "Survive the night. Thirty minutes until dawn.", MUTED_TEXT);
    spacer(root, 16.0);
    button(root, "Back", MenuButton::Back);
}
