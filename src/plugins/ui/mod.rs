//! Screen-space UI: HUD, main menu, run overlays and the upgrade picker.
//!
//! Every screen is plain `bevy_ui` nodes scoped to the state that shows it, so leaving that
//! state tears the screen down. Buttons carry an action component; each screen owns one
//! system that reacts to `Changed<Interaction>` on its own action type.
//!
//! ```text
//! OnEnter(MainMenu)         -> menu root   (DespawnOnExit MainMenu)
//! OnEnter(InGame)           -> HUD         (DespawnOnExit InGame)
//! OnEnter(Paused/GameOver/Victory) -> overlay (DespawnOnExit of that phase)
//! LevelUp + choices changed -> upgrade cards (DespawnOnExit LevelUp)
//! ```

use bevy::prelude::*;

pub mod hud;
pub mod menu;
pub mod overlays;
pub mod upgrade_menu;

pub const TEXT_COLOR: Color = Color::srgb(0.92, 0.92, 0.95);
pub const MUTED_TEXT: Color = Color::srgb(0.55, 0.55, 0.6);
pub const PANEL_COLOR: Color = Color::srgba(0.05, 0.05, 0.08, 0.85);
pub const BUTTON_COLOR: Color = Color::srgb(0.14, 0.14, 0.2);
pub const BUTTON_HOVER: Color = Color::srgb(0.22, 0.22, 0.32);
pub const BUTTON_PRESSED: Color = Color::srgb(0.3, 0.3, 0.45);
pub const BORDER_COLOR: Color = Color::srgb(0.4, 0.4, 0.55);

pub fn plugin(app: &mut App) {
    app.add_systems(Update, tint_buttons);
    hud::plugin(app);
    menu::plugin(app);
    overlays::plugin(app);
    upgrade_menu::plugin(app);
}

/// Background colour for a button in the given interaction state.
pub fn button_color(interaction: Interaction) -> Color {
    match interaction {
        Interaction::Pressed => BUTTON_PRESSED,
        Interaction::Hovered => BUTTON_HOVER,
        Interaction::None => BUTTON_COLOR,
    }
}

/// Skip tinting for buttons that opt out (locked characters, disabled entries).
#[derive(Component)]
pub struct StaticButtonColor;

fn tint_buttons(
    mut q_buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>, Without<StaticButtonColor>),
    >,
) {
    for (interaction, mut bg) in &mut q_buttons {
        bg.0 = button_color(*interaction);
    }
}

/// Full-screen, centred column. Used as the root of every menu-like screen.
pub fn overlay_root() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        flex_direction: FlexDirection::Column,
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}

pub fn panel_node() -> Node {
    Node {
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        padding: UiRect::all(Val::Px(24.0)),
        row_gap: Val::Px(8.0),
        border: UiRect::all(Val::Px(2.0)),
        ..default()
    }
}

pub fn title(parent: &mut ChildSpawnerCommands<'_>, text: impl Into<String>, size: f32) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(TEXT_COLOR),
    ));
}

pub fn label(parent: &mut ChildSpawnerCommands<'_>, text: impl Into<String>, color: Color) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(color),
    ));
}

pub fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

/// A labelled button carrying `action`.
pub fn button(parent: &mut ChildSpawnerCommands<'_>, text: impl Into<String>, action: impl Component) {
    parent
        .spawn((
            Button,
            action,
            Node {
                width: Val::Px(260.0),
                height: Val::Px(44.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(BUTTON_COLOR),
            BorderColor::all(BORDER_COLOR),
        ))
        .with_children(|b| {
            b.spawn((
                Text::new(text),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
            ));
        });
}
