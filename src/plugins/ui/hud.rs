//! In-run HUD: health and experience bars, level, run timer and score.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::{MUTED_TEXT, TEXT_COLOR};
use crate::common::state::GameState;
use crate::plugins::player::{Player, PlayerStats};
use crate::plugins::progression::Experience;
use crate::plugins::run::{RunClock, Score};

const BAR_WIDTH: f32 = 260.0;
const HEALTH_COLOR: Color = Color::srgb(0.8, 0.15, 0.2);
const EXPERIENCE_COLOR: Color = Color::srgb(0.25, 0.6, 1.0);
const BAR_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudText {
    Health,
    Experience,
    Level,
    Timer,
    Score,
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudBar {
    Health,
    Experience,
}

/// Everything the HUD shows, read once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HudSnapshot {
    pub health: i32,
    pub max_health: i32,
    pub xp_current: f32,
    pub xp_to_next: f32,
    pub level: u32,
    pub elapsed: f32,
    pub score: u32,
}

impl HudSnapshot {
    pub fn text(&self, which: HudText) -> String {
        match which {
            HudText::Health => format!("{}/{}", self.health.max(0), self.max_health),
            HudText::Experience => format!("{:.0}/{:.0}", self.xp_current.floor(), self.xp_to_next.ceil()),
            HudText::Level => format!("Level {}", self.level),
            HudText::Timer => format_clock(self.elapsed),
            HudText::Score => format!("Score: {}", self.score),
        }
    }

    /// Bar fill in `[0, 1]`.
    pub fn fill(&self, which: HudBar) -> f32 {
        let ratio = match which {
            HudBar::Health => self.health as f32 / self.max_health.max(1) as f32,
            HudBar::Experience => self.xp_current / self.xp_to_next.max(1.0),
        };
        ratio.clamp(0.0, 1.0)
    }
}

/// `MM:SS`, minutes not wrapped at an hour.
pub fn format_clock(seconds: f32) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0) as u32 } else { 0 };
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_hud)
        .add_systems(Update, update_hud.run_if(in_state(GameState::InGame)));
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Name::new("Hud"),
            Node {
                width: Val::Percent(100.0),
                padding: UiRect::all(Val::Px(12.0)),
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            DespawnOnExit(GameState::InGame),
        ))
        .with_children(|root| {
            root.spawn(Node {
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                ..default()
            })
            .with_children(|left| {
                bar(left, HudBar::Health, HudText::Health, HEALTH_COLOR);
                bar(left, HudBar::Experience, HudText::Experience, EXPERIENCE_COLOR);
                hud_text(left, HudText::Level, 20.0, TEXT_COLOR);
            });

            root.spawn(Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexEnd,
                row_gap: Val::Px(6.0),
                ..default()
            })
            .with_children(|right| {
                hud_text(right, HudText::Timer, 28.0, TEXT_COLOR);
                hud_text(right, HudText::Score, 18.0, MUTED_TEXT);
            });
        });
}

fn bar(parent: &mut ChildSpawnerCommands<'_>, which: HudBar, caption: HudText, color: Color) {
    parent
        .spawn((
            Node {
                width: Val::Px(BAR_WIDTH),
                height: Val::Px(18.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BAR_BACKGROUND),
        ))
        .with_children(|b| {
            b.spawn((
                which,
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(0.0),
                    top: Val::Px(0.0),
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(color),
            ));
            hud_text(b, caption, 14.0, TEXT_COLOR);
        });
}

fn hud_text(parent: &mut ChildSpawnerCommands<'_>, which: HudText, size: f32, color: Color) {
    parent.spawn((
        which,
        Text::new(""),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    ));
}

pub(crate) fn update_hud(
    clock: Res<RunClock>,
    score: Res<Score>,
    q_player: Query<(&PlayerStats, &Experience), With<Player>>,
    mut q_text: Query<(&HudText, &mut Text)>,
    mut q_bars: Query<(&HudBar, &mut Node)>,
) {
    let Ok((stats, xp)) = q_player.single() else {
        return;
    };
    let snapshot = HudSnapshot {
        health: stats.health,
        max_health: stats.max_health,
        xp_current: xp.current,
        xp_to_next: xp.to_next,
        level: xp.level,
        elapsed: clock.elapsed,
        score: score.0,
    };

    for (which, mut text) in &mut q_text {
        let s = snapshot.text(*which);
        if text.0 != s {
            text.0 = s;
        }
    }
    for (which, mut node) in &mut q_bars {
        let width = Val::Percent(snapshot.fill(*which) * 100.0);
        if node.width != width {
            node.width = width;
        }
    }
}
