//! Pause, game-over and victory panels.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::hud::format_clock;
use super::{MUTED_TEXT, PANEL_COLOR, button, label, overlay_root, panel_node, spacer, title};
use crate::common::state::{GameState, RunPhase};
use crate::plugins::run::{RunClock, Score};
use crate::plugins::settings::Settings;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayButton {
    Resume,
    Restart,
    MainMenu,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(RunPhase::Paused), spawn_pause_panel)
        .add_systems(OnEnter(RunPhase::GameOver), spawn_game_over_panel)
        .add_systems(OnEnter(RunPhase::Victory), spawn_victory_panel)
        .add_systems(Update, handle_overlay_buttons.run_if(in_state(GameState::InGame)));
}

fn spawn_pause_panel(mut commands: Commands) {
    commands
        .spawn((
            Name::new("PausePanel"),
            overlay_root(),
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
            DespawnOnExit(RunPhase::Paused),
        ))
        .with_children(|root| {
            root.spawn((panel_node(), BackgroundColor(PANEL_COLOR), BorderColor::all(super::BORDER_COLOR)))
                .with_children(|p| {
                    title(p, "Paused", 48.0);
                    spacer(p, 12.0);
                    button(p, "Resume", OverlayButton::Resume);
                    button(p, "Restart", OverlayButton::Restart);
                    button(p, "Main Menu", OverlayButton::MainMenu);
                });
        });
}

fn spawn_game_over_panel(commands: Commands, clock: Res<RunClock>, score: Res<Score>, settings: Res<Settings>) {
    spawn_result_panel(commands, RunPhase::GameOver, "Game Over", &clock, score.0, settings.high_score);
}

fn spawn_victory_panel(commands: Commands, clock: Res<RunClock>, score: Res<Score>, settings: Res<Settings>) {
    spawn_result_panel(commands, RunPhase::Victory, "You Survived!", &clock, score.0, settings.high_score);
}

/// Summary line shown under the result title.
pub fn result_summary(clock: &RunClock, score: u32, high_score: u32) -> String {
    let best = if score >= high_score && score > 0 {
        "New high score!".to_string()
    } else {
        format!("High score: {high_score}")
    };
    format!("Survived {}  |  Score: {score}  |  {best}", format_clock(clock.elapsed))
}

fn spawn_result_panel(
    mut commands: Commands,
    phase: RunPhase,
    heading: &str,
    clock: &RunClock,
    score: u32,
    high_score: u32,
) {
    let summary = result_summary(clock, score, high_score);
    commands
        .spawn((
            Name::new("ResultPanel"),
            overlay_root(),
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            DespawnOnExit(phase),
        ))
        .with_children(|root| {
            root.spawn((panel_node(), BackgroundColor(PANEL_COLOR), BorderColor::all(super::BORDER_COLOR)))
                .with_children(|p| {
                    title(p, heading, 56.0);
                    label(p, summary, MUTED_TEXT);
                    spacer(p, 12.0);
                    button(p, "Restart", OverlayButton::Restart);
                    button(p, "Main Menu", OverlayButton::MainMenu);
                });
        });
}

pub(crate) fn handle_overlay_buttons(
    q_buttons: Query<(&Interaction, &OverlayButton), Changed<Interaction>>,
    phase: Option<Res<State<RunPhase>>>,
    mut next_phase: ResMut<NextState<RunPhase>>,
    mut next_game: ResMut<NextState<GameState>>,
) {
    for (interaction, button) in &q_buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            OverlayButton::Resume => {
                if phase.as_deref().is_some_and(|p| *p.get() == RunPhase::Paused) {
                    next_phase.set(RunPhase::Running);
                }
            }
            OverlayButton::Restart => next_game.set(GameState::Restarting),
            OverlayButton::MainMenu => next_game.set(GameState::MainMenu),
        }
    }
}
