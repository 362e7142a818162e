//! Run lifecycle: clock, score, pause, victory and restart.
//!
//! ```text
//! OnEnter(InGame):        reset RunClock + Score
//! Update (Running):       tick clock -> Victory at the limit, score kills
//! Update (InGame):        Esc toggles Running <-> Paused
//! OnExit(Running):        pause virtual time
//! OnEnter(Running):       resume virtual time
//! OnEnter(GameOver|Victory): record the high score
//! OnEnter(Restarting):    go straight back to InGame
//! ```

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::time::Virtual;

use crate::common::messages::EnemyKilled;
use crate::common::state::{GameState, RunPhase};
use crate::common::tunables::Tunables;
use crate::plugins::settings::Settings;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct RunClock {
    pub elapsed: f32,
    pub limit: f32,
}

impl Default for RunClock {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            limit: Tunables::default().run_time_limit,
        }
    }
}

impl RunClock {
    pub fn new(limit: f32) -> Self {
        Self { elapsed: 0.0, limit }
    }

    /// Advance; returns `true` once the limit is reached.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        self.is_over()
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.elapsed >= self.limit
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        (self.limit - self.elapsed).max(0.0)
    }
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u32);

pub fn plugin(app: &mut App) {
    app.init_resource::<RunClock>()
        .init_resource::<Score>()
        .add_systems(OnEnter(GameState::InGame), reset_run)
        .add_systems(OnEnter(GameState::Restarting), finish_restart)
        .add_systems(OnExit(GameState::InGame), resume_virtual_time)
        .add_systems(OnEnter(RunPhase::Running), resume_virtual_time)
        .add_systems(OnExit(RunPhase::Running), pause_virtual_time)
        .add_systems(OnEnter(RunPhase::GameOver), record_high_score)
        .add_systems(OnEnter(RunPhase::Victory), record_high_score)
        .add_systems(
            Update,
            (
                tick_run_clock,
                score_kills.after(crate::plugins::enemies::apply_enemy_damage),
            )
                .run_if(in_state(RunPhase::Running)),
        )
        .add_systems(Update, toggle_pause.run_if(in_state(GameState::InGame)));
}

fn reset_run(tunables: Res<Tunables>, mut clock: ResMut<RunClock>, mut score: ResMut<Score>) {
    *clock = RunClock::new(tunables.run_time_limit);
    score.0 = 0;
    info!("Run started ({:.0}s to survive)", clock.limit);
}

pub fn tick_run_clock(time: Res<Time>, mut clock: ResMut<RunClock>, mut next_phase: ResMut<NextState<RunPhase>>) {
    if clock.tick(time.delta_secs()) {
        info!("Victory after {:.0}s", clock.elapsed);
        next_phase.set(RunPhase::Victory);
    }
}

pub fn score_kills(mut reader: MessageReader<EnemyKilled>, mut score: ResMut<Score>) {
    for kill in reader.read() {
        score.0 += kill.kind.stats().experience_value.round().max(0.0) as u32;
    }
}

fn toggle_pause(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    phase: Res<State<RunPhase>>,
    mut next_phase: ResMut<NextState<RunPhase>>,
) {
    let Some(keys) = keys else {
        return;
    };
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }
    match phase.get() {
        RunPhase::Running => next_phase.set(RunPhase::Paused),
        RunPhase::Paused => next_phase.set(RunPhase::Running),
        _ => {}
    }
}

fn pause_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

fn resume_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}

fn record_high_score(score: Res<Score>, settings: Option<ResMut<Settings>>) {
    let Some(mut settings) = settings else {
        return;
    };
    // Compare first so an unbeaten score doesn't mark Settings changed.
    if score.0 > settings.high_score && settings.record_score(score.0) {
        info!("New high score: {}", score.0);
    }
}

fn finish_restart(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}
