//! Enemy waves.
//!
//! Three spawn sources, all clamped into the arena:
//! - the whole [`WaveTable`] in order, one wave every `time_between_waves`, cycling
//! - an extra random boss wave every `boss_interval`
//! - a trickle of single enemies close to the player
//!
//! A started wave does not spawn all at once: [`ActiveWaves`] releases one enemy every
//! `spawn_delay` seconds.

use std::collections::VecDeque;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::rng::GameRng;
use crate::common::state::{GameState, RunPhase};
use crate::common::tunables::Tunables;
use crate::plugins::enemies::{EnemyKind, spawn_enemy};
use crate::plugins::player::Player;
use crate::plugins::run::RunClock;
use crate::plugins::world::Arena;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: EnemyKind,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyWave {
    pub name: String,
    pub is_boss: bool,
    pub enemies: Vec<SpawnEntry>,
    pub spawn_delay: f32,
}

impl EnemyWave {
    pub fn new(name: impl Into<String>, enemies: &[(EnemyKind, u32)]) -> Self {
        Self {
            name: name.into(),
            is_boss: false,
            enemies: enemies.iter().map(|&(kind, count)| SpawnEntry { kind, count }).collect(),
            spawn_delay: 0.5,
        }
    }

    pub fn boss(mut self) -> Self {
        self.is_boss = true;
        self
    }

    /// Spawn order: entries in sequence, each repeated `count` times.
    pub fn spawn_queue(&self) -> VecDeque<EnemyKind> {
        self.enemies
            .iter()
            .flat_map(|e| std::iter::repeat_n(e.kind, e.count as usize))
            .collect()
    }
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveTable(pub Vec<EnemyWave>);

impl Default for WaveTable {
    fn default() -> Self {
        use EnemyKind::*;
        Self(vec![
            EnemyWave::new("Bat Swarm", &[(Bat, 12)]),
            EnemyWave::new("Rattling Bones", &[(Skeleton, 8), (Bat, 4)]),
            EnemyWave::new("Ghoul Pack", &[(Ghoul, 5), (Skeleton, 5)]),
            EnemyWave::new("Night Horde", &[(Bat, 10), (Skeleton, 8), (Ghoul, 4)]),
            EnemyWave::new("The Reaper", &[(Reaper, 1), (Bat, 6)]).boss(),
        ])
    }
}

/// What the director decided this frame. Indices point into the wave table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveEvent {
    Wave(usize),
    Boss(usize),
}

/// Decides when regular and boss waves start.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WaveDirector {
    pub next_wave_time: f32,
    pub next_boss_time: f32,
    /// Position in the rotation over the whole table, boss waves included.
    pub current_wave: usize,
    pub time_between_waves: f32,
    pub boss_interval: f32,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new(&Tunables::default())
    }
}

impl WaveDirector {
    pub fn new(t: &Tunables) -> Self {
        Self {
            next_wave_time: t.time_between_waves,
            next_boss_time: t.boss_interval,
            current_wave: 0,
            time_between_waves: t.time_between_waves,
            boss_interval: t.boss_interval,
        }
    }

    pub fn tick(&mut self, clock: f32, waves: &[EnemyWave], rng: &mut GameRng) -> Vec<WaveEvent> {
        let mut events = Vec::new();

        if clock >= self.next_wave_time {
            self.next_wave_time = clock + self.time_between_waves;
            if !waves.is_empty() {
                let i = self.current_wave % waves.len();
                self.current_wave = (i + 1) % waves.len();
                events.push(WaveEvent::Wave(i));
            }
        }

        if clock >= self.next_boss_time {
            self.next_boss_time = clock + self.boss_interval;
            let bosses: Vec<usize> = (0..waves.len()).filter(|&i| waves[i].is_boss).collect();
            if let Some(pick) = rng.index(bosses.len()) {
                events.push(WaveEvent::Boss(bosses[pick]));
            }
        }

        events
    }
}

/// A wave in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveWave {
    pub queue: VecDeque<EnemyKind>,
    pub spawn_delay: f32,
    /// Time until the next release; starts at zero so the first enemy comes immediately.
    pub timer: f32,
}

impl ActiveWave {
    pub fn new(wave: &EnemyWave) -> Self {
        Self {
            queue: wave.spawn_queue(),
            spawn_delay: wave.spawn_delay.max(0.0),
            timer: 0.0,
        }
    }

    /// Enemies due after `dt` seconds.
    pub fn release(&mut self, dt: f32) -> Vec<EnemyKind> {
        let mut out = Vec::new();
        self.timer -= dt;
        while self.timer <= 0.0 {
            let Some(kind) = self.queue.pop_front() else {
                break;
            };
            out.push(kind);
            if self.spawn_delay <= 0.0 {
                continue;
            }
            self.timer += self.spawn_delay;
        }
        out
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }
}

#[derive(Resource, Debug, Default, Clone)]
pub struct ActiveWaves(pub Vec<ActiveWave>);

/// One basic enemy near the player every `trickle_interval` seconds.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TrickleSpawner {
    pub kind: EnemyKind,
    pub timer: Timer,
}

impl Default for TrickleSpawner {
    fn default() -> Self {
        Self::new(&Tunables::default())
    }
}

impl TrickleSpawner {
    pub fn new(t: &Tunables) -> Self {
        Self {
            kind: EnemyKind::Skeleton,
            timer: Timer::from_seconds(t.trickle_interval, TimerMode::Repeating),
        }
    }

    /// Returns `true` when an enemy is due.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.timer.tick(delta).just_finished()
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<WaveTable>()
        .init_resource::<WaveDirector>()
        .init_resource::<ActiveWaves>()
        .init_resource::<TrickleSpawner>()
        .add_systems(OnEnter(GameState::InGame), reset_waves)
        .add_systems(
            Update,
            (
                direct_waves.after(crate::plugins::run::tick_run_clock),
                release_wave_enemies.after(direct_waves),
                trickle_spawn,
            )
                .run_if(in_state(RunPhase::Running)),
        );
}

fn reset_waves(
    tunables: Res<Tunables>,
    mut director: ResMut<WaveDirector>,
    mut active: ResMut<ActiveWaves>,
    mut trickle: ResMut<TrickleSpawner>,
) {
    *director = WaveDirector::new(&tunables);
    active.0.clear();
    *trickle = TrickleSpawner::new(&tunables);
}

/// Random point on a ring around `center` (pixels), clamped into the arena.
pub fn ring_position(center: Vec2, min_px: f32, max_px: f32, arena: &Arena, rng: &mut GameRng) -> Vec2 {
    let dir = rng.unit_direction();
    let dist = rng.range(min_px, max_px);
    arena.clamp(center + dir * dist)
}

pub fn direct_waves(
    clock: Res<RunClock>,
    table: Res<WaveTable>,
    mut director: ResMut<WaveDirector>,
    mut active: ResMut<ActiveWaves>,
    mut rng: ResMut<GameRng>,
) {
    for event in director.tick(clock.elapsed, &table.0, &mut rng) {
        let (WaveEvent::Wave(i) | WaveEvent::Boss(i)) = event;
        let wave = &table.0[i];
        if wave.is_boss {
            info!("Boss wave '{}' at {:.0}s", wave.name, clock.elapsed);
        } else {
            info!("Wave '{}' at {:.0}s", wave.name, clock.elapsed);
        }
        active.0.push(ActiveWave::new(wave));
    }
}

pub fn release_wave_enemies(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    arena: Res<Arena>,
    mut rng: ResMut<GameRng>,
    mut active: ResMut<ActiveWaves>,
    q_player: Query<&Transform, With<Player>>,
) {
    if active.0.is_empty() {
        return;
    }
    // Waves spawn around the player, or around the origin without one.
    let center = q_player.single().map(|tf| tf.translation.truncate()).unwrap_or(Vec2::ZERO);
    let min = tunables.px(tunables.wave_spawn_min_distance);
    let max = tunables.px(tunables.wave_spawn_max_distance);
    let dt = time.delta_secs();

    for wave in &mut active.0 {
        for kind in wave.release(dt) {
            let pos = ring_position(center, min, max, &arena, &mut rng);
            spawn_enemy(&mut commands, &tunables, kind, pos);
        }
    }
    active.0.retain(|w| !w.is_done());
}

pub fn trickle_spawn(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    arena: Res<Arena>,
    mut rng: ResMut<GameRng>,
    mut trickle: ResMut<TrickleSpawner>,
    q_player: Query<&Transform, With<Player>>,
) {
    if !trickle.tick(time.delta()) {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        debug!("Trickle spawn skipped: no player");
        return;
    };
    let d = tunables.px(tunables.trickle_distance);
    let pos = ring_position(player_tf.translation.truncate(), d, d, &arena, &mut rng);
    spawn_enemy(&mut commands, &tunables, trickle.kind, pos);
}
