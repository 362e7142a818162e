//! Global state machine.
//!
//! ```text
//! MainMenu --Play--> InGame --Restart--> Restarting --> InGame
//!                      |
//!                      +-- RunPhase: Running <-> Paused
//!                                    Running <-> LevelUp
//!                                    Running  -> GameOver | Victory
//! ```
//!
//! `Restarting` exists only so that a restart leaves `InGame` for one frame.
//! Leaving `InGame` despawns everything tagged with `DespawnOnExit(GameState::InGame)`.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    MainMenu,
    InGame,
    Restarting,
}

/// Phase of a run. Only exists while `GameState::InGame`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, SubStates, Default)]
#[source(GameState = GameState::InGame)]
pub enum RunPhase {
    #[default]
    Running,
    Paused,
    LevelUp,
    GameOver,
    Victory,
}

impl RunPhase {
    /// Whether the run has ended (no way back to `Running`).
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}
