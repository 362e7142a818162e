//! Settings plugin: the local key-value store (volume, fullscreen, high score).
//!
//! Settings are a `Resource` mirrored to a RON file. Every change is saved right away, so
//! there is no "apply" step and nothing is lost if the game is killed.
//!
//! ```text
//! Startup:    SettingsStore::path -> Settings::load_or_default -> Settings resource
//! PostUpdate: Settings changed    -> Settings::save
//! Update:     Settings changed    -> primary window mode (render only)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_VOLUME: f32 = 0.8;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("settings serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bgm_volume: f32,
    pub sfx_volume: f32,
    pub fullscreen: bool,
    pub high_score: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bgm_volume: DEFAULT_VOLUME,
            sfx_volume: DEFAULT_VOLUME,
            fullscreen: true,
            high_score: 0,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let mut settings: Settings = ron::from_str(&contents)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Missing file means first launch; anything else is logged and replaced by defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(s) => s,
            Err(e) => {
                warn!("Ignoring unreadable settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn set_bgm_volume(&mut self, v: f32) {
        self.bgm_volume = clamp_volume(v);
    }

    pub fn set_sfx_volume(&mut self, v: f32) {
        self.sfx_volume = clamp_volume(v);
    }

    pub fn set_fullscreen(&mut self, on: bool) {
        self.fullscreen = on;
    }

    /// Returns `true` when `score` is a new high score.
    pub fn record_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    fn sanitize(&mut self) {
        self.bgm_volume = clamp_volume(self.bgm_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
    }
}

#[inline]
fn clamp_volume(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { DEFAULT_VOLUME }
}

/// Where settings live. `None` keeps them in memory only (tests, headless).
#[derive(Resource, Debug, Clone, Default)]
pub struct SettingsStore {
    pub path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn user_config() -> Self {
        let path = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("horde-survivor")
            .join("settings.ron");
        Self { path: Some(path) }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<SettingsStore>()
        .init_resource::<Settings>()
        .add_systems(Startup, load_settings)
        .add_systems(PostUpdate, persist_settings);
}

/// Render-only: keep the primary window mode in sync with `Settings::fullscreen`.
pub fn window_plugin(app: &mut App) {
    app.add_systems(Update, apply_window_mode);
}

fn load_settings(store: Res<SettingsStore>, mut settings: ResMut<Settings>) {
    let Some(path) = store.path.as_deref() else {
        return;
    };
    *settings = Settings::load_or_default(path);
    info!("Loaded settings from {}", path.display());
}

fn persist_settings(store: Res<SettingsStore>, settings: Res<Settings>) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    let Some(path) = store.path.as_deref() else {
        return;
    };
    if let Err(e) = settings.save(path) {
        warn!("Failed to save settings to {}: {e}", path.display());
    }
}

fn apply_window_mode(settings: Res<Settings>, mut q_window: Query<&mut Window, With<PrimaryWindow>>) {
    if !settings.is_changed() {
        return;
    }
    let Ok(mut window) = q_window.single_mut() else {
        return;
    };
    window.mode = if settings.fullscreen {
        WindowMode::BorderlessFullscreen(MonitorSelection::Current)
    } else {
        WindowMode::Windowed
    };
}
