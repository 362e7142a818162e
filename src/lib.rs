//! Horde Survivor: a top-down survival game on Bevy and Avian.
//!
//! `main.rs` only calls [`game::run`]; the integration tests in `tests/` build headless
//! apps through [`game::configure_headless`].

pub mod common;
pub mod game;
pub mod plugins;
