//! Combat and progression messages.
//!
//! Producers (weapons, projectiles, enemies, pickups) only write intent.
//! A single consumer per message applies it, so each piece of state has one writer.

use bevy::prelude::*;

/// Damage a specific enemy.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct DamageEnemy {
    pub target: Entity,
    pub amount: i32,
}

/// Damage the player.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct DamagePlayer {
    pub amount: i32,
}

/// Give the player experience.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct GainExperience {
    pub amount: f32,
}

/// Heal the player.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct HealPlayer {
    pub amount: i32,
}

/// An enemy just died. Written exactly once per enemy.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct EnemyKilled {
    pub enemy: Entity,
    pub kind: crate::plugins::enemies::EnemyKind,
    pub position: Vec2,
}
