use bevy::prelude::*;

/// Marks the pre-spawned pool entities.
#[derive(Component, Debug, Clone, Copy)]
pub struct PooledProjectile;

/// Entity known to be a pooled projectile. Only the pool hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileEntity(pub Entity);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectileState {
    #[default]
    Inactive,
    Active,
    /// Hit something or expired; the commit system recycles it.
    PendingReturn,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub damage: i32,
}

/// When it finishes the projectile returns to the pool on its own.
#[derive(Component, Debug, Clone, Default, PartialEq, Deref, DerefMut)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn from_seconds(secs: f32) -> Self {
        Self(Timer::from_seconds(secs.max(0.0), TimerMode::Once))
    }
}
