//! Pooled projectiles: message-based spawning, collision resolve, return commit.
//!
//! ```text
//! Update (Running)
//!   weapons::fire_weapons          -> SpawnProjectileRequest
//!   allocate_projectiles_from_pool    pool.pop_free, activate
//!   expire_projectiles                lifetime / arena bounds -> PendingReturn
//!
//! FixedPostUpdate (after avian collision events)
//!   process_projectile_collisions     CollisionStart -> DamageEnemy, PendingReturn
//!
//! PostUpdate
//!   return_to_pool_commit             PendingReturn -> Inactive, pool.push_free
//!
//! OnExit(InGame)
//!   recall_all_projectiles + commit   every projectile back in the pool
//! ```
//!
//! Producers never borrow the pool; the allocator is its single writer on the way out and
//! the commit on the way back. Projectiles are never despawned, only toggled through
//! `ProjectileState` with no structural changes.

pub mod allocator;
pub mod collision;
pub mod commit;
pub mod components;
pub mod lifetime;
pub mod messages;
pub mod pool;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::{GameState, RunPhase};
use crate::common::tunables::Tunables;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let capacity = app
            .world()
            .get_resource::<Tunables>()
            .map_or(Tunables::default().projectile_pool_size, |t| t.projectile_pool_size);

        app.insert_resource(pool::ProjectilePool::new(capacity))
            .add_systems(Startup, pool::init_projectile_pool);

        app.add_systems(
            Update,
            (
                allocator::allocate_projectiles_from_pool.after(crate::plugins::weapons::fire_weapons),
                lifetime::expire_projectiles,
            )
                .run_if(in_state(RunPhase::Running)),
        );

        app.add_systems(
            FixedPostUpdate,
            collision::process_projectile_collisions
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(PostUpdate, commit::return_to_pool_commit);
        app.add_systems(
            OnExit(GameState::InGame),
            (commit::recall_all_projectiles, commit::return_to_pool_commit).chain(),
        );
    }
}

#[cfg(test)]
mod tests;
