//! World plugin: walled arena and floor.
//!
//! The arena bounds are gameplay data too: spawners clamp positions into them so enemies
//! never appear behind a wall.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};

const TILE_METERS: f32 = 2.0;
const WALL_THICKNESS_METERS: f32 = 1.0;
/// Keep spawns this far away from the walls.
const SPAWN_MARGIN_METERS: f32 = 1.0;

/// Walkable area, in pixels, centred on the origin.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Arena {
    pub half_extents: Vec2,
    pub margin: f32,
}

impl Arena {
    pub fn from_tunables(t: &Tunables) -> Self {
        Self {
            half_extents: t.arena_half_extents * t.pixels_per_meter,
            margin: t.px(SPAWN_MARGIN_METERS),
        }
    }

    /// Clamp a position so it lies inside the arena, `margin` away from the walls.
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        let inner = (self.half_extents - Vec2::splat(self.margin)).max(Vec2::ZERO);
        pos.clamp(-inner, inner)
    }

    /// Clamp the centre of a circle of `radius` so the circle stays inside the walls.
    pub fn confine(&self, pos: Vec2, radius: f32) -> Vec2 {
        let inner = (self.half_extents - Vec2::splat(radius)).max(Vec2::ZERO);
        pos.clamp(-inner, inner)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.abs().cmple(self.half_extents).all()
    }
}

pub fn plugin(app: &mut App) {
    let arena = Arena::from_tunables(app.world().resource::<Tunables>());
    app.insert_resource(arena);
    app.add_systems(OnEnter(GameState::InGame), (spawn_arena, spawn_floor));
}

fn spawn_arena(mut commands: Commands, arena: Res<Arena>, tunables: Res<Tunables>) {
    let wall_color = Color::srgb(0.22, 0.2, 0.18);
    let thickness = tunables.px(WALL_THICKNESS_METERS);
    let half = arena.half_extents;

    let wall_layers = CollisionLayers::new(
        Layer::World,
        [Layer::Player, Layer::Enemy, Layer::PlayerProjectile],
    );

    let mut spawn_wall = |name: &str, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name.to_string()),
            Sprite {
                color: wall_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    let horizontal = Vec2::new(half.x * 2.0 + thickness * 2.0, thickness);
    let vertical = Vec2::new(thickness, half.y * 2.0);
    spawn_wall("WallTop", Vec2::new(0.0, half.y + thickness * 0.5), horizontal);
    spawn_wall("WallBottom", Vec2::new(0.0, -half.y - thickness * 0.5), horizontal);
    spawn_wall("WallLeft", Vec2::new(-half.x - thickness * 0.5, 0.0), vertical);
    spawn_wall("WallRight", Vec2::new(half.x + thickness * 0.5, 0.0), vertical);
}

/// Checkerboard of solid-colour tiles; the game ships without art assets.
fn spawn_floor(mut commands: Commands, arena: Res<Arena>, tunables: Res<Tunables>) {
    let tile = tunables.px(TILE_METERS);
    let nx = (arena.half_extents.x / tile).ceil() as i32;
    let ny = (arena.half_extents.y / tile).ceil() as i32;

    (-ny..ny)
        .flat_map(|y| (-nx..nx).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let center = Vec2::new((x as f32 + 0.5) * tile, (y as f32 + 0.5) * tile);
            let color = if (x + y).rem_euclid(2) == 0 {
                Color::srgb(0.11, 0.13, 0.1)
            } else {
                Color::srgb(0.09, 0.11, 0.08)
            };

            commands.spawn((
                Name::new("FloorTile"),
                Sprite::from_color(color, Vec2::splat(tile)),
                Transform::from_translation(center.extend(-1.0)),
                DespawnOnExit(GameState::InGame),
            ));
        });
}
