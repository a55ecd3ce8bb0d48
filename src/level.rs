//! Arena loading: parses CSV tilemap data into the [`TileGrid`] resource and
//! spawns one sprite per solid tile.
//!
//! Terrain is permanent. It loads once during `Loading` and survives every
//! round reset; only destructible walls (see [`crate::walls`]) are rebuilt.

use bevy::prelude::*;

use crate::grid::{cell_center, TileGrid, TILE_SIZE};
use crate::state::GameState;

/// The arena bundled into the binary: 15x15 tiles, a border ring around a
/// pillar lattice.
pub const ARENA_CSV: &str = include_str!("../assets/tilemaps/arena.csv");

const TILE_COLOR: Color = Color::srgb(0.38, 0.40, 0.45);

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ArenaConfig::default())
            .init_resource::<TileGrid>()
            .add_systems(OnEnter(GameState::Loading), load_arena);
    }
}

/// Which tilemap to parse. Swapping the CSV before startup is how tests and
/// future arena variants change the layout.
#[derive(Resource, Clone)]
pub struct ArenaConfig {
    pub tilemap_csv: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tilemap_csv: ARENA_CSV.to_owned(),
        }
    }
}

/// Marker on terrain tile sprites.
#[derive(Component)]
pub struct TileSprite;

fn load_arena(
    mut commands: Commands,
    config: Res<ArenaConfig>,
    tiles: Query<Entity, With<TileSprite>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    // Loading can in principle rerun; clear stale tile sprites first.
    for entity in &tiles {
        commands.entity(entity).despawn_recursive();
    }

    let grid = match TileGrid::from_csv(&config.tilemap_csv) {
        Ok(grid) => grid,
        Err(err) => {
            warn!("Unable to parse arena tilemap ({err}); continuing with the built-in layout.");
            TileGrid::default()
        }
    };

    for cell in grid.wall_cells() {
        commands.spawn((
            Name::new("Tile"),
            TileSprite,
            SpriteBundle {
                sprite: Sprite {
                    color: TILE_COLOR,
                    custom_size: Some(Vec2::splat(TILE_SIZE)),
                    ..default()
                },
                transform: Transform::from_translation(cell_center(cell).extend(0.0)),
                ..default()
            },
        ));
    }

    info!("arena ready: {}x{} tiles", grid.width(), grid.height());
    commands.insert_resource(grid);
    next_state.set(GameState::Playing);
}
