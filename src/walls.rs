//! Destructible walls: random scatter at round start and the cell index that
//! movement and explosions consult.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::grid::{cell_center, TileGrid, TILE_SIZE};
use crate::round::{ArenaRng, RoundEntity};
use crate::state::GameState;

const WALL_COLOR: Color = Color::srgb(0.76, 0.60, 0.42);

pub struct WallsPlugin;

impl Plugin for WallsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WallSettings>()
            .init_resource::<WallGrid>()
            .add_systems(
                OnEnter(GameState::Playing),
                scatter_walls.after(crate::round::reset_round),
            );
    }
}

#[derive(Resource)]
pub struct WallSettings {
    /// Chance for each eligible cell to receive a wall at round start.
    pub density: f64,
}

impl Default for WallSettings {
    fn default() -> Self {
        Self { density: 0.7 }
    }
}

/// Marker for a destructible wall sprite.
#[derive(Component)]
pub struct DestructibleWall;

/// Cell index of the walls currently standing. Kept separate from
/// [`TileGrid`] because walls are spawned, queried, and destroyed per round
/// while the terrain is immutable.
#[derive(Resource, Default)]
pub struct WallGrid {
    cells: HashMap<IVec2, Entity>,
}

impl WallGrid {
    pub fn insert(&mut self, cell: IVec2, entity: Entity) {
        self.cells.insert(cell, entity);
    }

    pub fn is_occupied(&self, cell: IVec2) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Removes the wall standing at `cell`, handing back its entity for
    /// despawning. Returns `None` when the cell is already clear, so a second
    /// blast over the same cell is a no-op.
    pub fn take(&mut self, cell: IVec2) -> Option<Entity> {
        self.cells.remove(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Whether `cell` may receive a scattered wall: strictly inside the border,
/// not on the pillar lattice, clear of terrain, and outside the four 3x3
/// spawn pockets in the corners.
pub fn is_scatter_cell(grid: &TileGrid, cell: IVec2) -> bool {
    let (w, h) = (grid.width(), grid.height());
    if cell.x < 1 || cell.y < 1 || cell.x > w - 2 || cell.y > h - 2 {
        return false;
    }
    if cell.x % 2 == 0 && cell.y % 2 == 0 {
        return false;
    }
    if grid.is_blocking(cell) {
        return false;
    }
    let near_left = cell.x < 3;
    let near_right = cell.x > w - 4;
    let near_top = cell.y < 3;
    let near_bottom = cell.y > h - 4;
    if (near_left || near_right) && (near_top || near_bottom) {
        return false;
    }
    true
}

/// Rolls every eligible cell against `density` and returns the winners in
/// raster order, so one RNG seed always yields the same layout.
pub fn scatter_cells(grid: &TileGrid, density: f64, rng: &mut impl Rng) -> Vec<IVec2> {
    let mut cells = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = IVec2::new(x, y);
            if is_scatter_cell(grid, cell) && rng.gen_bool(density) {
                cells.push(cell);
            }
        }
    }
    cells
}

pub fn scatter_walls(
    mut commands: Commands,
    grid: Res<TileGrid>,
    settings: Res<WallSettings>,
    mut rng: ResMut<ArenaRng>,
    mut walls: ResMut<WallGrid>,
) {
    for cell in scatter_cells(&grid, settings.density, &mut rng.0) {
        let entity = commands
            .spawn((
                Name::new("DestructibleWall"),
                DestructibleWall,
                RoundEntity,
                SpriteBundle {
                    sprite: Sprite {
                        color: WALL_COLOR,
                        custom_size: Some(Vec2::splat(TILE_SIZE)),
                        ..default()
                    },
                    transform: Transform::from_translation(cell_center(cell).extend(0.5)),
                    ..default()
                },
            ))
            .id();
        walls.insert(cell, entity);
    }
    info!("scattered {} destructible walls", walls.len());
}
