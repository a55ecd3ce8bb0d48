//! Arena grid lookups and cell arithmetic.
//!
//! The arena is a fixed grid of 16x16-pixel tiles. Tilemap data uses raster
//! coordinates (column right, row down) while Bevy's world space points y up,
//! so a cell's world position is always derived through the helpers here
//! rather than ad-hoc math at call sites.

use bevy::prelude::*;
use thiserror::Error;

/// Edge length of one tile in world pixels.
pub const TILE_SIZE: f32 = 16.0;

/// What a grid cell is made of. [`Tile::Wall`] blocks movement, bombs, and
/// fire; everything walkable is [`Tile::Floor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
}

/// One of the four travel directions on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Offset of the adjacent cell in grid coordinates (row index grows downward).
    pub fn cell_delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    /// Velocity in world space (y up) for a body travelling this way at `speed`.
    pub fn velocity(self, speed: f32) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, speed),
            Direction::Down => Vec2::new(0.0, -speed),
            Direction::Left => Vec2::new(-speed, 0.0),
            Direction::Right => Vec2::new(speed, 0.0),
        }
    }
}

/// Grid cell containing the world-space position `pos`.
pub fn cell_of_world(pos: Vec2) -> IVec2 {
    IVec2::new(
        (pos.x / TILE_SIZE).floor() as i32,
        (-pos.y / TILE_SIZE).floor() as i32,
    )
}

/// World-space position of the centre of `cell`.
pub fn cell_center(cell: IVec2) -> Vec2 {
    Vec2::new(
        cell.x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        -(cell.y as f32 * TILE_SIZE + TILE_SIZE / 2.0),
    )
}

/// Failures while parsing CSV tilemap data.
#[derive(Debug, Error)]
pub enum TilemapError {
    #[error("tilemap is empty")]
    Empty,
    #[error("tilemap row {row} has {got} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("unrecognized tile value {value:?} at row {row}, column {col}")]
    BadValue { row: usize, col: usize, value: String },
}

/// The static arena layout: border ring and interior pillars.
///
/// Tiles are stored row-major, top row first. Destructible walls are not part
/// of this grid; they live in [`crate::walls::WallGrid`] because they come and
/// go during a round while the terrain never changes.
#[derive(Resource, Debug, Clone)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Parses a CSV tilemap. Index `1` is solid wall; any other numeric index
    /// is a floor variant and stays walkable.
    pub fn from_csv(csv: &str) -> Result<Self, TilemapError> {
        let mut tiles = Vec::new();
        let mut width = None;

        for (row, line) in csv.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let mut cols = 0;
            for (col, raw) in line.split(',').enumerate() {
                let value = raw.trim();
                let index: i32 = value.parse().map_err(|_| TilemapError::BadValue {
                    row,
                    col,
                    value: value.to_string(),
                })?;
                tiles.push(if index == 1 { Tile::Wall } else { Tile::Floor });
                cols += 1;
            }
            match width {
                None => width = Some(cols),
                Some(expected) if expected != cols => {
                    return Err(TilemapError::RaggedRow {
                        row,
                        expected,
                        got: cols,
                    })
                }
                Some(_) => {}
            }
        }

        let width = width.ok_or(TilemapError::Empty)?;
        let height = tiles.len() / width;
        Ok(Self {
            width: width as i32,
            height: height as i32,
            tiles,
        })
    }

    /// A bare arena of the given size: border ring plus a pillar on every
    /// even/even interior cell. Used when no tilemap data is available.
    pub fn bordered(width: i32, height: i32) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let ring = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let pillar = x % 2 == 0 && y % 2 == 0;
                tiles.push(if ring || pillar { Tile::Wall } else { Tile::Floor });
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Arena extent in world pixels.
    pub fn size_px(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * TILE_SIZE,
            self.height as f32 * TILE_SIZE,
        )
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    pub fn tile_at(&self, cell: IVec2) -> Option<Tile> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(self.tiles[(cell.y * self.width + cell.x) as usize])
    }

    /// Whether `cell` stops movement and fire. Out-of-bounds counts as
    /// blocking so nothing escapes or burns past the arena edge.
    pub fn is_blocking(&self, cell: IVec2) -> bool {
        match self.tile_at(cell) {
            Some(tile) => tile == Tile::Wall,
            None => true,
        }
    }

    /// All wall cells, for spawning tile sprites.
    pub fn wall_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Wall)
            .map(move |(i, _)| IVec2::new(i as i32 % width, i as i32 / width))
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::bordered(15, 15)
    }
}
