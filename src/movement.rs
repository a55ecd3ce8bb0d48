//! Keyboard input and grid-clipped movement. Bodies slide until their edge
//! meets a solid cell, then clamp flush against it; each axis resolves on its
//! own so a blocked axis never cancels the other.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::actor::{Facing, Human};
use crate::grid::{Direction, TileGrid, TILE_SIZE};
use crate::state::GameSet;
use crate::walls::WallGrid;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementSettings>().add_systems(
            Update,
            (
                read_player_input.in_set(GameSet::Input),
                apply_kinematics.in_set(GameSet::Movement),
            ),
        );
    }
}

#[derive(Resource)]
pub struct MovementSettings {
    /// Walk speed for every actor, in pixels per second.
    pub speed: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self { speed: 80.0 }
    }
}

#[derive(Component, Default, Deref, DerefMut)]
pub struct Velocity(pub Vec2);

#[derive(Component, Copy, Clone)]
pub struct Collider {
    pub half_extents: Vec2,
}

impl Collider {
    pub fn from_size(size: Vec2) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }
}

/// Maps held keys to a single travel direction per frame. When both axes are
/// held the vertical one wins, so an actor never moves diagonally.
fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<MovementSettings>,
    mut query: Query<(&mut Velocity, &mut Facing), With<Human>>,
) {
    let mut direction = None;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        direction = Some(Direction::Left);
    } else if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        direction = Some(Direction::Right);
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        direction = Some(Direction::Up);
    } else if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        direction = Some(Direction::Down);
    }

    for (mut velocity, mut facing) in &mut query {
        match direction {
            Some(dir) => {
                velocity.0 = dir.velocity(settings.speed);
                facing.direction = dir;
                facing.moving = true;
            }
            None => {
                velocity.0 = Vec2::ZERO;
                facing.moving = false;
            }
        }
    }
}

fn apply_kinematics(
    time: Res<Time>,
    grid: Res<TileGrid>,
    walls: Res<WallGrid>,
    mut query: Query<(&mut Transform, &mut Velocity, &Collider)>,
) {
    let dt = time.delta_seconds();

    for (mut transform, mut velocity, collider) in &mut query {
        let mut position = transform.translation;
        let half = collider.half_extents;

        resolve_horizontal(&mut position, &mut velocity.x, half, dt, &grid, &walls);
        resolve_vertical(&mut position, &mut velocity.y, half, dt, &grid, &walls);

        transform.translation = position;
    }
}

const SKIN: f32 = 0.001;

fn solid(grid: &TileGrid, walls: &WallGrid, cell: IVec2) -> bool {
    grid.is_blocking(cell) || walls.is_occupied(cell)
}

/// Raster row index covering world-space height `y`. Rows grow downward while
/// world y grows upward, hence the negation.
fn row_of(y: f32) -> i32 {
    (-y / TILE_SIZE).floor() as i32
}

fn col_of(x: f32) -> i32 {
    (x / TILE_SIZE).floor() as i32
}

fn resolve_horizontal(
    position: &mut Vec3,
    velocity: &mut f32,
    half: Vec2,
    dt: f32,
    grid: &TileGrid,
    walls: &WallGrid,
) {
    if velocity.abs() < f32::EPSILON {
        return;
    }

    let new_x = position.x + *velocity * dt;
    let dir = velocity.signum();

    // Rows spanned by the body, inset by SKIN so resting contact on one axis
    // does not register as overlap on the other.
    let min_row = row_of(position.y + half.y - SKIN);
    let max_row = row_of(position.y - half.y + SKIN);

    if dir > 0.0 {
        let col = col_of(new_x + half.x);
        for row in min_row..=max_row {
            if solid(grid, walls, IVec2::new(col, row)) {
                position.x = col as f32 * TILE_SIZE - half.x - SKIN;
                *velocity = 0.0;
                return;
            }
        }
    } else {
        let col = col_of(new_x - half.x);
        for row in min_row..=max_row {
            if solid(grid, walls, IVec2::new(col, row)) {
                position.x = (col + 1) as f32 * TILE_SIZE + half.x + SKIN;
                *velocity = 0.0;
                return;
            }
        }
    }

    position.x = new_x;
}

fn resolve_vertical(
    position: &mut Vec3,
    velocity: &mut f32,
    half: Vec2,
    dt: f32,
    grid: &TileGrid,
    walls: &WallGrid,
) {
    if velocity.abs() < f32::EPSILON {
        return;
    }

    let new_y = position.y + *velocity * dt;
    let dir = velocity.signum();
    let min_col = col_of(position.x - half.x + SKIN);
    let max_col = col_of(position.x + half.x - SKIN);

    if dir > 0.0 {
        let row = row_of(new_y + half.y);
        for col in min_col..=max_col {
            if solid(grid, walls, IVec2::new(col, row)) {
                position.y = -((row + 1) as f32 * TILE_SIZE) - half.y - SKIN;
                *velocity = 0.0;
                return;
            }
        }
    } else {
        let row = row_of(new_y - half.y);
        for col in min_col..=max_col {
            if solid(grid, walls, IVec2::new(col, row)) {
                position.y = -(row as f32 * TILE_SIZE) + half.y + SKIN;
                *velocity = 0.0;
                return;
            }
        }
    }

    position.y = new_y;
}
