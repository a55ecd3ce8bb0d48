//! Global game state definitions. States are stored by Bevy in a stack; switching states simply
//! updates an enum value and triggers on-enter/on-exit schedules. No heap allocations occur when
//! toggling states.

use bevy::prelude::*;

/// High-level state machine for the game loop.
///
/// `Loading` parses the tilemap and queues asset handles, `Playing` runs the
/// simulation, and `GameOver` freezes every gameplay system in place while the
/// defeat message is shown and the restart delay counts down.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    GameOver,
}

/// Named system sets to structure the Update schedule.
///
/// Input writes intent (velocity, facing, bomb requests), Movement integrates
/// positions against the grid, Effects runs fuses, fire, hits, and win checks.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Movement,
    Effects,
}
