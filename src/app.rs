//! High-level plugin composition.
//!
//! The `BomberArenaPlugin` glues together all domain-specific plugins (arena,
//! walls, actors, bombs, bots, etc.) and sets up system ordering. Each
//! subsystem is responsible for its own state; this orchestrator merely
//! registers them with the Bevy application.

use bevy::prelude::*;

use crate::actor::ActorPlugin;
use crate::animation::AnimationPlugin;
use crate::audio::GameAudioPlugin;
use crate::bomb::BombPlugin;
use crate::bot::BotPlugin;
use crate::camera::CameraPlugin;
use crate::level::LevelPlugin;
use crate::movement::MovementPlugin;
use crate::round::RoundPlugin;
use crate::state::{GameSet, GameState};
use crate::ui::UiPlugin;
use crate::walls::WallsPlugin;

/// Bundles every gameplay-centric plugin into a single unit that can be added
/// to the Bevy `App`.
pub struct BomberArenaPlugin;

impl Plugin for BomberArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins((
                LevelPlugin,     // Tilemap parsing + terrain sprites.
                WallsPlugin,     // Destructible wall scatter.
                RoundPlugin,     // Round reset, deferred timers, RNG.
                ActorPlugin,     // Human + bot lifecycle and hit handling.
                MovementPlugin,  // Input + kinematic updates.
                BotPlugin,       // Bot steering and bomb rolls.
                BombPlugin,      // Placement, fuses, fire.
                AnimationPlugin, // Atlas frame stepping.
                GameAudioPlugin, // Audio handle preloading + music.
                CameraPlugin,    // Fixed arena camera.
                UiPlugin,        // Game-over overlay.
            ))
            // Systems inside these sets execute sequentially and only while a
            // round is running; the game-over freeze falls out of this gate.
            .configure_sets(
                Update,
                (GameSet::Input, GameSet::Movement, GameSet::Effects)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
