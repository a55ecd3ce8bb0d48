//! Bot steering: pick a random direction every second, keep walking it, and
//! occasionally roll for a bomb drop.
//!
//! Bots are deliberately blind; they do not path towards the player or away
//! from fire. All randomness comes from [`ArenaRng`] so a seeded run replays
//! the same chase.

use bevy::prelude::*;
use rand::Rng;

use crate::actor::Facing;
use crate::bomb::BombPlacer;
use crate::grid::Direction;
use crate::movement::{MovementSettings, Velocity};
use crate::round::ArenaRng;
use crate::state::GameSet;

pub struct BotPlugin;

impl Plugin for BotPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BotSettings>()
            .add_systems(Update, drive_bots.in_set(GameSet::Input));
    }
}

#[derive(Resource)]
pub struct BotSettings {
    /// Seconds a bot keeps walking one way before rerolling its direction.
    pub turn_secs: f32,
    /// Seconds between bomb rolls.
    pub bomb_secs: f32,
    /// Chance that a bomb roll actually drops one.
    pub bomb_chance: f64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            turn_secs: 1.0,
            bomb_secs: 3.0,
            bomb_chance: 0.1,
        }
    }
}

/// Per-bot decision clocks. Each gate resets to zero when it fires, so a
/// slow frame can delay a decision but never queues two.
#[derive(Component, Default)]
pub struct Bot {
    turn_elapsed: f32,
    bomb_elapsed: f32,
}

fn drive_bots(
    time: Res<Time>,
    settings: Res<BotSettings>,
    movement: Res<MovementSettings>,
    mut rng: ResMut<ArenaRng>,
    mut placer: BombPlacer,
    mut bots: Query<(&mut Bot, &mut Facing, &mut Velocity, &Transform)>,
) {
    let dt = time.delta_seconds();

    for (mut bot, mut facing, mut velocity, transform) in &mut bots {
        bot.turn_elapsed += dt;
        if bot.turn_elapsed >= settings.turn_secs {
            facing.direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            bot.turn_elapsed = 0.0;
        }

        velocity.0 = facing.direction.velocity(movement.speed);
        facing.moving = true;

        bot.bomb_elapsed += dt;
        if bot.bomb_elapsed >= settings.bomb_secs {
            // The gate resets whether or not the roll wins, so a bot drops at
            // most one bomb per window.
            if rng.gen_bool(settings.bomb_chance) {
                placer.try_place(transform.translation.truncate());
            }
            bot.bomb_elapsed = 0.0;
        }
    }
}
