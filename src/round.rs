//! Round lifecycle: reset-and-respawn on entry, deferred one-shot timers, and
//! the seedable RNG every random decision draws from.
//!
//! A "round" is one life: it starts when `Playing` is entered and ends when
//! the human is hit. Everything spawned for a round carries [`RoundEntity`]
//! so the next reset can sweep the board in one query.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::time::Duration;

use crate::actor::Roster;
use crate::bomb::BombLock;
use crate::state::GameState;
use crate::walls::WallGrid;

/// Seconds between the human being hit and the next round starting.
pub const RESTART_DELAY_SECS: f32 = 2.0;

pub struct RoundPlugin;

impl Plugin for RoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentRound>()
            .init_resource::<RoundStatus>()
            .init_resource::<RoundTimers>()
            .init_resource::<ArenaRng>()
            .add_systems(OnEnter(GameState::Playing), reset_round)
            .add_systems(OnEnter(GameState::GameOver), schedule_restart)
            // Ticks outside the gated sets so the restart delay still elapses
            // while the simulation is frozen on the game-over screen.
            .add_systems(Update, tick_round_timers);
    }
}

/// Monotonic round counter. Timers are stamped with the round they were
/// scheduled in; entries stamped with an older round never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundId(u32);

impl RoundId {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {}", self.0)
    }
}

#[derive(Resource, Default)]
pub struct CurrentRound {
    id: RoundId,
}

impl CurrentRound {
    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn advance(&mut self) {
        self.id = self.id.next();
    }
}

/// Whether the running round has been decided. `Won` is latched when the last
/// bot dies; defeat is modelled as the `GameOver` state instead because it
/// freezes the simulation.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundStatus {
    #[default]
    InProgress,
    Won,
}

/// Marks entities that live for exactly one round: actors, destructible
/// walls, bombs, and fire. Terrain tiles and the camera stay out of it.
#[derive(Component)]
pub struct RoundEntity;

/// The one RNG behind wall scatter and bot decisions. Seeding it makes a
/// whole playthrough reproducible; the default seeds from the OS.
#[derive(Resource, Deref, DerefMut)]
pub struct ArenaRng(pub ChaCha8Rng);

impl ArenaRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for ArenaRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

/// What a deferred timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    ReleaseBombLock,
    RestartRound,
}

struct TimerEntry {
    round: RoundId,
    timer: Timer,
    action: DeferredAction,
}

/// One-shot timers owned by the schedule rather than by entities, so they
/// keep counting while their subject (a despawned bomb, a dead player) is
/// long gone.
#[derive(Resource, Default)]
pub struct RoundTimers {
    entries: Vec<TimerEntry>,
}

impl RoundTimers {
    pub fn schedule(&mut self, round: RoundId, delay_secs: f32, action: DeferredAction) {
        self.entries.push(TimerEntry {
            round,
            timer: Timer::from_seconds(delay_secs, TimerMode::Once),
            action,
        });
    }

    /// Advances all timers and returns the actions that came due. Entries
    /// stamped with a round other than `current` are dropped without firing.
    pub fn take_due(&mut self, delta: Duration, current: RoundId) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            if entry.round != current {
                return false;
            }
            entry.timer.tick(delta);
            if entry.timer.finished() {
                due.push(entry.action);
                return false;
            }
            true
        });
        due
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

/// Sweeps the previous round off the board and bumps the round counter.
/// Wall scatter and actor spawns run after this in the same transition.
pub fn reset_round(
    mut commands: Commands,
    round_entities: Query<Entity, With<RoundEntity>>,
    mut current: ResMut<CurrentRound>,
    mut status: ResMut<RoundStatus>,
    mut walls: ResMut<WallGrid>,
    mut roster: ResMut<Roster>,
    mut lock: ResMut<BombLock>,
) {
    for entity in &round_entities {
        commands.entity(entity).despawn_recursive();
    }
    walls.clear();
    roster.clear();
    lock.release();
    *status = RoundStatus::InProgress;
    current.advance();
    info!("{} started", current.id());
}

fn schedule_restart(current: Res<CurrentRound>, mut timers: ResMut<RoundTimers>) {
    timers.schedule(
        current.id(),
        RESTART_DELAY_SECS,
        DeferredAction::RestartRound,
    );
    info!("{} lost; restarting shortly", current.id());
}

pub fn tick_round_timers(
    time: Res<Time>,
    current: Res<CurrentRound>,
    mut timers: ResMut<RoundTimers>,
    mut lock: ResMut<BombLock>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for action in timers.take_due(time.delta(), current.id()) {
        match action {
            DeferredAction::ReleaseBombLock => lock.release(),
            DeferredAction::RestartRound => next_state.set(GameState::Playing),
        }
    }
}
