//! Actor lifecycle: spawning the human and the bots, tracking who is still
//! alive, and applying fire hits.
//!
//! Entities come and go (bots despawn when destroyed) so cross-frame
//! bookkeeping never stores `Entity` ids alone; the [`Roster`] keys everything
//! by [`ActorId`] and keeps a tombstone once an actor dies. A hit delivered
//! twice in the same blast therefore lands exactly once.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::animation::{walk_clip, SpriteAnimation, SpriteSheets};
use crate::grid::{cell_center, Direction};
use crate::movement::{Collider, Velocity};
use crate::round::{RoundEntity, RoundStatus};
use crate::state::{GameSet, GameState};

/// Body size used for collision and overlap checks, slightly smaller than a
/// tile so actors can slip through single-cell gaps.
pub const ACTOR_SIZE: Vec2 = Vec2::new(14.0, 14.0);

const HUMAN_SPAWN: IVec2 = IVec2::new(1, 13);
const BOT_SPAWNS: [(IVec2, SpriteVariant); 3] = [
    (IVec2::new(13, 1), SpriteVariant::Red),
    (IVec2::new(1, 1), SpriteVariant::Black),
    (IVec2::new(13, 13), SpriteVariant::Blue),
];

const DEATH_TINT: Color = Color::srgb(1.0, 0.0, 0.0);

pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ActorHit>()
            .init_resource::<Roster>()
            .add_systems(
                OnEnter(GameState::Playing),
                spawn_actors.after(crate::walls::scatter_walls),
            )
            .add_systems(
                Update,
                apply_hits
                    .in_set(GameSet::Effects)
                    .after(crate::bomb::fire_hits),
            );
    }
}

/// Stable identity for an actor, independent of its `Entity` id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorId {
    Human,
    Bot(u8),
}

#[derive(Component)]
pub struct Actor {
    pub id: ActorId,
}

/// Marker for the keyboard-controlled actor.
#[derive(Component)]
pub struct Human;

/// Which character sheet an actor is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteVariant {
    White,
    Red,
    Black,
    Blue,
}

impl SpriteVariant {
    pub const ALL: [SpriteVariant; 4] = [
        SpriteVariant::White,
        SpriteVariant::Red,
        SpriteVariant::Black,
        SpriteVariant::Blue,
    ];

    pub fn texture_path(self) -> &'static str {
        match self {
            SpriteVariant::White => "sprites/player_white.png",
            SpriteVariant::Red => "sprites/player_red.png",
            SpriteVariant::Black => "sprites/player_black.png",
            SpriteVariant::Blue => "sprites/player_blue.png",
        }
    }
}

/// Which way an actor points and whether it is walking this frame. Drives
/// both the walk animation and, for bots, the travel velocity.
#[derive(Component)]
pub struct Facing {
    pub direction: Direction,
    pub moving: bool,
}

impl Default for Facing {
    fn default() -> Self {
        Self {
            direction: Direction::Down,
            moving: false,
        }
    }
}

/// Sent when fire overlaps an actor's body.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorHit {
    pub id: ActorId,
}

struct RosterEntry {
    entity: Entity,
    alive: bool,
}

/// Who is in the round and whether they still live. Dead actors keep their
/// entry as a tombstone until the next round resets the roster.
#[derive(Resource, Default)]
pub struct Roster {
    entries: BTreeMap<ActorId, RosterEntry>,
}

impl Roster {
    pub fn register(&mut self, id: ActorId, entity: Entity) {
        self.entries.insert(id, RosterEntry { entity, alive: true });
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.entries.get(&id).map(|e| e.alive).unwrap_or(false)
    }

    pub fn human_alive(&self) -> bool {
        self.is_alive(ActorId::Human)
    }

    /// Marks `id` dead and returns its entity, or `None` if the actor was
    /// unknown or already dead.
    pub fn kill(&mut self, id: ActorId) -> Option<Entity> {
        let entry = self.entries.get_mut(&id)?;
        if !entry.alive {
            return None;
        }
        entry.alive = false;
        Some(entry.entity)
    }

    pub fn live_bots(&self) -> usize {
        self.entries
            .iter()
            .filter(|(id, entry)| matches!(id, ActorId::Bot(_)) && entry.alive)
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub fn spawn_actors(
    mut commands: Commands,
    sheets: Res<SpriteSheets>,
    mut roster: ResMut<Roster>,
) {
    spawn_actor(
        &mut commands,
        &sheets,
        &mut roster,
        ActorId::Human,
        SpriteVariant::White,
        HUMAN_SPAWN,
    );
    for (index, (cell, variant)) in BOT_SPAWNS.iter().enumerate() {
        spawn_actor(
            &mut commands,
            &sheets,
            &mut roster,
            ActorId::Bot(index as u8),
            *variant,
            *cell,
        );
    }
}

fn spawn_actor(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    roster: &mut Roster,
    id: ActorId,
    variant: SpriteVariant,
    cell: IVec2,
) {
    let idle = walk_clip(Direction::Down);
    let mut entity = commands.spawn((
        Name::new(format!("{id:?}")),
        Actor { id },
        RoundEntity,
        Facing::default(),
        Velocity::default(),
        Collider::from_size(ACTOR_SIZE),
        SpriteAnimation::stopped(idle),
        SpriteBundle {
            texture: sheets.actor_textures[variant as usize].clone(),
            transform: Transform::from_translation(cell_center(cell).extend(2.0)),
            ..default()
        },
        TextureAtlas {
            layout: sheets.actor_layout.clone(),
            index: idle.first,
        },
    ));
    if id == ActorId::Human {
        entity.insert(Human);
    } else {
        entity.insert(crate::bot::Bot::default());
    }
    roster.register(id, entity.id());
}

/// Resolves this frame's hits. A bot despawns on the spot; the human stays
/// on the board tinted red while the round freezes into `GameOver`.
pub fn apply_hits(
    mut commands: Commands,
    mut hits: EventReader<ActorHit>,
    mut roster: ResMut<Roster>,
    mut status: ResMut<RoundStatus>,
    mut next_state: ResMut<NextState<GameState>>,
    mut sprites: Query<&mut Sprite>,
) {
    for hit in hits.read() {
        let Some(entity) = roster.kill(hit.id) else {
            continue;
        };
        match hit.id {
            ActorId::Human => {
                if let Ok(mut sprite) = sprites.get_mut(entity) {
                    sprite.color = DEATH_TINT;
                }
                next_state.set(GameState::GameOver);
                info!("the player was caught by the blast");
            }
            ActorId::Bot(_) => {
                commands.entity(entity).despawn_recursive();
                info!("a bot went down; {} remain", roster.live_bots());
                if roster.live_bots() == 0 && roster.human_alive() {
                    *status = RoundStatus::Won;
                    info!("all bots destroyed; the round is won");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits_app() -> App {
        let mut app = App::new();
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.init_state::<GameState>();
        app.init_resource::<Roster>();
        app.init_resource::<RoundStatus>();
        app.add_event::<ActorHit>();
        app.add_systems(Update, apply_hits);
        app
    }

    fn register_actor(app: &mut App, id: ActorId) -> Entity {
        let entity = app.world_mut().spawn(Sprite::default()).id();
        app.world_mut()
            .resource_mut::<Roster>()
            .register(id, entity);
        entity
    }

    #[test]
    fn kill_yields_the_entity_once() {
        let mut roster = Roster::default();
        roster.register(ActorId::Bot(0), Entity::from_raw(5));
        assert!(roster.is_alive(ActorId::Bot(0)));
        assert!(roster.kill(ActorId::Bot(0)).is_some());
        assert!(roster.kill(ActorId::Bot(0)).is_none());
        assert!(!roster.is_alive(ActorId::Bot(0)));
        assert!(roster.kill(ActorId::Bot(7)).is_none());
    }

    #[test]
    fn live_bots_ignores_the_human_and_the_dead() {
        let mut roster = Roster::default();
        roster.register(ActorId::Human, Entity::from_raw(1));
        roster.register(ActorId::Bot(0), Entity::from_raw(2));
        roster.register(ActorId::Bot(1), Entity::from_raw(3));
        assert_eq!(roster.live_bots(), 2);
        roster.kill(ActorId::Bot(1));
        assert_eq!(roster.live_bots(), 1);
        assert!(roster.human_alive());
    }

    #[test]
    fn human_hit_freezes_the_round() {
        let mut app = hits_app();
        let human = register_actor(&mut app, ActorId::Human);
        register_actor(&mut app, ActorId::Bot(0));

        app.world_mut().send_event(ActorHit { id: ActorId::Human });
        app.update();
        app.update();

        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::GameOver
        );
        let sprite = app.world().get::<Sprite>(human).unwrap();
        assert_eq!(sprite.color, DEATH_TINT);
        assert!(!app.world().resource::<Roster>().human_alive());
        // The body stays on the board for the game-over scene.
        assert!(app.world().get_entity(human).is_some());
    }

    #[test]
    fn last_bot_down_wins_the_round() {
        let mut app = hits_app();
        register_actor(&mut app, ActorId::Human);
        let bots = [
            register_actor(&mut app, ActorId::Bot(0)),
            register_actor(&mut app, ActorId::Bot(1)),
            register_actor(&mut app, ActorId::Bot(2)),
        ];

        app.world_mut().send_event(ActorHit { id: ActorId::Bot(0) });
        app.world_mut().send_event(ActorHit { id: ActorId::Bot(1) });
        app.update();
        assert_eq!(
            *app.world().resource::<RoundStatus>(),
            RoundStatus::InProgress
        );
        assert!(app.world().get_entity(bots[0]).is_none());

        app.world_mut().send_event(ActorHit { id: ActorId::Bot(2) });
        app.update();
        assert_eq!(*app.world().resource::<RoundStatus>(), RoundStatus::Won);
        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::Loading,
            "victory must not change state",
        );
    }

    #[test]
    fn no_victory_for_a_dead_human() {
        let mut app = hits_app();
        register_actor(&mut app, ActorId::Human);
        register_actor(&mut app, ActorId::Bot(0));

        app.world_mut().send_event(ActorHit { id: ActorId::Human });
        app.world_mut().send_event(ActorHit { id: ActorId::Bot(0) });
        app.update();

        assert_eq!(
            *app.world().resource::<RoundStatus>(),
            RoundStatus::InProgress
        );
    }

    #[test]
    fn duplicate_hits_in_one_blast_land_once() {
        let mut app = hits_app();
        register_actor(&mut app, ActorId::Human);
        let bot = register_actor(&mut app, ActorId::Bot(0));
        register_actor(&mut app, ActorId::Bot(1));

        // Two overlapping flames report the same victim.
        app.world_mut().send_event(ActorHit { id: ActorId::Bot(0) });
        app.world_mut().send_event(ActorHit { id: ActorId::Bot(0) });
        app.update();

        assert!(app.world().get_entity(bot).is_none());
        assert_eq!(app.world().resource::<Roster>().live_bots(), 1);
        assert_eq!(
            *app.world().resource::<RoundStatus>(),
            RoundStatus::InProgress
        );
    }
}
