//! Bombs and the fire they leave behind.
//!
//! Placement goes through a single-slot [`BombLock`]: whoever acquires it
//! owns the only live bomb in the arena until a deferred timer releases it.
//! The release window (3.5s) outlasts the fuse (3s), so two bombs can never
//! coexist. Detonation stamps fire on the bomb's cell and its four
//! neighbours, stopping at terrain; destructible walls burn away rather than
//! shield.

use bevy::ecs::system::SystemParam;
use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::actor::{Actor, ActorHit, Human};
use crate::animation::{SpriteAnimation, SpriteSheets, BOMB_CLIP, FIRE_CLIP};
use crate::audio::AudioHandles;
use crate::grid::{cell_center, cell_of_world, TileGrid, TILE_SIZE};
use crate::movement::Collider;
use crate::round::{CurrentRound, DeferredAction, RoundEntity, RoundTimers};
use crate::state::GameSet;
use crate::walls::WallGrid;

pub struct BombPlugin;

impl Plugin for BombPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BombSettings>()
            .init_resource::<BombLock>()
            .add_systems(
                Update,
                (
                    place_bomb_on_input.in_set(GameSet::Input),
                    // Fires spawned by a detonation must not be aged by the
                    // frame that spawned them, so fuses tick after animations.
                    (tick_bomb_fuse, fire_hits, despawn_finished_fire)
                        .chain()
                        .in_set(GameSet::Effects)
                        .after(crate::animation::advance_animations),
                ),
            );
    }
}

#[derive(Resource)]
pub struct BombSettings {
    /// Seconds from placement to detonation.
    pub fuse_secs: f32,
    /// Seconds from placement until another bomb may be placed.
    pub cooldown_secs: f32,
}

impl Default for BombSettings {
    fn default() -> Self {
        Self {
            fuse_secs: 3.0,
            cooldown_secs: 3.5,
        }
    }
}

/// Single-slot placement lock shared by every actor in the arena. The field
/// stays private so the cooldown cannot be bypassed.
#[derive(Resource, Default)]
pub struct BombLock {
    held: bool,
}

impl BombLock {
    /// Takes the lock if it is free. The matching [`BombLock::release`] is
    /// driven by a deferred timer, not by the caller.
    pub fn try_acquire(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        true
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

#[derive(Component)]
pub struct Bomb {
    pub cell: IVec2,
    pub fuse: Timer,
}

#[derive(Component)]
pub struct Fire {
    pub cell: IVec2,
}

/// Cells a blast centred on `center` covers: the cell itself and its four
/// neighbours, minus anything blocked by terrain or off the map.
pub fn explosion_cells(grid: &TileGrid, center: IVec2) -> Vec<IVec2> {
    [IVec2::ZERO, IVec2::NEG_X, IVec2::X, IVec2::NEG_Y, IVec2::Y]
        .into_iter()
        .map(|offset| center + offset)
        .filter(|cell| !grid.is_blocking(*cell))
        .collect()
}

/// Everything bomb placement needs, bundled so the keyboard handler and the
/// bot driver share one code path.
#[derive(SystemParam)]
pub struct BombPlacer<'w, 's> {
    commands: Commands<'w, 's>,
    settings: Res<'w, BombSettings>,
    walls: Res<'w, WallGrid>,
    lock: ResMut<'w, BombLock>,
    timers: ResMut<'w, RoundTimers>,
    round: Res<'w, CurrentRound>,
    sheets: Res<'w, SpriteSheets>,
}

impl BombPlacer<'_, '_> {
    /// Tries to arm a bomb on the cell containing `origin`, snapping to the
    /// cell centre. Refused while the cell holds a wall or the lock is held.
    pub fn try_place(&mut self, origin: Vec2) -> bool {
        let cell = cell_of_world(origin);
        if self.walls.is_occupied(cell) {
            return false;
        }
        if !self.lock.try_acquire() {
            return false;
        }

        self.commands.spawn((
            Name::new("Bomb"),
            Bomb {
                cell,
                fuse: Timer::from_seconds(self.settings.fuse_secs, TimerMode::Once),
            },
            RoundEntity,
            SpriteAnimation::new(BOMB_CLIP),
            SpriteBundle {
                texture: self.sheets.bomb_texture.clone(),
                transform: Transform::from_translation(cell_center(cell).extend(1.0)),
                ..default()
            },
            TextureAtlas {
                layout: self.sheets.effect_layout.clone(),
                index: 0,
            },
        ));
        self.timers.schedule(
            self.round.id(),
            self.settings.cooldown_secs,
            DeferredAction::ReleaseBombLock,
        );
        true
    }
}

fn place_bomb_on_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    human: Query<&Transform, With<Human>>,
    mut placer: BombPlacer,
) {
    if !keyboard.just_pressed(KeyCode::Space) {
        return;
    }
    let Ok(transform) = human.get_single() else {
        return;
    };
    placer.try_place(transform.translation.truncate());
}

pub fn tick_bomb_fuse(
    mut commands: Commands,
    time: Res<Time>,
    grid: Res<TileGrid>,
    mut walls: ResMut<WallGrid>,
    sheets: Res<SpriteSheets>,
    audio: Res<AudioHandles>,
    mut bombs: Query<(Entity, &mut Bomb)>,
) {
    for (entity, mut bomb) in &mut bombs {
        bomb.fuse.tick(time.delta());
        if !bomb.fuse.finished() {
            continue;
        }
        commands.entity(entity).despawn_recursive();
        detonate(&mut commands, &grid, &mut walls, &sheets, &audio, bomb.cell);
    }
}

fn detonate(
    commands: &mut Commands,
    grid: &TileGrid,
    walls: &mut WallGrid,
    sheets: &SpriteSheets,
    audio: &AudioHandles,
    center: IVec2,
) {
    match &audio.explosion {
        Some(source) => {
            commands.spawn(AudioBundle {
                source: source.clone(),
                settings: PlaybackSettings::DESPAWN,
            });
        }
        None => warn!("no explosion cue loaded; detonating silently"),
    }

    for cell in explosion_cells(grid, center) {
        if let Some(wall) = walls.take(cell) {
            commands.entity(wall).despawn_recursive();
        }
        commands.spawn((
            Name::new("Fire"),
            Fire { cell },
            RoundEntity,
            SpriteAnimation::new(FIRE_CLIP),
            SpriteBundle {
                texture: sheets.fire_texture.clone(),
                transform: Transform::from_translation(cell_center(cell).extend(3.0)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.effect_layout.clone(),
                index: 0,
            },
        ));
    }
}

/// Reports every actor whose body overlaps a burning cell. Deduplication is
/// the roster's job; a victim covered by two flames is still one kill.
pub fn fire_hits(
    fires: Query<&Fire>,
    actors: Query<(&Actor, &Transform, &Collider)>,
    mut hits: EventWriter<ActorHit>,
) {
    for fire in &fires {
        let flame = cell_center(fire.cell);
        for (actor, transform, collider) in &actors {
            let delta = transform.translation.truncate() - flame;
            let reach = collider.half_extents + Vec2::splat(TILE_SIZE / 2.0);
            if delta.x.abs() < reach.x && delta.y.abs() < reach.y {
                hits.send(ActorHit { id: actor.id });
            }
        }
    }
}

fn despawn_finished_fire(
    mut commands: Commands,
    fires: Query<(Entity, &SpriteAnimation), With<Fire>>,
) {
    for (entity, anim) in &fires {
        if anim.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{apply_hits, ActorId, Roster, ACTOR_SIZE};
    use crate::animation::advance_animations;
    use crate::round::{tick_round_timers, RoundStatus};
    use crate::state::GameState;
    use bevy::ecs::system::RunSystemOnce;
    use proptest::prelude::*;
    use std::time::Duration;

    fn bomb_app() -> App {
        let mut app = App::new();
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.init_state::<GameState>();
        app.insert_resource(TileGrid::default());
        app.init_resource::<WallGrid>();
        app.init_resource::<BombSettings>();
        app.init_resource::<BombLock>();
        app.init_resource::<RoundTimers>();
        app.init_resource::<CurrentRound>();
        app.init_resource::<SpriteSheets>();
        app.init_resource::<AudioHandles>();
        app.init_resource::<Roster>();
        app.init_resource::<RoundStatus>();
        app.add_event::<ActorHit>();
        app.insert_resource(Time::<()>::default());
        app.add_systems(
            Update,
            (
                advance_animations,
                (tick_bomb_fuse, fire_hits, despawn_finished_fire)
                    .chain()
                    .after(advance_animations),
                apply_hits.after(fire_hits),
                tick_round_timers,
            ),
        );
        app
    }

    fn step(app: &mut App, millis: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(millis));
        app.update();
    }

    fn place(app: &mut App, origin: Vec2) -> bool {
        app.world_mut()
            .run_system_once(move |mut placer: BombPlacer| placer.try_place(origin))
    }

    fn bomb_count(app: &mut App) -> usize {
        let mut query = app.world_mut().query::<&Bomb>();
        query.iter(app.world()).count()
    }

    fn fire_cells(app: &mut App) -> Vec<IVec2> {
        let mut query = app.world_mut().query::<&Fire>();
        let mut cells: Vec<IVec2> = query.iter(app.world()).map(|f| f.cell).collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    fn spawn_actor_at(app: &mut App, id: ActorId, cell: IVec2) -> Entity {
        let entity = app
            .world_mut()
            .spawn((
                Actor { id },
                Sprite::default(),
                Transform::from_translation(cell_center(cell).extend(2.0)),
                Collider::from_size(ACTOR_SIZE),
            ))
            .id();
        app.world_mut()
            .resource_mut::<Roster>()
            .register(id, entity);
        entity
    }

    #[test]
    fn placement_snaps_to_the_cell_and_takes_the_lock() {
        let mut app = bomb_app();

        assert!(place(&mut app, Vec2::new(27.0, -210.0)));
        let mut query = app.world_mut().query::<(&Bomb, &Transform)>();
        let (bomb, transform) = query.single(app.world());
        assert_eq!(bomb.cell, IVec2::new(1, 13));
        assert_eq!(
            transform.translation.truncate(),
            cell_center(IVec2::new(1, 13))
        );
        assert!(app.world().resource::<BombLock>().is_held());

        // A second placement anywhere is refused while the lock is held.
        assert!(!place(&mut app, Vec2::new(88.0, -88.0)));
        assert_eq!(bomb_count(&mut app), 1);
    }

    #[test]
    fn placement_on_a_walled_cell_leaves_the_lock_free() {
        let mut app = bomb_app();
        let wall = app.world_mut().spawn_empty().id();
        app.world_mut()
            .resource_mut::<WallGrid>()
            .insert(IVec2::new(1, 13), wall);

        assert!(!place(&mut app, Vec2::new(24.0, -216.0)));
        assert!(!app.world().resource::<BombLock>().is_held());
        assert_eq!(bomb_count(&mut app), 0);
    }

    #[test]
    fn fuse_detonates_after_three_seconds() {
        let mut app = bomb_app();
        assert!(place(&mut app, Vec2::new(24.0, -216.0)));

        step(&mut app, 2999);
        assert_eq!(bomb_count(&mut app), 1);
        assert!(fire_cells(&mut app).is_empty());

        step(&mut app, 1);
        assert_eq!(bomb_count(&mut app), 0);
        // Corner cell: left and down neighbours are border, so the blast is
        // truncated to the centre plus right plus up.
        assert_eq!(
            fire_cells(&mut app),
            vec![IVec2::new(1, 12), IVec2::new(1, 13), IVec2::new(2, 13)]
        );
    }

    #[test]
    fn open_ground_blast_covers_all_five_cells() {
        let mut app = bomb_app();
        assert!(place(&mut app, cell_center(IVec2::new(5, 5))));
        step(&mut app, 3000);
        assert_eq!(
            fire_cells(&mut app),
            vec![
                IVec2::new(5, 4),
                IVec2::new(4, 5),
                IVec2::new(5, 5),
                IVec2::new(6, 5),
                IVec2::new(5, 6)
            ]
        );
    }

    #[test]
    fn blast_burns_walls_without_being_stopped() {
        let mut app = bomb_app();
        let wall = app.world_mut().spawn_empty().id();
        app.world_mut()
            .resource_mut::<WallGrid>()
            .insert(IVec2::new(2, 13), wall);

        assert!(place(&mut app, Vec2::new(24.0, -216.0)));
        step(&mut app, 3000);

        assert!(app.world().get_entity(wall).is_none());
        assert!(!app
            .world()
            .resource::<WallGrid>()
            .is_occupied(IVec2::new(2, 13)));
        assert!(fire_cells(&mut app).contains(&IVec2::new(2, 13)));
    }

    #[test]
    fn lock_releases_half_a_second_after_the_blast() {
        let mut app = bomb_app();
        assert!(place(&mut app, cell_center(IVec2::new(5, 5))));

        step(&mut app, 3400);
        assert!(app.world().resource::<BombLock>().is_held());
        assert!(!place(&mut app, cell_center(IVec2::new(7, 7))));

        step(&mut app, 100);
        assert!(!app.world().resource::<BombLock>().is_held());
        assert!(place(&mut app, cell_center(IVec2::new(7, 7))));
    }

    #[test]
    fn fire_burns_out_with_its_animation() {
        let mut app = bomb_app();
        assert!(place(&mut app, cell_center(IVec2::new(5, 5))));
        step(&mut app, 3000);
        assert_eq!(fire_cells(&mut app).len(), 5);

        step(&mut app, 600);
        assert_eq!(fire_cells(&mut app).len(), 5);

        step(&mut app, 100);
        assert!(fire_cells(&mut app).is_empty());
    }

    #[test]
    fn blast_destroys_a_bot_and_wins_the_round() {
        let mut app = bomb_app();
        spawn_actor_at(&mut app, ActorId::Human, IVec2::new(7, 7));
        let bot = spawn_actor_at(&mut app, ActorId::Bot(0), IVec2::new(1, 12));

        assert!(place(&mut app, Vec2::new(24.0, -216.0)));
        step(&mut app, 3000);

        assert!(app.world().get_entity(bot).is_none());
        assert_eq!(app.world().resource::<Roster>().live_bots(), 0);
        assert_eq!(*app.world().resource::<RoundStatus>(), RoundStatus::Won);
        assert!(app.world().resource::<Roster>().human_alive());
    }

    #[test]
    fn blast_catches_the_human_and_ends_the_round() {
        let mut app = bomb_app();
        let human = spawn_actor_at(&mut app, ActorId::Human, IVec2::new(1, 13));
        spawn_actor_at(&mut app, ActorId::Bot(0), IVec2::new(7, 7));

        assert!(place(&mut app, Vec2::new(24.0, -216.0)));
        step(&mut app, 3000);
        step(&mut app, 0);

        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::GameOver
        );
        assert!(!app.world().resource::<Roster>().human_alive());
        assert!(app.world().get_entity(human).is_some());
        // An actor out of the blast is untouched.
        assert_eq!(app.world().resource::<Roster>().live_bots(), 1);
    }

    #[test]
    fn actors_beyond_the_footprint_are_untouched() {
        let mut app = bomb_app();
        spawn_actor_at(&mut app, ActorId::Human, IVec2::new(7, 7));
        // Two cells below the bomb: outside the footprint.
        spawn_actor_at(&mut app, ActorId::Bot(0), IVec2::new(7, 9));

        assert!(place(&mut app, cell_center(IVec2::new(7, 7))));
        step(&mut app, 3000);
        step(&mut app, 0);

        assert!(!app.world().resource::<Roster>().human_alive());
        assert_eq!(app.world().resource::<Roster>().live_bots(), 1);
    }

    proptest! {
        #[test]
        fn blast_footprint_stays_on_walkable_cells(x in 0i32..15, y in 0i32..15) {
            let grid = TileGrid::default();
            let center = IVec2::new(x, y);
            let cells = explosion_cells(&grid, center);
            prop_assert!(cells.len() <= 5);
            for cell in &cells {
                prop_assert!(!grid.is_blocking(*cell));
                let offset = *cell - center;
                prop_assert!(offset.x.abs() + offset.y.abs() <= 1);
            }
            if !grid.is_blocking(center) {
                prop_assert!(cells.contains(&center));
            }
        }
    }
}
