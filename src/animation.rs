//! Frame-range sprite animation over texture atlas indices.
//!
//! Clips advance on a repeating timer, entirely decoupled from rendering:
//! the fire lifetime check reads [`SpriteAnimation::finished`] whether or not
//! a texture ever loaded, so the simulation behaves the same headless.

use bevy::prelude::*;
use std::time::Duration;

use crate::actor::{Facing, SpriteVariant};
use crate::grid::Direction;
use crate::state::{GameSet, GameState};

/// Bomb wobble: four frames looping slowly for the whole fuse.
pub const BOMB_CLIP: Clip = Clip::looping(0, 3, 4);
/// Fire burst: four frames at speed, played through twice, then done.
pub const FIRE_CLIP: Clip = Clip::times(0, 3, 12, 2);

/// Walk cycle for one facing. The 12-frame character sheets pack three frames
/// per direction in the order up, left, down, right.
pub fn walk_clip(direction: Direction) -> Clip {
    match direction {
        Direction::Up => Clip::looping(0, 2, 10),
        Direction::Left => Clip::looping(3, 5, 10),
        Direction::Down => Clip::looping(6, 8, 10),
        Direction::Right => Clip::looping(9, 11, 10),
    }
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpriteSheets>()
            .add_systems(OnEnter(GameState::Loading), load_sprite_sheets)
            .add_systems(
                Update,
                (sync_actor_clips, advance_animations)
                    .chain()
                    .in_set(GameSet::Effects),
            );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Loop,
    /// Play the frame range this many times, then hold the last frame.
    Times(u32),
}

/// A contiguous frame range in a texture atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub first: usize,
    pub last: usize,
    pub fps: u32,
    pub repeat: Repeat,
}

impl Clip {
    pub const fn looping(first: usize, last: usize, fps: u32) -> Self {
        Self {
            first,
            last,
            fps,
            repeat: Repeat::Loop,
        }
    }

    pub const fn times(first: usize, last: usize, fps: u32, plays: u32) -> Self {
        Self {
            first,
            last,
            fps,
            repeat: Repeat::Times(plays),
        }
    }
}

#[derive(Component)]
pub struct SpriteAnimation {
    clip: Clip,
    timer: Timer,
    frame: usize,
    plays: u32,
    playing: bool,
    finished: bool,
}

impl SpriteAnimation {
    pub fn new(clip: Clip) -> Self {
        Self {
            clip,
            timer: Timer::from_seconds(1.0 / clip.fps as f32, TimerMode::Repeating),
            frame: clip.first,
            plays: 0,
            playing: true,
            finished: false,
        }
    }

    /// A clip parked on its first frame, for actors standing still at spawn.
    pub fn stopped(clip: Clip) -> Self {
        let mut anim = Self::new(clip);
        anim.playing = false;
        anim
    }

    /// Switches to `clip`, restarting only if it differs from the current
    /// one, so calling this every frame does not pin the first frame.
    pub fn play(&mut self, clip: Clip) {
        if self.clip != clip {
            *self = Self::new(clip);
        } else {
            self.playing = true;
        }
    }

    /// Freezes on the current frame. `play` resumes.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn advance(&mut self, delta: Duration) {
        if !self.playing || self.finished {
            return;
        }
        self.timer.tick(delta);
        for _ in 0..self.timer.times_finished_this_tick() {
            self.step();
            if self.finished {
                break;
            }
        }
    }

    fn step(&mut self) {
        if self.frame < self.clip.last {
            self.frame += 1;
            return;
        }
        match self.clip.repeat {
            Repeat::Loop => self.frame = self.clip.first,
            Repeat::Times(plays) => {
                self.plays += 1;
                if self.plays >= plays {
                    self.finished = true;
                } else {
                    self.frame = self.clip.first;
                }
            }
        }
    }
}

/// Atlas layouts plus the sheet textures everything spawns with. Handles are
/// queued during `Loading`; sprites stay as plain tinted quads until the PNGs
/// exist on disk.
#[derive(Resource, Default)]
pub struct SpriteSheets {
    pub actor_layout: Handle<TextureAtlasLayout>,
    pub effect_layout: Handle<TextureAtlasLayout>,
    pub actor_textures: [Handle<Image>; 4],
    pub bomb_texture: Handle<Image>,
    pub fire_texture: Handle<Image>,
}

fn load_sprite_sheets(
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut sheets: ResMut<SpriteSheets>,
) {
    sheets.actor_layout = layouts.add(TextureAtlasLayout::from_grid(
        UVec2::new(17, 26),
        12,
        1,
        None,
        None,
    ));
    sheets.effect_layout =
        layouts.add(TextureAtlasLayout::from_grid(UVec2::splat(16), 4, 1, None, None));

    for variant in SpriteVariant::ALL {
        sheets.actor_textures[variant as usize] = asset_server.load(variant.texture_path());
    }
    sheets.bomb_texture = asset_server.load("sprites/bomb.png");
    sheets.fire_texture = asset_server.load("sprites/fire.png");

    info!("Queued sprite sheets. Add PNG files under assets/sprites/ for textured rendering.");
}

/// Matches each actor's walk clip to where it is heading, or freezes the
/// cycle when it stands still.
fn sync_actor_clips(mut query: Query<(&Facing, &mut SpriteAnimation)>) {
    for (facing, mut anim) in &mut query {
        if facing.moving {
            anim.play(walk_clip(facing.direction));
        } else {
            anim.stop();
        }
    }
}

pub fn advance_animations(
    time: Res<Time>,
    mut query: Query<(&mut SpriteAnimation, Option<&mut TextureAtlas>)>,
) {
    for (mut anim, atlas) in &mut query {
        anim.advance(time.delta());
        if let Some(mut atlas) = atlas {
            atlas.index = anim.frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance_ms(anim: &mut SpriteAnimation, millis: u64) {
        anim.advance(Duration::from_millis(millis));
    }

    #[test]
    fn looping_clip_wraps_around() {
        let mut anim = SpriteAnimation::new(BOMB_CLIP);
        assert_eq!(anim.frame(), 0);
        advance_ms(&mut anim, 250);
        assert_eq!(anim.frame(), 1);
        advance_ms(&mut anim, 750);
        assert_eq!(anim.frame(), 0);
        assert!(!anim.finished());
    }

    #[test]
    fn counted_clip_finishes_on_last_frame() {
        let mut anim = SpriteAnimation::new(FIRE_CLIP);
        advance_ms(&mut anim, 600);
        assert!(!anim.finished());
        advance_ms(&mut anim, 67);
        assert!(anim.finished());
        assert_eq!(anim.frame(), 3);
        // Further time changes nothing once finished.
        advance_ms(&mut anim, 1000);
        assert_eq!(anim.frame(), 3);
    }

    #[test]
    fn replaying_the_same_clip_does_not_restart() {
        let mut anim = SpriteAnimation::new(BOMB_CLIP);
        advance_ms(&mut anim, 300);
        assert_eq!(anim.frame(), 1);
        anim.play(BOMB_CLIP);
        assert_eq!(anim.frame(), 1);
        anim.play(FIRE_CLIP);
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn stop_freezes_and_play_resumes() {
        let mut anim = SpriteAnimation::new(walk_clip(Direction::Right));
        advance_ms(&mut anim, 120);
        assert_eq!(anim.frame(), 10);
        anim.stop();
        advance_ms(&mut anim, 500);
        assert_eq!(anim.frame(), 10);
        anim.play(walk_clip(Direction::Right));
        advance_ms(&mut anim, 120);
        assert_eq!(anim.frame(), 11);
    }

    #[test]
    fn walk_clips_cover_distinct_sheet_rows() {
        let ups = walk_clip(Direction::Up);
        let rights = walk_clip(Direction::Right);
        assert_eq!((ups.first, ups.last), (0, 2));
        assert_eq!((rights.first, rights.last), (9, 11));
        assert_ne!(walk_clip(Direction::Left), walk_clip(Direction::Down));
    }
}
