//! Audio preloading and the battle music lifecycle.
//!
//! Bevy's asset system reference-counts handles; the `AudioHandles` resource
//! keeps the optional clip handles alive for the whole session. Playback
//! entities are spawned per use: a fire-and-forget one for the explosion cue
//! and a looping, marker-carrying one for the music.

use bevy::prelude::*;

use crate::state::GameState;

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_systems(OnEnter(GameState::Loading), load_audio_handles)
            .add_systems(OnEnter(GameState::Playing), start_battle_music)
            .add_systems(OnEnter(GameState::GameOver), stop_battle_music);
    }
}

/// Optional handles to the game-wide audio clips. Each `Handle` is a cheap
/// cloneable pointer into Bevy's asset storage; `None` simply means the clip
/// was never queued.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub explosion: Option<Handle<AudioSource>>,
    pub battle_music: Option<Handle<AudioSource>>,
}

/// Marker on the looping background music entity.
#[derive(Component)]
pub struct BattleMusic;

fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    handles.explosion = Some(asset_server.load("audio/explosion.ogg"));
    handles.battle_music = Some(asset_server.load("audio/battle_theme.ogg"));

    info!("Queued audio placeholders. Add actual files under assets/audio/ to enable playback.");
}

fn start_battle_music(
    mut commands: Commands,
    handles: Res<AudioHandles>,
    playing: Query<Entity, With<BattleMusic>>,
) {
    if !playing.is_empty() {
        return;
    }
    let Some(source) = handles.battle_music.clone() else {
        return;
    };
    commands.spawn((
        Name::new("BattleMusic"),
        BattleMusic,
        AudioBundle {
            source,
            settings: PlaybackSettings::LOOP,
        },
    ));
}

/// The arena goes quiet the moment the round is lost. A restart enters
/// `Playing` again and spawns a fresh loop.
fn stop_battle_music(mut commands: Commands, playing: Query<Entity, With<BattleMusic>>) {
    for entity in &playing {
        commands.entity(entity).despawn_recursive();
    }
}
