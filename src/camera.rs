//! Fixed arena camera. The whole board fits on screen at once, so instead of
//! following anyone the camera parks over the arena centre and lets the
//! projection scale with the window.

use bevy::prelude::*;
use bevy::render::camera::ScalingMode;

use crate::grid::TileGrid;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(PostUpdate, fit_camera_to_arena);
    }
}

/// Marker component so the fit system can locate the camera entity without
/// relying on names.
#[derive(Component)]
pub struct ArenaCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("ArenaCamera"),
        ArenaCamera,
        Camera2dBundle::default(),
    ));
}

/// Re-centres and re-scales whenever the grid resource changes, including its
/// initial insert. `AutoMin` keeps the full board visible at any window size
/// without distorting the pixel grid.
fn fit_camera_to_arena(
    grid: Res<TileGrid>,
    mut camera_query: Query<(&mut Transform, &mut OrthographicProjection), With<ArenaCamera>>,
) {
    if !grid.is_changed() {
        return;
    }
    let Ok((mut transform, mut projection)) = camera_query.get_single_mut() else {
        return;
    };

    let size = grid.size_px();
    projection.scaling_mode = ScalingMode::AutoMin {
        min_width: size.x,
        min_height: size.y,
    };
    transform.translation.x = size.x * 0.5;
    transform.translation.y = -size.y * 0.5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_centres_on_the_arena() {
        let mut app = App::new();
        app.insert_resource(TileGrid::default());
        app.add_systems(Startup, spawn_camera);
        app.add_systems(PostUpdate, fit_camera_to_arena);

        app.update();

        let mut query = app
            .world_mut()
            .query_filtered::<&Transform, With<ArenaCamera>>();
        let transform = query.single(app.world());
        assert_eq!(transform.translation.truncate(), Vec2::new(120.0, -120.0));
    }
}
