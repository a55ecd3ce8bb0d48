//! Game-over UI. Spawns a simple overlay when the round is lost and removes
//! it when the restart kicks in.
//!
//! UI entities are part of Bevy's ECS; once despawned, all associated style/
//! text components are dropped automatically.

use bevy::prelude::*;

use crate::state::GameState;

/// Registers game-over overlay spawn/despawn systems.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::GameOver), spawn_game_over_banner)
            .add_systems(OnExit(GameState::GameOver), despawn_game_over_banner);
    }
}

#[derive(Component)]
struct GameOverBanner;

/// Spawns a full-screen UI node with centered text over the frozen arena.
/// Nodes live in the `Ui` world and are rendered by the UI camera
/// automatically.
fn spawn_game_over_banner(mut commands: Commands) {
    commands
        .spawn((
            GameOverBanner,
            Name::new("GameOverBanner"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.4)),
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Game Over",
                TextStyle {
                    font_size: 32.0,
                    color: Color::srgba(1.0, 1.0, 1.0, 1.0),
                    ..default()
                },
            ));
        });
}

/// Removes the banner when the next round starts.
fn despawn_game_over_banner(mut commands: Commands, query: Query<Entity, With<GameOverBanner>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn banner_appears_with_its_message() {
        let mut app = App::new();
        app.world_mut().run_system_once(spawn_game_over_banner);

        let mut banners = app.world_mut().query::<&GameOverBanner>();
        assert_eq!(banners.iter(app.world()).count(), 1);
        let mut texts = app.world_mut().query::<&Text>();
        let text = texts.single(app.world());
        assert_eq!(text.sections[0].value, "Game Over");
    }

    #[test]
    fn banner_leaves_with_the_restart() {
        let mut app = App::new();
        app.world_mut().run_system_once(spawn_game_over_banner);
        app.world_mut().run_system_once(despawn_game_over_banner);

        let mut banners = app.world_mut().query::<&GameOverBanner>();
        assert_eq!(banners.iter(app.world()).count(), 0);
        let mut texts = app.world_mut().query::<&Text>();
        assert_eq!(texts.iter(app.world()).count(), 0);
    }
}
