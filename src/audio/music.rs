use bevy::prelude::*;

use crate::screens::Screen;

const COUNTDOWN_VOLUME: f32 = 0.3;
const BACKGROUND_VOLUME: f32 = 0.25;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<MusicAssets>();
    app.init_resource::<MusicAssets>();

    app.add_systems(OnEnter(Screen::Countdown), start_countdown_music);
    app.add_systems(OnEnter(Screen::Splash), stop_countdown_music);
    app.add_systems(OnEnter(Screen::Main), start_background_music);
}

#[derive(Resource, Clone, Reflect)]
#[reflect(Resource)]
pub struct MusicAssets {
    countdown: Handle<AudioSource>,
    background: Handle<AudioSource>,
}

impl FromWorld for MusicAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();

        Self {
            countdown: assets.load::<AudioSource>("audio/music/countdown.ogg"),
            background: assets.load::<AudioSource>("audio/music/background.ogg"),
        }
    }
}

/// Keeps playing through the final three seconds.
#[derive(Component)]
pub struct CountdownMusic;

fn start_countdown_music(
    music_query: Query<(), With<CountdownMusic>>,
    music_assets: Res<MusicAssets>,
    mut commands: Commands,
) {
    if music_query.is_empty() {
        commands.spawn((
            Name::new("Countdown Music"),
            CountdownMusic,
            super::music(music_assets.countdown.clone(), COUNTDOWN_VOLUME),
        ));
    }
}

fn stop_countdown_music(music_query: Query<Entity, With<CountdownMusic>>, mut commands: Commands) {
    for entity in &music_query {
        commands.entity(entity).despawn();
    }
}

fn start_background_music(music_assets: Res<MusicAssets>, mut commands: Commands) {
    commands.spawn((
        Name::new("Background Music"),
        super::music(music_assets.background.clone(), BACKGROUND_VOLUME),
        StateScoped(Screen::Main),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readme_lists_the_music() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        app.init_asset::<AudioSource>();
        app.init_resource::<MusicAssets>();

        let readme = include_str!("../../README.md");
        let music = app.world().resource::<MusicAssets>();
        let assets = app.world().resource::<AssetServer>();
        for track in [&music.countdown, &music.background] {
            let path = assets.get_path(track).unwrap();
            assert!(readme.contains(&format!("`{path}`")), "{path} is not in the README");
        }
    }
}
