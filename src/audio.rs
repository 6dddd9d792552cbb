//! Music and sound effects.

pub mod music;
pub mod sound_effects;

use bevy::{audio::Volume, prelude::*};

use crate::Pause;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Music>();
    app.register_type::<SoundEffect>();
    app.register_type::<Muted>();
    app.init_resource::<Muted>();

    app.add_plugins((music::plugin, sound_effects::plugin));

    app.add_systems(Update, apply_mute_and_pause);
}

/// An organizational marker component that should be added to a spawned [`AudioPlayer`] if
/// it's in the general "music" category (e.g. background music, countdown music).
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Music;

/// A music audio instance.
pub fn music(handle: Handle<AudioSource>, volume: f32) -> impl Bundle {
    (
        AudioPlayer(handle),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(volume)),
        Music,
    )
}

/// An organizational marker component that should be added to a spawned [`AudioPlayer`] if
/// it's in the general "sound effect" category (e.g. explosions).
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct SoundEffect;

/// A sound effect audio instance.
pub fn sound_effect(handle: Handle<AudioSource>, volume: f32) -> impl Bundle {
    (
        AudioPlayer(handle),
        PlaybackSettings::DESPAWN.with_volume(Volume::Linear(volume)),
        SoundEffect,
    )
}

/// Silences the music and stops new sound effects from playing.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Resource)]
pub struct Muted(pub bool);

/// Music follows the mute switch and the pause state. Sinks appear a frame
/// after their player, so this runs every frame.
fn apply_mute_and_pause(
    muted: Res<Muted>,
    pause: Res<State<Pause>>,
    mut sink_query: Query<&mut AudioSink, With<Music>>,
) {
    let paused = pause.get().0;
    for mut sink in &mut sink_query {
        if muted.0 && !sink.is_muted() {
            sink.mute();
        } else if !muted.0 && sink.is_muted() {
            sink.unmute();
        }

        if paused && !sink.is_paused() {
            sink.pause();
        } else if !paused && sink.is_paused() {
            sink.play();
        }
    }
}
