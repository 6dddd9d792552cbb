use bevy::prelude::*;
use rand::seq::IndexedRandom;

use crate::{
    AppSystems,
    audio::{Muted, sound_effect},
    fireworks::FireworkExploded,
};

const FIREWORK_VOLUME: f32 = 0.4;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<FireworkSounds>();
    app.init_resource::<FireworkSounds>();

    app.add_systems(
        Update,
        play_firework_sounds
            .in_set(AppSystems::Update)
            .run_if(on_event::<FireworkExploded>),
    );
}

/// Interchangeable explosion samples, one is picked at random per explosion.
#[derive(Resource, Clone, Reflect)]
#[reflect(Resource)]
pub struct FireworkSounds {
    samples: Vec<Handle<AudioSource>>,
}

impl FromWorld for FireworkSounds {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();

        Self {
            samples: (1..=3)
                .map(|i| {
                    assets.load::<AudioSource>(format!("audio/sound_effects/firework_{i}.ogg"))
                })
                .collect(),
        }
    }
}

fn play_firework_sounds(
    mut exploded_events: EventReader<FireworkExploded>,
    muted: Res<Muted>,
    sounds: Res<FireworkSounds>,
    mut commands: Commands,
) {
    if muted.0 {
        exploded_events.clear();
        return;
    }

    let mut rng = rand::rng();
    for _ in exploded_events.read() {
        let Some(sample) = sounds.samples.choose(&mut rng) else {
            continue;
        };
        commands.spawn((
            Name::new("Firework Sound"),
            sound_effect(sample.clone(), FIREWORK_VOLUME),
        ));
    }
}
