//! The fireworks background of the main screen.
//!
//! The simulation itself lives in the submodules and knows nothing about Bevy
//! beyond its math and color types. This module owns the window-facing side:
//! the driver paints into a [`DrawList`], which [`render`] replays as sprites
//! behind the rest of the UI.

pub mod burst;
pub mod driver;
pub mod particle;
mod render;
pub mod surface;
pub mod tuning;

use bevy::{
    prelude::*,
    window::{PrimaryWindow, WindowResized},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    AppSystems, PausableSystems, config::ShowConfig, device::DeviceProfile, screens::Screen,
};
use driver::FireworksDriver;
use surface::{DrawList, Surface};

pub(super) fn plugin(app: &mut App) {
    app.add_event::<FireworkExploded>();
    app.add_plugins(render::plugin);

    app.add_systems(OnEnter(Screen::Main), spawn_fireworks);
    app.add_systems(OnExit(Screen::Main), despawn_fireworks);

    app.add_systems(
        Update,
        (
            track_window_resize.in_set(AppSystems::RecordInput),
            ignite_on_click
                .in_set(AppSystems::RecordInput)
                .in_set(PausableSystems),
            (run_fireworks.in_set(PausableSystems), render::paint_fireworks)
                .chain()
                .in_set(AppSystems::Update),
        )
            .run_if(in_state(Screen::Main).and(resource_exists::<Fireworks>)),
    );
}

/// Sent once for every explosion.
#[derive(Event, Debug, Clone, Copy)]
pub struct FireworkExploded;

#[derive(Resource)]
pub struct Fireworks {
    pub driver: FireworksDriver,
    draws: DrawList,
    /// The image the fireworks camera renders into.
    target: Handle<Image>,
    /// Sprites reused from frame to frame.
    sprites: Vec<Entity>,
    rng: StdRng,
}

#[derive(Component)]
struct FireworksLayer;

fn spawn_fireworks(
    window_query: Query<&Window, With<PrimaryWindow>>,
    profile: Res<DeviceProfile>,
    config: Res<ShowConfig>,
    mut images: ResMut<Assets<Image>>,
    mut commands: Commands,
) {
    let Ok(window) = window_query.single() else {
        warn!("No primary window to draw on, the fireworks stay off.");
        return;
    };

    let draws = DrawList::new(window_size(window));
    let target = images.add(render::render_target(draws.size()));

    let tuning = config.fireworks_tuning(*profile);
    let mut driver = FireworksDriver::new(tuning);
    driver.start();

    info!(
        "Fireworks started on a {}x{} surface (ceiling {}).",
        draws.size().x,
        draws.size().y,
        tuning.population_ceiling
    );

    commands.spawn((
        render::fireworks_camera(target.clone()),
        StateScoped(Screen::Main),
    ));
    commands.spawn((
        Name::new("Fireworks"),
        FireworksLayer,
        ImageNode::new(target.clone()),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        GlobalZIndex(-1),
        Pickable::IGNORE,
        StateScoped(Screen::Main),
    ));

    commands.insert_resource(Fireworks {
        driver,
        draws,
        target,
        sprites: Vec::new(),
        rng: StdRng::from_os_rng(),
    });
}

fn despawn_fireworks(fireworks: Option<ResMut<Fireworks>>, mut commands: Commands) {
    if let Some(mut fireworks) = fireworks {
        fireworks.driver.stop();
        commands.remove_resource::<Fireworks>();
    }
}

fn track_window_resize(
    mut resize_events: EventReader<WindowResized>,
    primary_query: Query<(), With<PrimaryWindow>>,
    mut fireworks: ResMut<Fireworks>,
) {
    for event in resize_events.read() {
        if primary_query.contains(event.window) {
            let size = Vec2::new(event.width, event.height).max(Vec2::ONE).as_uvec2();
            fireworks.driver.resize(size);
        }
    }
}

fn ignite_on_click(
    mouse: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    interaction_query: Query<&Interaction>,
    mut fireworks: ResMut<Fireworks>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }

    // Clicks on buttons are not ignitions.
    if interaction_query.iter().any(|i| *i != Interaction::None) {
        return;
    }

    let Some(cursor) = window_query.single().ok().and_then(|w| w.cursor_position()) else {
        return;
    };

    fireworks.driver.ignite(cursor);
}

fn run_fireworks(
    time: Res<Time>,
    mut fireworks: ResMut<Fireworks>,
    mut exploded_events: EventWriter<FireworkExploded>,
) {
    let Fireworks { driver, draws, rng, .. } = fireworks.as_mut();

    let mut explosions = 0;
    driver.advance(time.delta_secs(), draws, rng, &mut || explosions += 1);

    for _ in 0..explosions {
        exploded_events.write(FireworkExploded);
    }
}

fn window_size(window: &Window) -> UVec2 {
    Vec2::new(window.width(), window.height())
        .max(Vec2::ONE)
        .as_uvec2()
}
