//! Development tools for the show. This plugin is only enabled in dev builds.

use bevy::{
    dev_tools::states::log_transitions, input::common_conditions::input_just_pressed, prelude::*,
    ui::UiDebugOptions,
};
use bevy_inspector_egui::{bevy_egui::EguiPlugin, quick::WorldInspectorPlugin};

use crate::{Pause, config::ShowConfig, fireworks::Fireworks, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    // Log `Screen` and `Pause` state transitions.
    app.add_systems(Update, (log_transitions::<Screen>, log_transitions::<Pause>));

    app.add_plugins(EguiPlugin {
        enable_multipass_for_primary_context: true,
    });
    app.add_plugins(WorldInspectorPlugin::new());

    // Toggle the debug overlay for UI.
    app.add_systems(
        Update,
        toggle_debug_ui.run_if(input_just_pressed(TOGGLE_KEY)),
    );

    // Report the particle population on demand.
    app.add_systems(
        Update,
        log_fireworks_population
            .run_if(resource_exists::<Fireworks>.and(input_just_pressed(POPULATION_KEY))),
    );

    // Print the active show config, a starting point for `assets/show.ron`.
    app.add_systems(OnExit(Screen::Loading), print_show_config);
}

const TOGGLE_KEY: KeyCode = KeyCode::Backquote;
const POPULATION_KEY: KeyCode = KeyCode::F3;

fn print_show_config(config: Res<ShowConfig>) {
    match ron::ser::to_string_pretty(&*config, ron::ser::PrettyConfig::default()) {
        Ok(text) => debug!("Show config:\n{text}"),
        Err(err) => warn!("Could not print the show config: {err}"),
    }
}

fn toggle_debug_ui(mut options: ResMut<UiDebugOptions>) {
    options.toggle();
}

fn log_fireworks_population(fireworks: Res<Fireworks>) {
    let driver = &fireworks.driver;
    info!(
        "Fireworks {}: {} / {} particles.",
        if driver.is_running() { "running" } else { "stopped" },
        driver.population(),
        driver.tuning().population_ceiling
    );
}
