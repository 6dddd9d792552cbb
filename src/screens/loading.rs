//! Holds the show until its config has loaded.

use bevy::prelude::*;

use crate::{
    config::{ConfigStatus, config_settled},
    screens::Screen,
    theme::{palette::*, widget},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Loading), spawn_loading_screen);

    app.add_systems(
        Update,
        enter_countdown.run_if(in_state(Screen::Loading).and(config_settled)),
    );
}

fn spawn_loading_screen(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Loading Screen"),
        BackgroundColor(Color::BLACK),
        StateScoped(Screen::Loading),
        children![widget::sized_label("加载中…", 16.0, FAINT_TEXT)],
    ));
}

fn enter_countdown(status: Res<ConfigStatus>, mut next_screen: ResMut<NextState<Screen>>) {
    debug!("Show config settled: {:?}.", *status);
    next_screen.set(Screen::Countdown);
}
