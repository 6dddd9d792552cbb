//! The show's screen states and transitions between them.

mod countdown;
mod final_countdown;
mod loading;
mod main_show;
mod splash;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_state::<Screen>();

    app.add_plugins((
        countdown::plugin,
        final_countdown::plugin,
        loading::plugin,
        main_show::plugin,
        splash::plugin,
    ));
}

/// The show's screen states, in the order they play.
#[derive(States, Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[states(scoped_entities)]
pub enum Screen {
    #[default]
    Loading,
    Countdown,
    FinalCountdown,
    Splash,
    Main,
}
