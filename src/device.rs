//! The device tier, decided once when the show config has loaded.

use bevy::{prelude::*, window::PrimaryWindow};

use crate::{config::ShowConfig, screens::Screen};

/// Windows narrower than this, in logical pixels, get the constrained profile.
const CONSTRAINED_WIDTH: f32 = 768.0;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<DeviceProfile>();
    app.init_resource::<DeviceProfile>();
    app.add_systems(OnExit(Screen::Loading), detect_device_profile);
}

/// Selects the cheaper simulation constants on small (mobile) screens.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Resource)]
pub struct DeviceProfile {
    pub constrained: bool,
}

impl DeviceProfile {
    pub fn from_viewport_width(width: f32) -> Self {
        Self {
            constrained: width < CONSTRAINED_WIDTH,
        }
    }

    fn detect(forced: Option<bool>, viewport_width: Option<f32>) -> Self {
        match (forced, viewport_width) {
            (Some(constrained), _) => Self { constrained },
            (None, Some(width)) => Self::from_viewport_width(width),
            (None, None) => Self::default(),
        }
    }
}

fn detect_device_profile(
    window_query: Query<&Window, With<PrimaryWindow>>,
    config: Res<ShowConfig>,
    mut profile: ResMut<DeviceProfile>,
) {
    let width = window_query.single().ok().map(Window::width);
    *profile = DeviceProfile::detect(config.constrained, width);

    info!("Device profile: {:?} (window width {:?}).", *profile, width);
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;

    #[test]
    fn narrow_viewports_are_constrained() {
        assert!(DeviceProfile::from_viewport_width(375.0).constrained);
        assert!(DeviceProfile::from_viewport_width(767.9).constrained);
        assert!(!DeviceProfile::from_viewport_width(768.0).constrained);
        assert!(!DeviceProfile::from_viewport_width(1920.0).constrained);
    }

    #[test]
    fn config_override_wins() {
        assert!(DeviceProfile::detect(Some(true), Some(1920.0)).constrained);
        assert!(!DeviceProfile::detect(Some(false), Some(320.0)).constrained);
        assert!(DeviceProfile::detect(None, Some(320.0)).constrained);
        assert!(!DeviceProfile::detect(None, None).constrained);
    }

    #[test]
    fn profile_is_decided_once_after_loading() {
        let mut app = App::new();
        app.add_plugins(StatesPlugin);
        app.init_state::<Screen>();
        app.insert_resource(ShowConfig {
            constrained: Some(true),
            ..default()
        });
        app.add_plugins(plugin);
        let go_to = |app: &mut App, screen| {
            app.world_mut()
                .resource_mut::<NextState<Screen>>()
                .set(screen);
            app.update();
        };

        app.update();
        assert!(!app.world().resource::<DeviceProfile>().constrained);

        go_to(&mut app, Screen::Countdown);
        assert!(app.world().resource::<DeviceProfile>().constrained);

        app.world_mut().resource_mut::<ShowConfig>().constrained = Some(false);
        go_to(&mut app, Screen::Main);
        assert!(app.world().resource::<DeviceProfile>().constrained);
    }
}
