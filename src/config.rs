//! Show configuration, loaded from `assets/show.ron` through the asset server.
//!
//! The built-in show is in place from the first frame. The loading screen
//! waits until the file has either replaced it or failed to load.

use std::time::Duration;

use bevy::{
    asset::{AssetLoadFailedEvent, AssetLoader, LoadContext, io::Reader},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    device::DeviceProfile,
    fireworks::tuning::{self, FireworksTuning},
    greeting::Greeting,
};

/// Asset path of the show config.
pub const CONFIG_PATH: &str = "show.ron";

pub(super) fn plugin(app: &mut App) {
    app.init_asset::<ShowConfig>();
    app.init_asset_loader::<ShowConfigLoader>();

    app.init_resource::<ShowConfig>();
    app.init_resource::<ConfigStatus>();
    app.init_resource::<ShowConfigHandle>();

    app.add_systems(Update, (apply_loaded_config, report_failed_config));
}

#[derive(Asset, Resource, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    /// The moment the countdown runs to, in milliseconds since the Unix epoch.
    pub target_unix_ms: Option<u64>,
    /// Countdown length used when there is no target moment, or no wall clock.
    pub countdown_secs: u64,
    /// How long every greeting stays on screen.
    pub greeting_secs: f32,
    pub splash_secs: f32,
    /// Forces the device profile instead of guessing it from the window width.
    pub constrained: Option<bool>,
    pub greetings: Vec<Greeting>,
    /// Missing fields keep the desktop values.
    #[serde(deserialize_with = "tuning::desktop_overrides")]
    pub desktop_fireworks: FireworksTuning,
    /// Missing fields keep the constrained values.
    #[serde(deserialize_with = "tuning::constrained_overrides")]
    pub constrained_fireworks: FireworksTuning,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            target_unix_ms: None,
            countdown_secs: 10,
            greeting_secs: 4.0,
            splash_secs: 2.5,
            constrained: None,
            greetings: crate::greeting::default_greetings(),
            desktop_fireworks: FireworksTuning::for_profile(false),
            constrained_fireworks: FireworksTuning::for_profile(true),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

impl ShowConfig {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config = ron::de::from_bytes::<ShowConfig>(bytes)?;

        Ok(config)
    }

    pub fn fireworks_tuning(&self, profile: DeviceProfile) -> FireworksTuning {
        if profile.constrained {
            self.constrained_fireworks
        } else {
            self.desktop_fireworks
        }
    }

    /// Time left until the target moment, given the current wall clock time.
    pub fn countdown(&self, now_unix_ms: Option<u64>) -> Duration {
        match (self.target_unix_ms, now_unix_ms) {
            (Some(target), Some(now)) => Duration::from_millis(target.saturating_sub(now)),
            _ => Duration::from_secs(self.countdown_secs),
        }
    }

    pub fn greeting_slot(&self) -> Duration {
        Duration::try_from_secs_f32(self.greeting_secs).unwrap_or(Duration::ZERO)
    }

    pub fn splash_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.splash_secs).unwrap_or(Duration::ZERO)
    }
}

#[derive(Default)]
struct ShowConfigLoader;

impl AssetLoader for ShowConfigLoader {
    type Asset = ShowConfig;
    type Settings = ();
    type Error = ConfigError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;

        ShowConfig::from_bytes(&bytes)
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}

/// Where the active [`ShowConfig`] came from.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigStatus {
    /// The file is still loading, the built-in show is active.
    #[default]
    Loading,
    /// The file loaded and replaced the built-in show.
    Loaded,
    /// The file could not be loaded, the built-in show stays.
    BuiltIn,
}

impl ConfigStatus {
    pub fn is_settled(self) -> bool {
        self != ConfigStatus::Loading
    }
}

/// Run condition: the config will not change before the show starts.
pub fn config_settled(status: Res<ConfigStatus>) -> bool {
    status.is_settled()
}

#[derive(Resource)]
pub struct ShowConfigHandle(pub Handle<ShowConfig>);

impl FromWorld for ShowConfigHandle {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self(assets.load(CONFIG_PATH))
    }
}

fn apply_loaded_config(
    mut events: EventReader<AssetEvent<ShowConfig>>,
    handle: Res<ShowConfigHandle>,
    configs: Res<Assets<ShowConfig>>,
    mut config: ResMut<ShowConfig>,
    mut status: ResMut<ConfigStatus>,
) {
    for event in events.read() {
        let (AssetEvent::LoadedWithDependencies { id } | AssetEvent::Modified { id }) = event
        else {
            continue;
        };
        if *id != handle.0.id() {
            continue;
        }
        let Some(loaded) = configs.get(*id) else {
            continue;
        };

        info!("Loaded show config from {CONFIG_PATH}.");
        *config = loaded.clone();
        *status = ConfigStatus::Loaded;
    }
}

fn report_failed_config(
    mut failures: EventReader<AssetLoadFailedEvent<ShowConfig>>,
    handle: Res<ShowConfigHandle>,
    mut status: ResMut<ConfigStatus>,
) {
    for failure in failures.read() {
        if failure.id != handle.0.id() {
            continue;
        }

        warn!("{}, using the built-in show.", failure.error);
        if !status.is_settled() {
            *status = ConfigStatus::BuiltIn;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const SHIPPED: &[u8] = include_bytes!("../assets/show.ron");

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        app
    }

    /// Updates until the config settles, or gives up after a few seconds.
    fn settle(app: &mut App) -> ConfigStatus {
        for _ in 0..500 {
            app.update();
            let status = *app.world().resource::<ConfigStatus>();
            if status.is_settled() {
                return status;
            }
            thread::sleep(Duration::from_millis(10));
        }
        *app.world().resource::<ConfigStatus>()
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ShowConfig::from_bytes(
            br#"(
                target_unix_ms: Some(1000),
                constrained: Some(true),
                constrained_fireworks: (spawn_chance: 0.5),
            )"#,
        )
        .unwrap();

        assert_eq!(config.target_unix_ms, Some(1000));
        assert_eq!(config.greeting_secs, 4.0);
        assert_eq!(config.greetings, crate::greeting::default_greetings());
        assert_eq!(config.desktop_fireworks, FireworksTuning::DESKTOP);
        assert_eq!(config.constrained_fireworks.spawn_chance, 0.5);
        assert_eq!(
            config.constrained_fireworks.ring_count,
            FireworksTuning::CONSTRAINED.ring_count
        );
    }

    #[test]
    fn partial_mobile_override_keeps_the_mobile_ceiling() {
        let config =
            ShowConfig::from_bytes(b"(constrained_fireworks: (spawn_chance: 0.03))").unwrap();

        let mobile = config.fireworks_tuning(DeviceProfile { constrained: true });
        assert_eq!(mobile.population_ceiling, 400);
        assert_eq!(mobile.burst_base, FireworksTuning::CONSTRAINED.burst_base);
        assert_eq!(mobile.spawn_chance, 0.03);
    }

    #[test]
    fn tuning_follows_the_profile() {
        let config = ShowConfig::default();

        assert_eq!(
            config.fireworks_tuning(DeviceProfile { constrained: true }),
            FireworksTuning::CONSTRAINED
        );
        assert_eq!(
            config.fireworks_tuning(DeviceProfile { constrained: false }),
            FireworksTuning::DESKTOP
        );
    }

    #[test]
    fn countdown_uses_the_target_when_the_clock_is_known() {
        let config = ShowConfig {
            target_unix_ms: Some(10_000),
            countdown_secs: 3,
            ..default()
        };

        assert_eq!(config.countdown(Some(4_000)), Duration::from_millis(6_000));
        assert_eq!(config.countdown(Some(20_000)), Duration::ZERO);
        assert_eq!(config.countdown(None), Duration::from_secs(3));
    }

    #[test]
    fn shipped_config_matches_the_built_in_show() {
        let config = ShowConfig::from_bytes(SHIPPED).unwrap();

        assert_eq!(config.greetings, ShowConfig::default().greetings);
        assert_eq!(config.desktop_fireworks, FireworksTuning::DESKTOP);
        assert_eq!(config.constrained_fireworks, FireworksTuning::CONSTRAINED);
        assert!(config.target_unix_ms.is_some());
    }

    #[test]
    fn malformed_config_is_a_ron_error() {
        let err = ShowConfig::from_bytes(b"(greeting_secs: \"soon\")").unwrap_err();

        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn asset_server_replaces_the_built_in_show() {
        let mut app = app();
        app.add_plugins(plugin);
        assert_eq!(*app.world().resource::<ConfigStatus>(), ConfigStatus::Loading);

        assert_eq!(settle(&mut app), ConfigStatus::Loaded);
        let shipped = ShowConfig::from_bytes(SHIPPED).unwrap();
        assert_eq!(*app.world().resource::<ShowConfig>(), shipped);
    }

    #[test]
    fn missing_file_keeps_the_built_in_show() {
        let mut app = app();
        app.add_plugins(plugin);
        let handle = app
            .world()
            .resource::<AssetServer>()
            .load::<ShowConfig>("does/not/exist.ron");
        app.insert_resource(ShowConfigHandle(handle));

        assert_eq!(settle(&mut app), ConfigStatus::BuiltIn);
        assert_eq!(*app.world().resource::<ShowConfig>(), ShowConfig::default());
    }
}
