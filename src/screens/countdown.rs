//! The long countdown to midnight.

use std::time::Duration;

use bevy::{input::common_conditions::input_just_pressed, prelude::*, ui::Val::*};

use crate::{
    AppSystems,
    config::ShowConfig,
    device::DeviceProfile,
    screens::Screen,
    theme::{BoldFont, palette::*, widget},
};

/// The last seconds are counted down on their own screen.
const HAND_OVER_AT: Duration = Duration::from_millis(3_000);

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(Screen::Countdown),
        (start_countdown, spawn_countdown_screen).chain(),
    );
    app.add_systems(OnExit(Screen::Countdown), remove_countdown);

    app.add_systems(
        Update,
        (
            tick_countdown.in_set(AppSystems::TickTimers),
            skip_countdown
                .in_set(AppSystems::RecordInput)
                .run_if(input_just_pressed(KeyCode::Enter)),
            (hand_over, update_countdown_digits)
                .chain()
                .in_set(AppSystems::Update),
        )
            .run_if(in_state(Screen::Countdown).and(resource_exists::<CountdownRemaining>)),
    );
}

/// Time left until midnight.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownRemaining(pub Duration);

impl CountdownRemaining {
    pub fn tick(&mut self, delta: Duration) {
        self.0 = self.0.saturating_sub(delta);
    }

    pub fn is_final(&self) -> bool {
        self.0 <= HAND_OVER_AT
    }
}

/// Remaining time split into clock units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    pub fn from_millis(millis: u64) -> Self {
        let seconds = millis / 1000;
        Self {
            days: seconds / 86_400,
            hours: seconds / 3_600 % 24,
            minutes: seconds / 60 % 60,
            seconds: seconds % 60,
        }
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self::from_millis(duration.as_millis().try_into().unwrap_or(u64::MAX))
    }

    fn unit(&self, unit: ClockUnit) -> u64 {
        match unit {
            ClockUnit::Days => self.days,
            ClockUnit::Hours => self.hours,
            ClockUnit::Minutes => self.minutes,
            ClockUnit::Seconds => self.seconds,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum ClockUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl ClockUnit {
    fn label(self) -> &'static str {
        match self {
            ClockUnit::Days => "天",
            ClockUnit::Hours => "时",
            ClockUnit::Minutes => "分",
            ClockUnit::Seconds => "秒",
        }
    }
}

/// The column around a clock unit, hidden for days on small screens.
#[derive(Component)]
struct DaysColumn;

/// Milliseconds since the Unix epoch, if the platform has a wall clock.
#[cfg(not(target_arch = "wasm32"))]
fn now_unix_ms() -> Option<u64> {
    let since_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .ok()?;
    since_epoch.as_millis().try_into().ok()
}

#[cfg(target_arch = "wasm32")]
fn now_unix_ms() -> Option<u64> {
    None
}

fn start_countdown(config: Res<ShowConfig>, mut commands: Commands) {
    let remaining = config.countdown(now_unix_ms());
    info!("Counting down {:?}.", remaining);
    commands.insert_resource(CountdownRemaining(remaining));
}

fn remove_countdown(mut commands: Commands) {
    commands.remove_resource::<CountdownRemaining>();
}

fn spawn_countdown_screen(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Countdown Screen"),
        BackgroundColor(Color::BLACK),
        StateScoped(Screen::Countdown),
        children![
            (
                Name::new("Title"),
                Text::new("2026年 你好"),
                BoldFont,
                TextFont::from_font_size(72.0),
                TextColor(GOLD_TEXT),
                Pickable::IGNORE,
            ),
            (
                Name::new("Clock"),
                Node {
                    column_gap: Px(24.0),
                    align_items: AlignItems::Center,
                    ..default()
                },
                Pickable::IGNORE,
                children![
                    (clock_column(ClockUnit::Days), DaysColumn),
                    clock_column(ClockUnit::Hours),
                    clock_column(ClockUnit::Minutes),
                    clock_column(ClockUnit::Seconds),
                ],
            ),
            widget::sized_label("马年将至 · 万象更新", 16.0, FAINT_TEXT),
            widget::sized_label("The Year of the Horse", 12.0, FAINT_TEXT),
            widget::button("跳过 Skip", skip_on_click),
        ],
    ));
}

fn clock_column(unit: ClockUnit) -> impl Bundle {
    (
        Name::new(unit.label()),
        Node {
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            ..default()
        },
        Pickable::IGNORE,
        children![
            (
                Name::new("Digits"),
                unit,
                Text::new("00"),
                BoldFont,
                TextFont::from_font_size(120.0),
                TextColor(HEADER_TEXT),
                Pickable::IGNORE,
            ),
            widget::label(unit.label()),
        ],
    )
}

fn tick_countdown(time: Res<Time>, mut remaining: ResMut<CountdownRemaining>) {
    remaining.tick(time.delta());
}

fn hand_over(remaining: Res<CountdownRemaining>, mut next_screen: ResMut<NextState<Screen>>) {
    if remaining.is_final() {
        next_screen.set(Screen::FinalCountdown);
    }
}

fn update_countdown_digits(
    remaining: Res<CountdownRemaining>,
    profile: Res<DeviceProfile>,
    mut digit_query: Query<(&ClockUnit, &mut Text)>,
    mut days_query: Query<&mut Node, With<DaysColumn>>,
) {
    let time_left = TimeLeft::from_duration(remaining.0);

    for (unit, mut text) in &mut digit_query {
        let digits = format!("{:02}", time_left.unit(*unit));
        if text.0 != digits {
            text.0 = digits;
        }
    }

    let display = if profile.constrained && time_left.days == 0 {
        Display::None
    } else {
        Display::Flex
    };
    for mut node in &mut days_query {
        if node.display != display {
            node.display = display;
        }
    }
}

fn skip_countdown(mut next_screen: ResMut<NextState<Screen>>) {
    info!("Countdown skipped.");
    next_screen.set(Screen::FinalCountdown);
}

fn skip_on_click(_: Trigger<Pointer<Click>>, next_screen: ResMut<NextState<Screen>>) {
    skip_countdown(next_screen);
}
