//! Playback controls for the main show: pause, skip, seek and mute.

use bevy::{prelude::*, ui::Val::*};

use crate::{
    AppSystems, Pause,
    audio::Muted,
    greeting::{GreetingCarousel, format_clock},
    screens::Screen,
    theme::{palette::*, widget},
};

const SEEK_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

pub(super) fn plugin(app: &mut App) {
    app.add_event::<PlaybackCommand>();

    app.add_systems(OnEnter(Screen::Main), spawn_control_bar);
    app.add_systems(OnExit(Screen::Main), resume);
    app.add_systems(OnEnter(Pause(true)), spawn_pause_label);

    app.add_systems(
        Update,
        (
            record_playback_keys.in_set(AppSystems::RecordInput),
            (
                apply_playback_commands,
                (update_progress, update_button_labels),
            )
                .chain()
                .in_set(AppSystems::Update),
        )
            .run_if(in_state(Screen::Main).and(resource_exists::<GreetingCarousel>)),
    );
}

/// A request from the keyboard or the control bar.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    TogglePause,
    Next,
    Previous,
    /// Jumps to the greeting at this index, wrapping around.
    SeekTo(usize),
    ToggleMute,
}

impl PlaybackCommand {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Space => Some(PlaybackCommand::TogglePause),
            KeyCode::ArrowRight => Some(PlaybackCommand::Next),
            KeyCode::ArrowLeft => Some(PlaybackCommand::Previous),
            KeyCode::KeyM => Some(PlaybackCommand::ToggleMute),
            key => SEEK_KEYS
                .iter()
                .position(|seek_key| *seek_key == key)
                .map(PlaybackCommand::SeekTo),
        }
    }
}

#[derive(Component)]
struct ProgressFill;

#[derive(Component)]
struct ClockLabel;

#[derive(Component)]
struct PlayPauseLabel;

#[derive(Component)]
struct MuteLabel;

fn record_playback_keys(
    input: Res<ButtonInput<KeyCode>>,
    mut commands: EventWriter<PlaybackCommand>,
) {
    for key in input.get_just_pressed() {
        if let Some(command) = PlaybackCommand::from_key(*key) {
            commands.write(command);
        }
    }
}

fn apply_playback_commands(
    mut commands: EventReader<PlaybackCommand>,
    pause: Res<State<Pause>>,
    mut next_pause: ResMut<NextState<Pause>>,
    mut carousel: ResMut<GreetingCarousel>,
    mut muted: ResMut<Muted>,
) {
    // Several toggles in one frame must see each other.
    let mut paused = pause.get().0;

    for command in commands.read() {
        match *command {
            PlaybackCommand::TogglePause => {
                paused = !paused;
                next_pause.set(Pause(paused));
            }
            PlaybackCommand::Next => carousel.next(),
            PlaybackCommand::Previous => carousel.previous(),
            PlaybackCommand::SeekTo(index) => carousel.seek(index),
            PlaybackCommand::ToggleMute => muted.0 = !muted.0,
        }
        debug!("Playback: {command:?}");
    }
}

fn resume(mut next_pause: ResMut<NextState<Pause>>) {
    next_pause.set(Pause(false));
}

fn spawn_control_bar(mut commands: Commands) {
    commands.spawn((
        Name::new("Control Bar"),
        Node {
            position_type: PositionType::Absolute,
            bottom: Px(32.0),
            width: Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            row_gap: Px(8.0),
            ..default()
        },
        GlobalZIndex(3),
        Pickable::IGNORE,
        StateScoped(Screen::Main),
        children![
            (
                Name::new("Controls"),
                Node {
                    align_items: AlignItems::Center,
                    column_gap: Px(12.0),
                    padding: UiRect::axes(Px(24.0), Px(8.0)),
                    border: UiRect::all(Px(1.0)),
                    ..default()
                },
                BorderRadius::MAX,
                BorderColor(PROGRESS_TRACK),
                BackgroundColor(BUTTON_BACKGROUND),
                children![
                    widget::small_button("«", press_previous),
                    (
                        widget::small_button("II", press_play_pause),
                        PlayPauseLabel,
                    ),
                    widget::small_button("»", press_next),
                    (
                        Name::new("Progress Track"),
                        Node {
                            width: Px(192.0),
                            height: Px(2.0),
                            ..default()
                        },
                        BackgroundColor(PROGRESS_TRACK),
                        children![(
                            Name::new("Progress Fill"),
                            ProgressFill,
                            Node {
                                width: Percent(0.0),
                                height: Percent(100.0),
                                ..default()
                            },
                            BackgroundColor(PROGRESS_FILL),
                        )],
                    ),
                    (
                        widget::sized_label("00:00 / 00:00", 14.0, FAINT_TEXT),
                        ClockLabel,
                    ),
                    (
                        widget::small_button("♪", press_mute),
                        MuteLabel,
                    ),
                ],
            ),
            widget::sized_label("Now Playing: 新年祝福语集", 12.0, FAINT_TEXT),
        ],
    ));
}

fn spawn_pause_label(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Pause Overlay"),
        GlobalZIndex(2),
        StateScoped(Pause(true)),
        children![widget::header("已暂停"), widget::label("Space to resume")],
    ));
}

fn press_previous(_: Trigger<Pointer<Click>>, mut commands: EventWriter<PlaybackCommand>) {
    commands.write(PlaybackCommand::Previous);
}

fn press_play_pause(_: Trigger<Pointer<Click>>, mut commands: EventWriter<PlaybackCommand>) {
    commands.write(PlaybackCommand::TogglePause);
}

fn press_next(_: Trigger<Pointer<Click>>, mut commands: EventWriter<PlaybackCommand>) {
    commands.write(PlaybackCommand::Next);
}

fn press_mute(_: Trigger<Pointer<Click>>, mut commands: EventWriter<PlaybackCommand>) {
    commands.write(PlaybackCommand::ToggleMute);
}

fn update_progress(
    carousel: Res<GreetingCarousel>,
    mut fill_query: Query<&mut Node, With<ProgressFill>>,
    mut clock_query: Query<&mut Text, With<ClockLabel>>,
) {
    for mut node in &mut fill_query {
        node.width = Percent(carousel.progress() * 100.0);
    }
    for mut text in &mut clock_query {
        text.0 = format!(
            "{} / {}",
            format_clock(carousel.position()),
            format_clock(carousel.total())
        );
    }
}

/// The labels live on the text below each button.
fn update_button_labels(
    pause: Res<State<Pause>>,
    muted: Res<Muted>,
    label_query: Query<(&Children, Has<MuteLabel>), Or<(With<PlayPauseLabel>, With<MuteLabel>)>>,
    inner_query: Query<&Children, With<Button>>,
    mut text_query: Query<&mut Text>,
) {
    if !pause.is_changed() && !muted.is_changed() {
        return;
    }

    for (children, is_mute) in &label_query {
        let label = match (is_mute, muted.0, pause.get().0) {
            (true, true, _) => "×",
            (true, false, _) => "♪",
            (false, _, true) => "▶",
            (false, _, false) => "II",
        };

        for texts in inner_query.iter_many(children) {
            let mut texts = text_query.iter_many_mut(texts);
            while let Some(mut text) = texts.fetch_next() {
                text.0 = label.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::greeting::default_greetings;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin);
        app.init_state::<Pause>();
        app.add_event::<PlaybackCommand>();
        app.init_resource::<Muted>();
        app.insert_resource(GreetingCarousel::new(
            default_greetings(),
            Duration::from_secs(4),
        ));
        app.add_systems(Update, apply_playback_commands);
        app
    }

    fn send_and_settle(app: &mut App, command: PlaybackCommand) {
        app.world_mut().send_event(command);
        app.update();
        // State changes land in the next frame's transition.
        app.update();
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(
            PlaybackCommand::from_key(KeyCode::Space),
            Some(PlaybackCommand::TogglePause)
        );
        assert_eq!(
            PlaybackCommand::from_key(KeyCode::ArrowRight),
            Some(PlaybackCommand::Next)
        );
        assert_eq!(
            PlaybackCommand::from_key(KeyCode::ArrowLeft),
            Some(PlaybackCommand::Previous)
        );
        assert_eq!(
            PlaybackCommand::from_key(KeyCode::KeyM),
            Some(PlaybackCommand::ToggleMute)
        );
        assert_eq!(
            PlaybackCommand::from_key(KeyCode::Digit3),
            Some(PlaybackCommand::SeekTo(2))
        );
        assert_eq!(PlaybackCommand::from_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn toggle_pause_flips_the_pause_state() {
        let mut app = app();

        send_and_settle(&mut app, PlaybackCommand::TogglePause);
        assert_eq!(*app.world().resource::<State<Pause>>().get(), Pause(true));

        send_and_settle(&mut app, PlaybackCommand::TogglePause);
        assert_eq!(*app.world().resource::<State<Pause>>().get(), Pause(false));
    }

    #[test]
    fn two_toggles_in_one_frame_cancel_out() {
        let mut app = app();

        app.world_mut().send_event(PlaybackCommand::TogglePause);
        app.world_mut().send_event(PlaybackCommand::TogglePause);
        app.update();
        app.update();

        assert_eq!(*app.world().resource::<State<Pause>>().get(), Pause(false));
    }

    #[test]
    fn navigation_moves_the_carousel() {
        let mut app = app();
        let index = |app: &App| app.world().resource::<GreetingCarousel>().current_index();

        send_and_settle(&mut app, PlaybackCommand::Next);
        assert_eq!(index(&app), 1);

        send_and_settle(&mut app, PlaybackCommand::SeekTo(12));
        assert_eq!(index(&app), 12);

        send_and_settle(&mut app, PlaybackCommand::Next);
        assert_eq!(index(&app), 0);

        send_and_settle(&mut app, PlaybackCommand::Previous);
        assert_eq!(index(&app), 12);
    }

    #[test]
    fn mute_toggles() {
        let mut app = app();

        send_and_settle(&mut app, PlaybackCommand::ToggleMute);
        assert!(app.world().resource::<Muted>().0);

        send_and_settle(&mut app, PlaybackCommand::ToggleMute);
        assert!(!app.world().resource::<Muted>().0);
    }
}
