//! A short title card between the countdown and the show.

use bevy::{
    math::curve::{Curve, EaseFunction},
    prelude::*,
};

use crate::{
    AppSystems,
    config::ShowConfig,
    screens::Screen,
    theme::{BoldFont, palette::*, widget},
};

const FADE_IN_SECONDS: f32 = 1.5;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<SplashTimer>();
    app.add_systems(OnEnter(Screen::Splash), (insert_splash_timer, spawn_splash_screen));
    app.add_systems(OnExit(Screen::Splash), remove_splash_timer);

    app.add_systems(
        Update,
        (
            tick_splash_timer.in_set(AppSystems::TickTimers),
            (fade_in_splash, check_splash_timer).in_set(AppSystems::Update),
        )
            .run_if(in_state(Screen::Splash).and(resource_exists::<SplashTimer>)),
    );
}

#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
struct SplashTimer(Timer);

#[derive(Component)]
struct SplashTitle;

fn insert_splash_timer(config: Res<ShowConfig>, mut commands: Commands) {
    commands.insert_resource(SplashTimer(Timer::new(
        config.splash_duration(),
        TimerMode::Once,
    )));
}

fn remove_splash_timer(mut commands: Commands) {
    commands.remove_resource::<SplashTimer>();
}

fn spawn_splash_screen(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Splash Screen"),
        BackgroundColor(Color::BLACK),
        StateScoped(Screen::Splash),
        children![(
            Name::new("Splash Title"),
            SplashTitle,
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(32.0),
                ..default()
            },
            Transform::from_scale(Vec3::splat(0.8)),
            Pickable::IGNORE,
            children![
                (
                    Name::new("Headline"),
                    Text::new("万事如意"),
                    BoldFont,
                    TextFont::from_font_size(160.0),
                    TextColor(HEADER_TEXT.with_alpha(0.0)),
                    Pickable::IGNORE,
                ),
                widget::sized_label(
                    "H A P P Y   N E W   Y E A R",
                    24.0,
                    GOLD_TEXT.with_alpha(0.0)
                ),
            ],
        )],
    ));
}

fn tick_splash_timer(time: Res<Time>, mut timer: ResMut<SplashTimer>) {
    timer.0.tick(time.delta());
}

fn fade_in_splash(
    timer: Res<SplashTimer>,
    mut title_query: Query<(&mut Transform, &Children), With<SplashTitle>>,
    mut color_query: Query<&mut TextColor>,
) {
    let t = EaseFunction::QuadraticOut.sample_clamped(timer.0.elapsed_secs() / FADE_IN_SECONDS);

    for (mut transform, children) in &mut title_query {
        let scale = 0.8 + 0.2 * t;
        transform.scale = Vec3::new(scale, scale, 1.0);

        let mut colors = color_query.iter_many_mut(children);
        while let Some(mut color) = colors.fetch_next() {
            color.0.set_alpha(t);
        }
    }
}

fn check_splash_timer(timer: Res<SplashTimer>, mut next_screen: ResMut<NextState<Screen>>) {
    if timer.0.finished() {
        next_screen.set(Screen::Main);
    }
}
