//! The last three seconds, counted one digit at a time.

use std::time::Duration;

use bevy::{
    math::curve::{Curve, EaseFunction},
    prelude::*,
};

use crate::{
    AppSystems,
    screens::Screen,
    theme::{BoldFont, palette::*, widget},
};

const STEP: Duration = Duration::from_secs(1);
const TITLE_HOLD: Duration = Duration::from_millis(800);
const POP_SECONDS: f32 = 0.8;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(Screen::FinalCountdown),
        (start_final_count, spawn_final_countdown_screen),
    );
    app.add_systems(OnExit(Screen::FinalCountdown), remove_final_count);

    app.add_systems(
        Update,
        (
            tick_final_count.in_set(AppSystems::TickTimers),
            (show_final_step, enter_splash)
                .chain()
                .in_set(AppSystems::Update),
        )
            .run_if(in_state(Screen::FinalCountdown).and(resource_exists::<FinalCount>)),
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalStep {
    Count(u32),
    Title,
    Done,
}

/// Walks through 3, 2, 1 and the title card.
#[derive(Resource, Debug, Default)]
pub struct FinalCount {
    elapsed: Duration,
}

impl FinalCount {
    pub const FROM: u32 = 3;

    pub fn tick(&mut self, delta: Duration) {
        self.elapsed += delta;
    }

    pub fn step(&self) -> FinalStep {
        let counted = STEP * Self::FROM;
        if self.elapsed < counted {
            let step = (self.elapsed.as_millis() / STEP.as_millis()) as u32;
            FinalStep::Count(Self::FROM - step)
        } else if self.elapsed < counted + TITLE_HOLD {
            FinalStep::Title
        } else {
            FinalStep::Done
        }
    }

    /// Seconds since the current step began.
    fn step_elapsed(&self) -> f32 {
        let counted = STEP * Self::FROM;
        if self.elapsed < counted {
            (self.elapsed.as_millis() % STEP.as_millis()) as f32 / 1000.0
        } else {
            (self.elapsed - counted).as_secs_f32()
        }
    }
}

#[derive(Component)]
struct FinalCountText;

fn start_final_count(mut commands: Commands) {
    commands.init_resource::<FinalCount>();
}

fn remove_final_count(mut commands: Commands) {
    commands.remove_resource::<FinalCount>();
}

fn spawn_final_countdown_screen(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Final Countdown Screen"),
        BackgroundColor(Color::BLACK),
        StateScoped(Screen::FinalCountdown),
        children![(
            Name::new("Final Count"),
            FinalCountText,
            Text::new(FinalCount::FROM.to_string()),
            BoldFont,
            TextFont::from_font_size(320.0),
            TextColor(HEADER_TEXT),
            Transform::from_scale(Vec3::ZERO),
            Pickable::IGNORE,
        )],
    ));
}

fn tick_final_count(time: Res<Time>, mut count: ResMut<FinalCount>) {
    count.tick(time.delta());
}

fn show_final_step(
    count: Res<FinalCount>,
    mut text_query: Query<
        (&mut Text, &mut TextFont, &mut TextColor, &mut Transform),
        With<FinalCountText>,
    >,
) {
    let (label, font_size, color) = match count.step() {
        FinalStep::Count(n) => (n.to_string(), 320.0, HEADER_TEXT),
        FinalStep::Title | FinalStep::Done => ("盛世长歌".to_string(), 160.0, GOLD_TEXT),
    };
    let pop = EaseFunction::BackOut.sample_clamped(count.step_elapsed() / POP_SECONDS);

    for (mut text, mut font, mut text_color, mut transform) in &mut text_query {
        if text.0 != label {
            text.0.clone_from(&label);
            font.font_size = font_size;
            text_color.0 = color;
        }
        transform.scale = Vec3::new(pop, pop, 1.0);
    }
}

fn enter_splash(count: Res<FinalCount>, mut next_screen: ResMut<NextState<Screen>>) {
    if count.step() == FinalStep::Done {
        next_screen.set(Screen::Splash);
    }
}
