//! The rotating New Year greetings shown over the fireworks.

use std::time::Duration;

use bevy::{
    math::curve::{Curve, EaseFunction},
    prelude::*,
    ui::Val::*,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    AppSystems, PausableSystems,
    config::ShowConfig,
    screens::Screen,
    theme::{BoldFont, RegularFont, palette::*},
};

const DEFAULT_SLOT: Duration = Duration::from_secs(4);
const ENTRANCE_SECONDS: f32 = 1.2;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<GreetingEntrance>();

    app.add_systems(
        OnEnter(Screen::Main),
        (start_carousel, spawn_greeting_overlay).chain(),
    );
    app.add_systems(
        Update,
        (
            tick_carousel
                .in_set(AppSystems::TickTimers)
                .in_set(PausableSystems),
            (
                show_current_greeting,
                animate_entrance.in_set(PausableSystems),
            )
                .chain()
                .in_set(AppSystems::Update),
        )
            .run_if(in_state(Screen::Main).and(resource_exists::<GreetingCarousel>)),
    );
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub text: String,
    pub sub_text: String,
    pub artist: String,
}

impl Greeting {
    pub fn new(text: &str, sub_text: &str, artist: &str) -> Self {
        Self {
            text: text.to_string(),
            sub_text: sub_text.to_string(),
            artist: artist.to_string(),
        }
    }
}

pub fn default_greetings() -> Vec<Greeting> {
    [
        ("新年快乐", "《新年快乐》", "苏唱"),
        ("新年快乐", "《晚湖》", "向拽"),
        ("新年快乐", "《今日离港》", "陆诗邀"),
        ("新年快乐", "《放肆》", "秦浓浓"),
        ("新年快乐", "《总有老师要请家长》", "郑一言"),
        ("新年快乐", "《我亲爱的法医小姐》", "宋余航"),
        ("新年快乐", "《余生为期》", "萧莞青"),
        ("新年祝福", "《桃李不言》", "陶安之"),
        ("期待你的新表现", "《今日离港》", "薛桐"),
        ("希望大家多多赚钱", "《禁止在雨天告白》", "全体"),
        ("诸事大吉", "《什么年代了啊》", "彭纳之"),
        ("有情人终成眷属", "《愿你余生安好》", "纪和程"),
        ("一定要记得每年都开开心心", "《帮我拍拍》", "于舟"),
    ]
    .into_iter()
    .map(|(text, sub_text, artist)| Greeting::new(text, sub_text, artist))
    .collect()
}

/// Plays the greetings one after another, each for a fixed slot, looping forever.
#[derive(Resource, Debug)]
pub struct GreetingCarousel {
    greetings: Vec<Greeting>,
    slot: Duration,
    elapsed: Duration,
    shown: Option<usize>,
}

impl GreetingCarousel {
    /// An empty list plays the built-in greetings, a zero slot plays 4 s slots.
    pub fn new(greetings: Vec<Greeting>, slot: Duration) -> Self {
        Self {
            greetings: if greetings.is_empty() {
                default_greetings()
            } else {
                greetings
            },
            slot: if slot.is_zero() { DEFAULT_SLOT } else { slot },
            elapsed: Duration::ZERO,
            shown: None,
        }
    }

    pub fn len(&self) -> usize {
        self.greetings.len()
    }

    pub fn slot(&self) -> Duration {
        self.slot
    }

    /// Length of one full loop.
    pub fn total(&self) -> Duration {
        self.slot * self.greetings.len() as u32
    }

    /// Time into the current loop.
    pub fn position(&self) -> Duration {
        let nanos = self.elapsed.as_nanos() % self.total().as_nanos();
        Duration::from_nanos(nanos as u64)
    }

    pub fn current_index(&self) -> usize {
        let index = self.position().as_nanos() / self.slot.as_nanos();
        (index as usize).min(self.greetings.len() - 1)
    }

    pub fn current(&self) -> &Greeting {
        &self.greetings[self.current_index()]
    }

    /// Fraction of the loop already played, in `[0, 1)`.
    pub fn progress(&self) -> f32 {
        self.position().as_secs_f32() / self.total().as_secs_f32()
    }

    pub fn tick(&mut self, delta: Duration) {
        self.elapsed += delta;
    }

    /// Jumps to the start of greeting `index`, wrapping around the list.
    pub fn seek(&mut self, index: usize) {
        self.elapsed = self.slot * (index % self.greetings.len()) as u32;
    }

    pub fn next(&mut self) {
        self.seek(self.current_index() + 1);
    }

    pub fn previous(&mut self) {
        self.seek(self.current_index() + self.greetings.len() - 1);
    }

    /// Returns the current index if it differs from the one last taken.
    pub fn take_change(&mut self) -> Option<usize> {
        let index = self.current_index();
        (self.shown != Some(index)).then(|| {
            self.shown = Some(index);
            index
        })
    }
}

/// `MM:SS`, minutes not capped at an hour.
pub fn format_clock(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// How a new greeting enters the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum EntranceVariant {
    FadeUp,
    Zoom,
    SlideLeft,
    DropIn,
}

impl EntranceVariant {
    pub const ALL: [EntranceVariant; 4] = [
        EntranceVariant::FadeUp,
        EntranceVariant::Zoom,
        EntranceVariant::SlideLeft,
        EntranceVariant::DropIn,
    ];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// The pose the greeting starts from. It settles at [`Pose::REST`].
    pub fn start_pose(self) -> Pose {
        match self {
            EntranceVariant::FadeUp => Pose {
                offset: Vec2::new(0.0, 50.0),
                scale: 0.9,
                ..Pose::HIDDEN
            },
            EntranceVariant::Zoom => Pose {
                scale: 0.5,
                rotation: -5f32.to_radians(),
                ..Pose::HIDDEN
            },
            EntranceVariant::SlideLeft => Pose {
                offset: Vec2::new(100.0, 0.0),
                ..Pose::HIDDEN
            },
            EntranceVariant::DropIn => Pose {
                offset: Vec2::new(0.0, -100.0),
                scale: 1.2,
                ..Pose::HIDDEN
            },
        }
    }

    /// The pose `elapsed` seconds into the entrance.
    pub fn pose_at(self, elapsed: f32) -> Pose {
        let t = EaseFunction::QuinticOut.sample_clamped(elapsed / ENTRANCE_SECONDS);
        self.start_pose().lerp(Pose::REST, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    /// Offset from the resting place in logical pixels, y pointing down.
    pub offset: Vec2,
    pub scale: f32,
    pub rotation: f32,
}

impl Pose {
    pub const REST: Pose = Pose {
        opacity: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
        rotation: 0.0,
    };

    const HIDDEN: Pose = Pose {
        opacity: 0.0,
        ..Pose::REST
    };

    fn lerp(self, other: Pose, t: f32) -> Pose {
        Pose {
            opacity: self.opacity.lerp(other.opacity, t),
            offset: self.offset.lerp(other.offset, t),
            scale: self.scale.lerp(other.scale, t),
            rotation: self.rotation.lerp(other.rotation, t),
        }
    }
}

#[derive(Component, Debug, Reflect)]
#[reflect(Component)]
struct GreetingEntrance {
    variant: EntranceVariant,
    elapsed: f32,
}

#[derive(Component)]
struct GreetingText;

#[derive(Component)]
struct GreetingSubText;

fn start_carousel(mut commands: Commands, config: Res<ShowConfig>) {
    let carousel = GreetingCarousel::new(config.greetings.clone(), config.greeting_slot());
    info!(
        "Playing {} greetings, {:?} each.",
        carousel.len(),
        carousel.slot()
    );
    commands.insert_resource(carousel);
}

fn spawn_greeting_overlay(mut commands: Commands) {
    commands.spawn((
        Name::new("Greeting Overlay"),
        Node {
            position_type: PositionType::Absolute,
            width: Percent(100.0),
            height: Percent(100.0),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        GlobalZIndex(1),
        Pickable::IGNORE,
        StateScoped(Screen::Main),
        children![(
            Name::new("Greeting"),
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Px(24.0),
                padding: UiRect::horizontal(Px(16.0)),
                ..default()
            },
            GreetingEntrance {
                variant: EntranceVariant::FadeUp,
                elapsed: 0.0,
            },
            Pickable::IGNORE,
            children![
                (
                    Name::new("Greeting Text"),
                    GreetingText,
                    Text::default(),
                    BoldFont,
                    TextFont::from_font_size(96.0),
                    TextColor(GREETING_TEXT),
                    TextLayout::new_with_justify(JustifyText::Center),
                    Pickable::IGNORE,
                ),
                (
                    Name::new("Divider"),
                    Node {
                        width: Px(96.0),
                        height: Px(2.0),
                        ..default()
                    },
                    BackgroundColor(PROGRESS_FILL),
                    Pickable::IGNORE,
                ),
                (
                    Name::new("Greeting Sub Text"),
                    GreetingSubText,
                    Text::default(),
                    RegularFont,
                    TextFont::from_font_size(28.0),
                    TextColor(GOLD_TEXT),
                    TextLayout::new_with_justify(JustifyText::Center),
                    Pickable::IGNORE,
                ),
            ],
        )],
    ));
}

fn tick_carousel(time: Res<Time>, mut carousel: ResMut<GreetingCarousel>) {
    carousel.tick(time.delta());
}

fn show_current_greeting(
    mut carousel: ResMut<GreetingCarousel>,
    mut entrance_query: Query<&mut GreetingEntrance>,
    mut text_query: Query<&mut Text, (With<GreetingText>, Without<GreetingSubText>)>,
    mut sub_text_query: Query<&mut Text, (With<GreetingSubText>, Without<GreetingText>)>,
) {
    let Some(index) = carousel.take_change() else {
        return;
    };
    let greeting = carousel.current().clone();
    debug!("Greeting {index}: {}", greeting.text);

    let variant = EntranceVariant::random(&mut rand::rng());
    for mut entrance in &mut entrance_query {
        *entrance = GreetingEntrance {
            variant,
            elapsed: 0.0,
        };
    }
    for mut text in &mut text_query {
        text.0.clone_from(&greeting.text);
    }
    for mut text in &mut sub_text_query {
        text.0 = format!("{}  |  {}", greeting.sub_text, greeting.artist);
    }
}

fn animate_entrance(
    time: Res<Time>,
    mut entrance_query: Query<(&mut GreetingEntrance, &mut Node, &mut Transform, &Children)>,
    mut color_query: Query<&mut TextColor>,
) {
    for (mut entrance, mut node, mut transform, children) in &mut entrance_query {
        entrance.elapsed += time.delta_secs();
        let pose = entrance.variant.pose_at(entrance.elapsed);

        node.left = Px(pose.offset.x);
        node.top = Px(pose.offset.y);
        transform.scale = Vec3::new(pose.scale, pose.scale, 1.0);
        transform.rotation = Quat::from_rotation_z(pose.rotation);

        let mut colors = color_query.iter_many_mut(children);
        while let Some(mut color) = colors.fetch_next() {
            color.0.set_alpha(pose.opacity);
        }
    }
}
