//! The main show. Fireworks, greetings and controls add themselves on entry;
//! this screen only frames them.

use bevy::{prelude::*, ui::Val::*};

use crate::{
    screens::Screen,
    theme::{BoldFont, palette::*, widget},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Main), spawn_decorations);
}

fn spawn_decorations(mut commands: Commands) {
    commands.spawn((
        Name::new("Decorations"),
        Node {
            position_type: PositionType::Absolute,
            width: Percent(100.0),
            height: Percent(100.0),
            padding: UiRect::all(Px(32.0)),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::SpaceBetween,
            ..default()
        },
        GlobalZIndex(1),
        Pickable::IGNORE,
        StateScoped(Screen::Main),
        children![
            (
                corner_row(),
                children![
                    (
                        corner(AlignItems::FlexStart),
                        children![
                            widget::sized_label("HAPPY NEW YEAR", 14.0, LABEL_TEXT),
                            widget::sized_label("岁月悠长 · 山河无恙", 12.0, FAINT_TEXT),
                        ],
                    ),
                    (
                        corner(AlignItems::FlexEnd),
                        children![widget::sized_label("二〇二六 · 丙午年", 20.0, GOLD_TEXT)],
                    ),
                ],
            ),
            (
                corner_row(),
                children![
                    (
                        corner(AlignItems::FlexStart),
                        children![
                            (
                                Name::new("Blessing"),
                                Text::new("新年大吉"),
                                BoldFont,
                                TextFont::from_font_size(36.0),
                                TextColor(HEADER_TEXT),
                                Pickable::IGNORE,
                            ),
                            widget::sized_label(
                                "CELESTIAL HARMONY · LUNAR CYCLE 2026",
                                10.0,
                                FAINT_TEXT
                            ),
                        ],
                    ),
                    (
                        corner(AlignItems::FlexEnd),
                        children![
                            widget::sized_label("不 负 韶 华", 14.0, LABEL_TEXT),
                            widget::sized_label("DREAMS IGNITE THE FUTURE", 10.0, FAINT_TEXT),
                        ],
                    ),
                ],
            ),
        ],
    ));
}

/// Two stacks of text pinned to opposite sides.
fn corner_row() -> impl Bundle {
    (
        Name::new("Corner Row"),
        Node {
            justify_content: JustifyContent::SpaceBetween,
            align_items: AlignItems::FlexStart,
            ..default()
        },
        Pickable::IGNORE,
    )
}

fn corner(align_items: AlignItems) -> impl Bundle {
    (
        Name::new("Corner"),
        Node {
            flex_direction: FlexDirection::Column,
            align_items,
            row_gap: Px(4.0),
            ..default()
        },
        Pickable::IGNORE,
    )
}
