//! Reusable UI widgets & theming.

pub mod interaction;
pub mod palette;
pub mod widget;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(interaction::plugin);

    app.register_type::<Fonts>();
    app.init_resource::<Fonts>();

    app.add_systems(
        Update,
        (inject_regular_font, inject_bold_font).run_if(fonts_loaded),
    );
}

#[derive(Component)]
#[require(TextFont)]
pub struct RegularFont;

#[derive(Component)]
#[require(TextFont)]
pub struct BoldFont;

/// Both faces cover CJK, which the built-in font does not.
#[derive(Resource, Clone, Reflect)]
#[reflect(Resource)]
pub struct Fonts {
    pub regular: Handle<Font>,
    pub bold: Handle<Font>,
}

impl FromWorld for Fonts {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();

        Self {
            regular: assets.load("fonts/NotoSansSC-Regular.ttf"),
            bold: assets.load("fonts/NotoSansSC-Bold.ttf"),
        }
    }
}

/// Until then text keeps the built-in font.
fn fonts_loaded(fonts: Res<Fonts>, asset_server: Res<AssetServer>) -> bool {
    asset_server.is_loaded_with_dependencies(&fonts.regular)
        && asset_server.is_loaded_with_dependencies(&fonts.bold)
}

fn inject_regular_font(
    mut query: Query<&mut TextFont, Added<RegularFont>>,
    fonts: Res<Fonts>,
) {
    for mut text_font in query.iter_mut() {
        text_font.font = fonts.regular.clone();
    }
}

fn inject_bold_font(mut query: Query<&mut TextFont, Added<BoldFont>>, fonts: Res<Fonts>) {
    for mut text_font in query.iter_mut() {
        text_font.font = fonts.bold.clone();
    }
}
