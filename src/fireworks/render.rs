//! Replays the draw list on the GPU.
//!
//! A second camera renders sprites into an image it never clears. Every tick
//! lays a translucent black quad over the previous ones, which leaves the
//! trails behind. The image itself is shown as a full-window UI node.

use bevy::{
    asset::RenderAssetUsages,
    image::{TextureFormatPixelInfo, Volume},
    prelude::*,
    render::{
        camera::RenderTarget,
        render_resource::{
            Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
        },
        view::RenderLayers,
    },
};

use super::{
    Fireworks,
    surface::{DrawList, Surface},
};
use crate::screens::Screen;

/// Render layer shared by the fireworks camera and its sprites.
const FIREWORKS_LAYER: usize = 1;

/// Strength of the halo relative to the particle alpha.
const GLOW_STRENGTH: f32 = 0.35;

/// Diameter of the generated disc and halo textures.
const TEXTURE_SIZE: u32 = 64;

/// Depth between the layers of consecutive ticks.
const LAYER_DEPTH: f32 = 3.0;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<FireworksArt>();
}

/// White textures tinted per sprite.
#[derive(Resource, Clone)]
pub struct FireworksArt {
    disc: Handle<Image>,
    halo: Handle<Image>,
}

impl FromWorld for FireworksArt {
    fn from_world(world: &mut World) -> Self {
        let mut images = world.resource_mut::<Assets<Image>>();

        Self {
            disc: images.add(round_texture(TEXTURE_SIZE, disc_alpha)),
            halo: images.add(round_texture(TEXTURE_SIZE, halo_alpha)),
        }
    }
}

/// Marks the pooled sprites the fireworks are drawn with.
#[derive(Component)]
pub(super) struct FireworkSprite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpriteShape {
    /// The black quad that fades the previous ticks.
    Veil,
    Halo,
    Disc,
}

/// One sprite of the frame, in the fireworks camera's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpriteDraw {
    shape: SpriteShape,
    color: Color,
    size: Vec2,
    translation: Vec3,
}

impl SpriteDraw {
    fn sprite(&self, art: &FireworksArt) -> Sprite {
        let image = match self.shape {
            SpriteShape::Veil => Handle::default(),
            SpriteShape::Halo => art.halo.clone(),
            SpriteShape::Disc => art.disc.clone(),
        };

        Sprite {
            image,
            color: self.color,
            custom_size: Some(self.size),
            ..default()
        }
    }
}

/// An uncleared render target of the given size, following the window.
pub(super) fn render_target(size: UVec2) -> Image {
    let size = target_extent(size);
    let format = TextureFormat::bevy_default();

    Image {
        data: Some(vec![0; size.volume() * format.pixel_size()]),
        texture_descriptor: TextureDescriptor {
            label: None,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_DST
                | TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        },
        ..default()
    }
}

pub(super) fn fireworks_camera(target: Handle<Image>) -> impl Bundle {
    (
        Name::new("Fireworks Camera"),
        Camera2d,
        Camera {
            order: -1,
            target: RenderTarget::Image(target.into()),
            clear_color: ClearColorConfig::None,
            ..default()
        },
        Msaa::Off,
        RenderLayers::layer(FIREWORKS_LAYER),
    )
}

fn target_extent(size: UVec2) -> Extent3d {
    let size = size.max(UVec2::ONE);
    Extent3d {
        width: size.x,
        height: size.y,
        depth_or_array_layers: 1,
    }
}

/// Resizes the render target and clears it.
fn resize_target(image: &mut Image, size: UVec2) {
    image.resize(target_extent(size));
    if let Some(data) = image.data.as_mut() {
        data.fill(0);
    }
}

/// White texture whose alpha depends on the distance from the center, as a
/// fraction of the radius.
fn round_texture(diameter: u32, alpha_at: fn(f32) -> f32) -> Image {
    let radius = diameter as f32 / 2.0;
    let mut data = Vec::with_capacity((diameter * diameter * 4) as usize);

    for y in 0..diameter {
        for x in 0..diameter {
            let point = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let alpha = alpha_at(point.distance(Vec2::splat(radius)) / radius);
            data.extend_from_slice(&[255, 255, 255, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]);
        }
    }

    Image::new(
        target_extent(UVec2::splat(diameter)),
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Solid, with a one texel soft edge.
fn disc_alpha(distance: f32) -> f32 {
    (1.0 - distance) * TEXTURE_SIZE as f32 / 2.0 + 0.5
}

fn halo_alpha(distance: f32) -> f32 {
    let falloff = (1.0 - distance).max(0.0);
    falloff * falloff
}

/// Surface coordinates have their origin at the top-left corner, y down.
fn to_camera_space(point: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(point.x - size.x / 2.0, size.y / 2.0 - point.y)
}

fn sprite_draws(list: &DrawList) -> Vec<SpriteDraw> {
    let size = list.size().as_vec2();
    let mut draws = Vec::new();

    for (index, layer) in list.layers().iter().enumerate() {
        let depth = index as f32 * LAYER_DEPTH;

        if layer.fade > 0.0 {
            draws.push(SpriteDraw {
                shape: SpriteShape::Veil,
                color: Color::BLACK.with_alpha(layer.fade),
                size,
                translation: Vec3::new(0.0, 0.0, depth),
            });
        }

        for disc in &layer.discs {
            let center = to_camera_space(disc.center, size);

            if let Some(blur) = disc.glow {
                draws.push(SpriteDraw {
                    shape: SpriteShape::Halo,
                    color: disc.color.with_alpha(disc.alpha * GLOW_STRENGTH).into(),
                    size: Vec2::splat(2.0 * (disc.radius + blur)),
                    translation: center.extend(depth + 1.0),
                });
            }
            draws.push(SpriteDraw {
                shape: SpriteShape::Disc,
                color: disc.color.with_alpha(disc.alpha).into(),
                size: Vec2::splat(2.0 * disc.radius),
                translation: center.extend(depth + 2.0),
            });
        }
    }

    draws
}

/// Turns this frame's layers into sprites, reusing the pool and hiding what is
/// left over. Nothing is drawn on frames without ticks, so the image holds still.
pub(super) fn paint_fireworks(
    mut fireworks: ResMut<Fireworks>,
    art: Res<FireworksArt>,
    mut images: ResMut<Assets<Image>>,
    mut sprite_query: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<FireworkSprite>>,
    mut commands: Commands,
) {
    let fireworks = fireworks.as_mut();

    if fireworks.draws.take_resized() {
        if let Some(image) = images.get_mut(fireworks.target.id()) {
            resize_target(image, fireworks.draws.size());
        }
    }

    let mut draws = sprite_draws(&fireworks.draws).into_iter();
    fireworks.draws.clear();

    let mut pooled = sprite_query.iter_many_mut(&fireworks.sprites);
    while let Some((mut sprite, mut transform, mut visibility)) = pooled.fetch_next() {
        match draws.next() {
            Some(draw) => {
                *sprite = draw.sprite(&art);
                transform.translation = draw.translation;
                visibility.set_if_neq(Visibility::Inherited);
            }
            None => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }

    for draw in draws {
        let sprite = commands
            .spawn((
                Name::new("Firework Sprite"),
                FireworkSprite,
                draw.sprite(&art),
                Transform::from_translation(draw.translation),
                RenderLayers::layer(FIREWORKS_LAYER),
                StateScoped(Screen::Main),
            ))
            .id();
        fireworks.sprites.push(sprite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texel_alpha(image: &Image, x: u32, y: u32) -> u8 {
        let data = image.data.as_deref().unwrap();
        data[((y * image.width() + x) * 4 + 3) as usize]
    }

    #[test]
    fn disc_is_solid_inside_and_empty_outside() {
        let disc = round_texture(TEXTURE_SIZE, disc_alpha);

        assert_eq!(texel_alpha(&disc, 32, 32), 255);
        assert_eq!(texel_alpha(&disc, 0, 0), 0);
    }

    #[test]
    fn halo_fades_towards_the_rim() {
        let halo = round_texture(TEXTURE_SIZE, halo_alpha);

        let center = texel_alpha(&halo, 32, 32);
        let middle = texel_alpha(&halo, 48, 32);
        assert!(center > middle);
        assert!(middle > 0);
        assert_eq!(texel_alpha(&halo, 63, 32), 0);
    }

    #[test]
    fn layers_stack_above_their_veils() {
        let mut list = DrawList::new(UVec2::new(200, 100));
        list.fade(0.2);
        list.fill_circle(Vec2::new(0.0, 0.0), 2.0, Srgba::WHITE, 0.5, Some(6.0));
        list.fade(0.2);
        list.fill_circle(Vec2::new(100.0, 50.0), 3.0, Srgba::rgb(1.0, 0.0, 0.0), 1.0, None);

        let draws = sprite_draws(&list);
        let shapes: Vec<_> = draws.iter().map(|d| d.shape).collect();
        assert_eq!(
            shapes,
            [
                SpriteShape::Veil,
                SpriteShape::Halo,
                SpriteShape::Disc,
                SpriteShape::Veil,
                SpriteShape::Disc,
            ]
        );

        // Each sprite lies above everything drawn before it.
        assert!(draws.windows(2).all(|w| w[0].translation.z < w[1].translation.z));

        assert_eq!(draws[0].size, Vec2::new(200.0, 100.0));
        assert_eq!(draws[0].color, Color::BLACK.with_alpha(0.2));
        assert_eq!(draws[1].size, Vec2::splat(16.0));
        assert_eq!(draws[1].translation.truncate(), Vec2::new(-100.0, 50.0));
        assert_eq!(draws[2].size, Vec2::splat(4.0));
        assert_eq!(draws[4].translation.truncate(), Vec2::ZERO);
    }

    #[test]
    fn glow_is_fainter_than_the_disc() {
        let mut list = DrawList::new(UVec2::new(10, 10));
        list.fade(0.2);
        list.fill_circle(Vec2::ONE, 1.0, Srgba::WHITE, 0.8, Some(4.0));

        let draws = sprite_draws(&list);

        assert!((draws[1].color.alpha() - 0.8 * GLOW_STRENGTH).abs() < 1e-6);
        assert!((draws[2].color.alpha() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn empty_list_draws_nothing() {
        assert!(sprite_draws(&DrawList::new(UVec2::new(10, 10))).is_empty());
    }

    #[test]
    fn resized_target_is_cleared() {
        let mut image = render_target(UVec2::new(4, 4));
        if let Some(data) = image.data.as_mut() {
            data.fill(255);
        }

        resize_target(&mut image, UVec2::new(6, 2));

        assert_eq!(image.width(), 6);
        assert_eq!(image.height(), 2);
        let data = image.data.as_deref().unwrap();
        assert_eq!(data.len(), 6 * 2 * 4);
        assert!(data.iter().all(|byte| *byte == 0));
    }
}
