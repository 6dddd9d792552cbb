//! The 2D drawing surface the fireworks are painted on.

use bevy::{
    color::Srgba,
    math::{UVec2, Vec2},
};

/// What the simulation needs from a drawing surface.
pub trait Surface {
    /// Size in pixels.
    fn size(&self) -> UVec2;

    fn resize(&mut self, size: UVec2);

    /// Paints translucent black over the whole surface.
    fn fade(&mut self, alpha: f32);

    /// Paints a filled disc, with an optional glow of the given blur radius around it.
    fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Srgba,
        alpha: f32,
        glow: Option<f32>,
    );
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub center: Vec2,
    pub radius: f32,
    pub color: Srgba,
    pub alpha: f32,
    pub glow: Option<f32>,
}

/// Everything painted during one tick: a fade, then discs on top of it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawnLayer {
    pub fade: f32,
    pub discs: Vec<Disc>,
}

/// Collects draw calls so the GPU can replay them.
///
/// Every fade starts a new layer above the previous ones. The layers are kept
/// until [`DrawList::clear`], so several ticks can be drawn in one frame.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: UVec2,
    resized: bool,
    layers: Vec<DrawnLayer>,
}

impl DrawList {
    /// Both dimensions are at least one pixel.
    pub fn new(size: UVec2) -> Self {
        Self {
            size: size.max(UVec2::ONE),
            ..Default::default()
        }
    }

    pub fn layers(&self) -> &[DrawnLayer] {
        &self.layers
    }

    /// Forgets the layers drawn so far.
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Whether the surface was resized since the last call.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }
}

impl Surface for DrawList {
    fn size(&self) -> UVec2 {
        self.size
    }

    /// Clears, like resizing an HTML canvas.
    fn resize(&mut self, size: UVec2) {
        self.size = size.max(UVec2::ONE);
        self.resized = true;
        self.layers.clear();
    }

    fn fade(&mut self, alpha: f32) {
        self.layers.push(DrawnLayer {
            fade: alpha.clamp(0.0, 1.0),
            discs: Vec::new(),
        });
    }

    fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Srgba,
        alpha: f32,
        glow: Option<f32>,
    ) {
        if self.layers.is_empty() {
            self.layers.push(DrawnLayer::default());
        }
        if let Some(layer) = self.layers.last_mut() {
            layer.discs.push(Disc {
                center,
                radius,
                color,
                alpha,
                glow,
            });
        }
    }
}

/// Surface that records draw calls instead of rasterizing them.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub size: UVec2,
    /// Surface size at the time of every fade.
    pub fades: Vec<(UVec2, f32)>,
    pub circles: Vec<RecordedCircle>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCircle {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub glow: Option<f32>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: UVec2::new(width, height),
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn resize(&mut self, size: UVec2) {
        self.size = size;
    }

    fn fade(&mut self, alpha: f32) {
        self.fades.push((self.size, alpha));
    }

    fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        _color: Srgba,
        alpha: f32,
        glow: Option<f32>,
    ) {
        self.circles.push(RecordedCircle {
            center,
            radius,
            alpha,
            glow,
        });
    }
}
