//! Generation of the particles of a single explosion.

use std::{f32::consts::TAU, ops::Range};

use bevy::{color::Srgba, math::Vec2};
use rand::Rng;

use super::{
    particle::{BurstKind, Particle},
    tuning::FireworksTuning,
};

/// Every explosion picks one of these colors for all of its particles.
pub const PALETTE: [Srgba; 7] = [
    Srgba::rgb(1.0, 0.078, 0.380),
    Srgba::rgb(0.094, 1.0, 0.573),
    Srgba::rgb(0.353, 0.529, 1.0),
    Srgba::rgb(0.984, 0.953, 0.549),
    Srgba::rgb(1.0, 1.0, 1.0),
    Srgba::rgb(1.0, 0.647, 0.0),
    Srgba::rgb(0.867, 0.627, 0.867),
];

const RING_SPEED: Range<f32> = 4.0..6.0;
const BURST_SPEED: Range<f32> = 1.0..7.0;
const GLITTER_SPEED: Range<f32> = 1.0..9.0;

const DECAY: Range<f32> = 0.01..0.03;
const GLITTER_DECAY: Range<f32> = 0.005..0.02;

const SIZE: Range<f32> = 1.0..3.0;
const GLITTER_SIZE: Range<f32> = 0.5..2.5;

/// The parameters shared by every particle of one explosion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub kind: BurstKind,
    pub count: usize,
    pub color: Srgba,
}

impl Burst {
    pub fn new(kind: BurstKind, count: usize, color: Srgba) -> Self {
        Self { kind, count, color }
    }

    /// Picks a kind, a particle count and a palette color.
    pub fn random(tuning: &FireworksTuning, rng: &mut impl Rng) -> Self {
        let kind = BurstKind::ALL[rng.random_range(0..BurstKind::ALL.len())];
        let count = match kind {
            BurstKind::Ring => tuning.ring_count,
            BurstKind::Burst | BurstKind::Glitter => {
                tuning.burst_base + rng.random_range(0..=tuning.burst_jitter)
            }
        };
        let color = PALETTE[rng.random_range(0..PALETTE.len())];

        Self { kind, count, color }
    }

    /// Caps the particle count. A capped ring is spread evenly over its new count.
    pub fn limited_to(self, max: usize) -> Self {
        Self {
            count: self.count.min(max),
            ..self
        }
    }

    /// Creates the particles, all starting at `origin` at full opacity.
    pub fn particles(&self, origin: Vec2, rng: &mut impl Rng) -> Vec<Particle> {
        let glitter = self.kind == BurstKind::Glitter;

        (0..self.count)
            .map(|i| {
                let (angle, speed) = match self.kind {
                    BurstKind::Ring => (
                        i as f32 / self.count as f32 * TAU,
                        rng.random_range(RING_SPEED),
                    ),
                    BurstKind::Burst => (rng.random_range(0.0..TAU), rng.random_range(BURST_SPEED)),
                    BurstKind::Glitter => {
                        (rng.random_range(0.0..TAU), rng.random_range(GLITTER_SPEED))
                    }
                };
                let (decay, size) = if glitter {
                    (rng.random_range(GLITTER_DECAY), rng.random_range(GLITTER_SIZE))
                } else {
                    (rng.random_range(DECAY), rng.random_range(SIZE))
                };

                Particle {
                    pos: origin,
                    vel: Vec2::from_angle(angle) * speed,
                    alpha: 1.0,
                    color: self.color,
                    decay,
                    size,
                    flicker: glitter,
                    kind: self.kind,
                }
            })
            .collect()
    }
}
