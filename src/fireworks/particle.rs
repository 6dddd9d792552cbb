use bevy::{color::Srgba, math::Vec2};

/// The three explosion styles. Every particle remembers the style of the
/// explosion it came from, since gravity and glow depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BurstKind {
    Burst,
    Ring,
    Glitter,
}

impl BurstKind {
    pub const ALL: [BurstKind; 3] = [BurstKind::Burst, BurstKind::Ring, BurstKind::Glitter];

    /// Downward velocity gained per tick.
    pub fn gravity(self) -> f32 {
        match self {
            BurstKind::Glitter => 0.02,
            BurstKind::Burst | BurstKind::Ring => 0.06,
        }
    }

    /// Blur radius of the glow drawn around a particle.
    pub fn glow_blur(self) -> f32 {
        match self {
            BurstKind::Ring => 15.0,
            BurstKind::Burst | BurstKind::Glitter => 8.0,
        }
    }
}

/// One spark. `decay` and `size` are fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alpha: f32,
    pub color: Srgba,
    pub decay: f32,
    pub size: f32,
    pub flicker: bool,
    pub kind: BurstKind,
}

impl Particle {
    /// Advances the particle by one tick.
    pub fn integrate(&mut self) {
        self.pos += self.vel;
        self.vel.y += self.kind.gravity();
        self.alpha -= self.decay;
    }

    pub fn is_spent(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// Unordered collection of every live particle.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn append(&mut self, particles: impl IntoIterator<Item = Particle>) {
        self.particles.extend(particles);
    }

    /// Integrates every particle by one tick and drops the ones that faded out.
    pub fn update_and_compact(&mut self) {
        self.particles.retain_mut(|particle| {
            particle.integrate();
            !particle.is_spent()
        });
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
pub(crate) fn spark(kind: BurstKind, alpha: f32, decay: f32) -> Particle {
    Particle {
        pos: Vec2::new(10.0, 20.0),
        vel: Vec2::new(1.5, -2.0),
        alpha,
        color: Srgba::WHITE,
        decay,
        size: 2.0,
        flicker: kind == BurstKind::Glitter,
        kind,
    }
}
