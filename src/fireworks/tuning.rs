//! Device-dependent constants of the fireworks simulation.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, MapAccess, Visitor},
};

/// Knobs that differ between the desktop and the constrained (mobile) profile.
///
/// All values are per tick, where one tick is one sixtieth of a second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FireworksTuning {
    /// Particle count of a ring explosion.
    pub ring_count: usize,
    /// Base particle count of burst and glitter explosions.
    pub burst_base: usize,
    /// Upper bound of the random extra particles added to `burst_base`.
    pub burst_jitter: usize,
    /// Alpha of the black rectangle painted over every frame.
    pub trail_alpha: f32,
    /// No random explosion is launched while this many particles are alive.
    pub population_ceiling: usize,
    /// Probability that a random explosion is launched on a given tick.
    pub spawn_chance: f64,
    /// Fraction of the surface height, from the top, where random explosions ignite.
    pub launch_zone: f32,
}

impl FireworksTuning {
    pub const DESKTOP: Self = Self {
        ring_count: 60,
        burst_base: 80,
        burst_jitter: 30,
        trail_alpha: 0.2,
        population_ceiling: 800,
        spawn_chance: 0.05,
        launch_zone: 0.6,
    };

    pub const CONSTRAINED: Self = Self {
        ring_count: 40,
        burst_base: 40,
        burst_jitter: 15,
        trail_alpha: 0.25,
        population_ceiling: 400,
        spawn_chance: 0.04,
        launch_zone: 0.6,
    };

    pub fn for_profile(constrained: bool) -> Self {
        if constrained {
            Self::CONSTRAINED
        } else {
            Self::DESKTOP
        }
    }

    /// Reads a possibly partial tuning. Missing fields keep the value from `base`.
    pub fn deserialize_over<'de, D: Deserializer<'de>>(
        base: Self,
        deserializer: D,
    ) -> Result<Self, D::Error> {
        deserializer.deserialize_struct("FireworksTuning", FIELDS, TuningVisitor(base))
    }
}

impl Default for FireworksTuning {
    fn default() -> Self {
        Self::DESKTOP
    }
}

/// For `#[serde(deserialize_with)]`: overrides on top of [`FireworksTuning::DESKTOP`].
pub fn desktop_overrides<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FireworksTuning, D::Error> {
    FireworksTuning::deserialize_over(FireworksTuning::DESKTOP, deserializer)
}

/// For `#[serde(deserialize_with)]`: overrides on top of [`FireworksTuning::CONSTRAINED`].
pub fn constrained_overrides<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FireworksTuning, D::Error> {
    FireworksTuning::deserialize_over(FireworksTuning::CONSTRAINED, deserializer)
}

const FIELDS: &[&str] = &[
    "ring_count",
    "burst_base",
    "burst_jitter",
    "trail_alpha",
    "population_ceiling",
    "spawn_chance",
    "launch_zone",
];

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "snake_case")]
enum Field {
    RingCount,
    BurstBase,
    BurstJitter,
    TrailAlpha,
    PopulationCeiling,
    SpawnChance,
    LaunchZone,
}

struct TuningVisitor(FireworksTuning);

impl<'de> Visitor<'de> for TuningVisitor {
    type Value = FireworksTuning;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("fireworks tuning")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut tuning = self.0;

        while let Some(field) = map.next_key()? {
            match field {
                Field::RingCount => tuning.ring_count = map.next_value()?,
                Field::BurstBase => tuning.burst_base = map.next_value()?,
                Field::BurstJitter => tuning.burst_jitter = map.next_value()?,
                Field::TrailAlpha => tuning.trail_alpha = map.next_value()?,
                Field::PopulationCeiling => tuning.population_ceiling = map.next_value()?,
                Field::SpawnChance => tuning.spawn_chance = map.next_value()?,
                Field::LaunchZone => tuning.launch_zone = map.next_value()?,
            }
        }

        if !(0.0..=1.0).contains(&tuning.spawn_chance) {
            return Err(de::Error::custom(format_args!(
                "spawn_chance must be between 0 and 1, got {}",
                tuning.spawn_chance
            )));
        }

        Ok(tuning)
    }
}
