//! The per-frame loop: fade, update, draw, spawn.

use bevy::math::{UVec2, Vec2};
use rand::Rng;

use super::{
    burst::Burst,
    particle::{BurstKind, ParticleStore},
    surface::Surface,
    tuning::FireworksTuning,
};

/// Length of one simulation tick in seconds.
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

/// Backlog beyond this many ticks per `advance` call is dropped.
const MAX_TICKS_PER_ADVANCE: u32 = 4;

/// Alpha a glitter particle is drawn at while it flickers.
const FLICKER_ALPHA: f32 = 0.2;
const FLICKER_CHANCE: f64 = 0.5;
const GLITTER_GLOW_CHANCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Stopped,
    Running,
}

/// Owns the particle store and drives it one tick at a time.
///
/// The driver never schedules itself: the host calls [`FireworksDriver::advance`]
/// with the frame time, or [`FireworksDriver::tick`] directly.
#[derive(Debug, Default)]
pub struct FireworksDriver {
    state: DriverState,
    store: ParticleStore,
    tuning: FireworksTuning,
    pending_size: Option<UVec2>,
    ignitions: Vec<Vec2>,
    accumulator: f32,
}

impl FireworksDriver {
    pub fn new(tuning: FireworksTuning) -> Self {
        Self {
            tuning,
            ..Default::default()
        }
    }

    /// Enters the running state with an empty store.
    pub fn start(&mut self) {
        self.store.clear();
        self.ignitions.clear();
        self.accumulator = 0.0;
        self.state = DriverState::Running;
    }

    pub fn stop(&mut self) {
        self.ignitions.clear();
        self.state = DriverState::Stopped;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn tuning(&self) -> &FireworksTuning {
        &self.tuning
    }

    pub fn population(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Records the new surface size. It is applied right before the next paint.
    /// Live particles keep their coordinates.
    pub fn resize(&mut self, size: UVec2) {
        self.pending_size = Some(size);
    }

    /// Queues an explosion at `point` for the next tick.
    pub fn ignite(&mut self, point: Vec2) {
        if self.is_running() {
            self.ignitions.push(point);
        }
    }

    /// Runs as many whole ticks as fit into the accumulated frame time.
    /// Returns the number of ticks run.
    pub fn advance(
        &mut self,
        dt: f32,
        surface: &mut impl Surface,
        rng: &mut impl Rng,
        on_explosion: &mut impl FnMut(),
    ) -> u32 {
        if !self.is_running() {
            return 0;
        }

        self.accumulator += dt.max(0.0);
        let mut ticks = 0;
        while self.accumulator >= TICK_SECONDS && ticks < MAX_TICKS_PER_ADVANCE {
            self.accumulator -= TICK_SECONDS;
            self.tick(surface, rng, on_explosion);
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_ADVANCE {
            self.accumulator = 0.0;
        }

        ticks
    }

    /// One frame of the show. Does nothing while stopped.
    pub fn tick(
        &mut self,
        surface: &mut impl Surface,
        rng: &mut impl Rng,
        on_explosion: &mut impl FnMut(),
    ) {
        if !self.is_running() {
            return;
        }

        if let Some(size) = self.pending_size.take() {
            if size != surface.size() {
                surface.resize(size);
            }
        }

        surface.fade(self.tuning.trail_alpha);

        self.store.update_and_compact();
        self.draw(surface, rng);

        for point in std::mem::take(&mut self.ignitions) {
            self.explode(Burst::random(&self.tuning, rng), point, rng, on_explosion);
        }

        if self.store.len() < self.tuning.population_ceiling && self.roll_spawn(rng) {
            let origin = self.launch_point(surface.size(), rng);
            self.explode(Burst::random(&self.tuning, rng), origin, rng, on_explosion);
        }
    }

    /// Adds the particles of `burst` at `origin`, capped so the population stays
    /// within the ceiling. Returns the number of particles added.
    pub fn explode(
        &mut self,
        burst: Burst,
        origin: Vec2,
        rng: &mut impl Rng,
        on_explosion: &mut impl FnMut(),
    ) -> usize {
        let room = self.tuning.population_ceiling.saturating_sub(self.store.len());
        let burst = burst.limited_to(room);
        if burst.count == 0 {
            return 0;
        }

        self.store.append(burst.particles(origin, rng));
        on_explosion();
        burst.count
    }

    fn draw(&self, surface: &mut impl Surface, rng: &mut impl Rng) {
        for particle in self.store.iter() {
            let alpha = if particle.flicker && rng.random_bool(FLICKER_CHANCE) {
                FLICKER_ALPHA
            } else {
                particle.alpha
            };
            let glows =
                particle.kind != BurstKind::Glitter || rng.random_bool(GLITTER_GLOW_CHANCE);
            let glow = glows.then(|| particle.kind.glow_blur());

            surface.fill_circle(particle.pos, particle.size, particle.color, alpha, glow);
        }
    }

    /// A chance that is not a positive number never fires.
    fn roll_spawn(&self, rng: &mut impl Rng) -> bool {
        let chance = self.tuning.spawn_chance;
        if chance.is_nan() || chance <= 0.0 {
            return false;
        }
        rng.random_bool(chance.min(1.0))
    }

    fn launch_point(&self, size: UVec2, rng: &mut impl Rng) -> Vec2 {
        let size = size.as_vec2();
        let height = size.y * self.tuning.launch_zone;
        Vec2::new(
            rng.random_range(0.0..size.x.max(1.0)),
            rng.random_range(0.0..height.max(1.0)),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::fireworks::{
        burst::PALETTE,
        particle::{Particle, spark},
        surface::RecordingSurface,
    };

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2026)
    }

    fn running(tuning: FireworksTuning) -> FireworksDriver {
        let mut driver = FireworksDriver::new(tuning);
        driver.start();
        driver
    }

    fn quiet() -> FireworksTuning {
        FireworksTuning {
            spawn_chance: 0.0,
            ..FireworksTuning::DESKTOP
        }
    }

    #[test]
    fn population_never_exceeds_the_ceiling() {
        for constrained in [false, true] {
            let tuning = FireworksTuning {
                spawn_chance: 1.0,
                ..FireworksTuning::for_profile(constrained)
            };
            let mut driver = running(tuning);
            let mut surface = RecordingSurface::new(800, 600);
            let mut rng = rng();

            for _ in 0..500 {
                driver.ignite(Vec2::new(10.0, 10.0));
                driver.tick(&mut surface, &mut rng, &mut || {});
                assert!(driver.population() <= tuning.population_ceiling);
                surface.circles.clear();
            }
            assert!(driver.population() > 0);
        }
    }

    #[test]
    fn one_notification_per_burst() {
        let mut driver = running(FireworksTuning::DESKTOP);
        let mut rng = rng();
        let mut notifications = 0;

        for count in [1, 60, 110] {
            let added = driver.explode(
                Burst::new(BurstKind::Burst, count, PALETTE[0]),
                Vec2::ZERO,
                &mut rng,
                &mut || notifications += 1,
            );
            assert_eq!(added, count);
        }

        assert_eq!(notifications, 3);
        assert_eq!(driver.population(), 171);
    }

    #[test]
    fn ring_burst_adds_its_particles_to_an_empty_store() {
        let mut driver = running(quiet());
        let mut rng = rng();

        let added = driver.explode(
            Burst::new(BurstKind::Ring, 60, PALETTE[2]),
            Vec2::new(100.0, 100.0),
            &mut rng,
            &mut || {},
        );

        assert_eq!(added, 60);
        assert_eq!(driver.population(), 60);
        assert!(driver.store().iter().all(|p| (3.999..=6.001).contains(&p.vel.length())));
    }

    #[test]
    fn burst_is_clamped_to_the_room_left() {
        let tuning = FireworksTuning {
            population_ceiling: 100,
            ..quiet()
        };
        let mut driver = running(tuning);
        let mut rng = rng();
        let mut notifications = 0;

        let burst = Burst::new(BurstKind::Glitter, 80, PALETTE[5]);
        assert_eq!(driver.explode(burst, Vec2::ZERO, &mut rng, &mut || notifications += 1), 80);
        assert_eq!(driver.explode(burst, Vec2::ZERO, &mut rng, &mut || notifications += 1), 20);
        assert_eq!(driver.explode(burst, Vec2::ZERO, &mut rng, &mut || notifications += 1), 0);

        assert_eq!(driver.population(), 100);
        assert_eq!(notifications, 2);
    }

    #[test]
    fn seeded_store_drains_without_spawning() {
        let tuning = quiet();
        let mut driver = running(tuning);
        let mut rng = rng();
        driver.store.append((0..tuning.population_ceiling).map(|i| {
            let decay = 0.005 + (i % 25) as f32 * 0.001;
            spark(BurstKind::ALL[i % 3], 1.0, decay)
        }));
        let mut surface = RecordingSurface::new(800, 600);
        let mut notifications = 0;
        let mut previous = driver.population();
        let mut saw_decrease = false;

        for _ in 0..1000 {
            driver.tick(&mut surface, &mut rng, &mut || notifications += 1);
            let population = driver.population();
            assert!(population <= previous);
            saw_decrease |= population < previous;
            previous = population;
            surface.circles.clear();
        }

        assert_eq!(notifications, 0);
        assert!(saw_decrease);
        assert_eq!(driver.population(), 0);
    }

    #[test]
    fn resize_repaints_the_new_area_without_moving_particles() {
        let mut driver = running(quiet());
        let mut rng = rng();
        let mut surface = RecordingSurface::new(800, 600);
        driver.explode(
            Burst::new(BurstKind::Burst, 20, PALETTE[1]),
            Vec2::new(400.0, 300.0),
            &mut rng,
            &mut || {},
        );
        driver.tick(&mut surface, &mut rng, &mut || {});
        let before: Vec<Particle> = driver.store().iter().cloned().collect();

        driver.resize(UVec2::new(1200, 800));
        assert_eq!(driver.store().iter().cloned().collect::<Vec<_>>(), before);

        driver.tick(&mut surface, &mut rng, &mut || {});
        driver.tick(&mut surface, &mut rng, &mut || {});

        assert_eq!(surface.fades[0].0, UVec2::new(800, 600));
        assert_eq!(surface.fades[1].0, UVec2::new(1200, 800));
        assert_eq!(surface.fades[2].0, UVec2::new(1200, 800));
        for (old, new) in before.iter().zip(driver.store().iter()) {
            let expected = old.pos + old.vel * 2.0 + Vec2::new(0.0, old.kind.gravity());
            assert!((new.pos - expected).length() < 1e-3);
        }
    }

    #[test]
    fn frame_fades_then_draws_only_survivors() {
        let mut driver = running(quiet());
        driver.store.append([
            spark(BurstKind::Burst, 0.02, 0.03),
            spark(BurstKind::Ring, 0.9, 0.01),
        ]);
        let mut surface = RecordingSurface::new(320, 240);

        driver.tick(&mut surface, &mut rng(), &mut || {});

        assert_eq!(surface.fades, vec![(UVec2::new(320, 240), 0.2)]);
        assert_eq!(surface.circles.len(), 1);
        let circle = &surface.circles[0];
        assert!((circle.alpha - 0.89).abs() < 1e-6);
        assert_eq!(circle.radius, 2.0);
        assert_eq!(circle.glow, Some(BurstKind::Ring.glow_blur()));
    }

    #[test]
    fn glitter_flickers_and_glows_only_sometimes() {
        let mut driver = running(quiet());
        driver.store.append((0..400).map(|_| spark(BurstKind::Glitter, 1.0, 0.001)));
        let mut surface = RecordingSurface::new(100, 100);

        driver.tick(&mut surface, &mut rng(), &mut || {});

        let flickering = surface.circles.iter().filter(|c| c.alpha == FLICKER_ALPHA).count();
        let glowing = surface.circles.iter().filter(|c| c.glow.is_some()).count();
        assert!((120..=280).contains(&flickering), "{flickering} flickered");
        assert!((40..=140).contains(&glowing), "{glowing} glowed");
        assert!(
            surface
                .circles
                .iter()
                .all(|c| c.alpha == FLICKER_ALPHA || (c.alpha - 0.999).abs() < 1e-6)
        );
    }

    #[test]
    fn random_bursts_ignite_in_the_launch_zone() {
        let tuning = FireworksTuning {
            spawn_chance: 1.0,
            population_ceiling: 100_000,
            ..FireworksTuning::DESKTOP
        };
        let mut driver = running(tuning);
        let mut rng = rng();

        for _ in 0..50 {
            let mut surface = RecordingSurface::new(1000, 500);
            driver.store.clear();
            driver.tick(&mut surface, &mut rng, &mut || {});

            let origin = driver.store().iter().next().unwrap().pos;
            assert!((0.0..1000.0).contains(&origin.x));
            assert!((0.0..300.0).contains(&origin.y));
        }
    }

    #[test]
    fn unusable_spawn_chances_never_launch() {
        for spawn_chance in [f64::NAN, -0.5, f64::NEG_INFINITY] {
            let mut driver = running(FireworksTuning {
                spawn_chance,
                ..FireworksTuning::DESKTOP
            });
            let mut surface = RecordingSurface::new(640, 480);
            let mut rng = rng();

            for _ in 0..100 {
                driver.tick(&mut surface, &mut rng, &mut || {});
            }

            assert_eq!(driver.population(), 0, "spawn chance {spawn_chance}");
        }
    }

    #[test]
    fn spawn_chance_above_one_launches_every_tick() {
        let mut driver = running(FireworksTuning {
            spawn_chance: 7.0,
            population_ceiling: 100_000,
            ..FireworksTuning::DESKTOP
        });
        let mut surface = RecordingSurface::new(640, 480);
        let mut notifications = 0;
        let mut rng = rng();

        for _ in 0..10 {
            driver.tick(&mut surface, &mut rng, &mut || notifications += 1);
        }

        assert_eq!(notifications, 10);
    }

    #[test]
    fn ignition_explodes_at_the_point_on_the_next_tick() {
        let mut driver = running(quiet());
        let mut surface = RecordingSurface::new(640, 480);
        let mut notifications = 0;
        let point = Vec2::new(123.0, 45.0);

        driver.ignite(point);
        assert_eq!(driver.population(), 0);
        driver.tick(&mut surface, &mut rng(), &mut || notifications += 1);

        assert_eq!(notifications, 1);
        assert!(driver.population() > 0);
        assert!(driver.store().iter().all(|p| p.pos == point));
    }

    #[test]
    fn stopped_driver_produces_no_frames() {
        let mut driver = running(FireworksTuning::DESKTOP);
        let mut surface = RecordingSurface::new(640, 480);
        let mut rng = rng();
        driver.ignite(Vec2::ZERO);

        driver.stop();
        driver.ignite(Vec2::ZERO);
        driver.tick(&mut surface, &mut rng, &mut || {});
        let ticks = driver.advance(1.0, &mut surface, &mut rng, &mut || {});

        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(ticks, 0);
        assert!(surface.fades.is_empty());
        assert!(surface.circles.is_empty());
    }

    #[test]
    fn restart_begins_with_an_empty_store() {
        let mut driver = running(quiet());
        let mut rng = rng();
        driver.explode(
            Burst::new(BurstKind::Ring, 40, PALETTE[6]),
            Vec2::ZERO,
            &mut rng,
            &mut || {},
        );

        driver.stop();
        driver.start();

        assert!(driver.is_running());
        assert_eq!(driver.population(), 0);
    }

    #[test]
    fn advance_runs_whole_ticks_and_drops_backlog() {
        let mut driver = running(quiet());
        let mut surface = RecordingSurface::new(10, 10);
        let mut rng = rng();

        assert_eq!(driver.advance(TICK_SECONDS * 0.5, &mut surface, &mut rng, &mut || {}), 0);
        assert_eq!(driver.advance(TICK_SECONDS * 0.6, &mut surface, &mut rng, &mut || {}), 1);
        assert_eq!(driver.advance(TICK_SECONDS * 2.05, &mut surface, &mut rng, &mut || {}), 2);
        assert_eq!(driver.advance(5.0, &mut surface, &mut rng, &mut || {}), MAX_TICKS_PER_ADVANCE);
        assert_eq!(driver.advance(0.0, &mut surface, &mut rng, &mut || {}), 0);
        assert_eq!(surface.fades.len(), 3 + MAX_TICKS_PER_ADVANCE as usize);
    }
}
