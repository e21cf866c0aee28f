//! # Particle Engine
//!
//! Owns one alive set, one dead set and one spawner pool, and runs them in
//! a fixed order once per frame. `tick` is the only mutating entry point.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, trace};

use super::{AliveSet, DeadSet, Emission, Spawner, SpawnerPool};
use crate::config::EngineConfig;
use crate::error::{ConfigResult, EngineError, EngineResult};

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Alive particles that expired and moved to the dead set.
    pub died: usize,
    /// Particles emitted by spawners.
    pub spawned: usize,
    /// Dead particles whose fade-out finished and were discarded.
    pub reaped: usize,
    /// Alive count after the tick.
    pub alive: usize,
    /// Dead count after the tick.
    pub dead: usize,
}

/// The per-frame particle simulation.
///
/// Generic over the uniform random source; [`ChaCha8Rng`] seeded from the
/// config is the default.
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = ParticleEngine::new(&EngineConfig::default())?;
/// loop {
///     let report = engine.tick(clock.delta())?;
///     draw(engine.alive().positions_x(), engine.alive().positions_y());
/// }
/// ```
#[derive(Debug)]
pub struct ParticleEngine<R: Rng = ChaCha8Rng> {
    alive: AliveSet,
    dead: DeadSet,
    spawners: SpawnerPool,
    emission: Emission,
    rng: R,
    ticks: u64,
}

impl ParticleEngine<ChaCha8Rng> {
    /// Builds an engine with spawners scattered per `config`, drawing from a
    /// [`ChaCha8Rng`] seeded with `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns the first [`validate`](EngineConfig::validate) failure.
    pub fn new(config: &EngineConfig) -> ConfigResult<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(config.seed))
    }
}

impl<R: Rng> ParticleEngine<R> {
    /// Builds an engine with spawners scattered per `config`, using `rng`
    /// for both the layout and every emission.
    ///
    /// # Errors
    ///
    /// Returns the first [`validate`](EngineConfig::validate) failure.
    pub fn with_rng(config: &EngineConfig, mut rng: R) -> ConfigResult<Self> {
        let spawners = SpawnerPool::scattered(config, &mut rng)?;
        Self::assemble(config, spawners, rng)
    }

    /// Builds an engine around an explicit spawner list. The config's
    /// spawner count, bounds and interval range are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`validate`](EngineConfig::validate) failure.
    pub fn with_spawners(config: &EngineConfig, spawners: Vec<Spawner>, rng: R) -> ConfigResult<Self> {
        config.validate()?;
        Self::assemble(config, SpawnerPool::new(spawners), rng)
    }

    /// Builds an engine from already populated parts.
    #[must_use]
    pub fn from_parts(
        alive: AliveSet,
        dead: DeadSet,
        spawners: SpawnerPool,
        emission: Emission,
        rng: R,
    ) -> Self {
        Self {
            alive,
            dead,
            spawners,
            emission,
            rng,
            ticks: 0,
        }
    }

    fn assemble(config: &EngineConfig, spawners: SpawnerPool, rng: R) -> ConfigResult<Self> {
        let emission = Emission::try_from(config)?;
        info!(
            spawners = spawners.len(),
            removal = ?config.removal,
            fade = config.fade_duration,
            "particle engine ready"
        );
        Ok(Self::from_parts(
            AliveSet::with_capacity(config.initial_alive_capacity, config.removal),
            DeadSet::with_capacity(config.initial_dead_capacity, config.fade_duration),
            spawners,
            emission,
            rng,
        ))
    }

    /// Advances the simulation by `delta_time` seconds.
    ///
    /// Runs, in order: integrate the alive set, hand the newly dead to the
    /// dead set, let spawners emit, age the dead set.
    ///
    /// `tick(0.0)` changes no position, lifetime, fade or count; spawners
    /// with a zero interval do not emit on a zero step.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDeltaTime`] if `delta_time` is negative or not
    /// finite. Nothing is modified in that case.
    pub fn tick(&mut self, delta_time: f32) -> EngineResult<TickReport> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(EngineError::InvalidDeltaTime(delta_time));
        }

        let died = self.alive.integrate(delta_time);
        self.dead.absorb(self.alive.dying());
        let spawned = self
            .spawners
            .update(delta_time, &mut self.alive, &self.emission, &mut self.rng);
        let reaped = self.dead.age(delta_time);
        self.ticks += 1;

        let report = TickReport {
            died,
            spawned,
            reaped,
            alive: self.alive.len(),
            dead: self.dead.len(),
        };
        trace!(
            tick = self.ticks,
            died,
            spawned,
            reaped,
            alive = report.alive,
            dead = report.dead,
            "tick"
        );
        Ok(report)
    }

    /// Number of alive particles.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Number of fading particles.
    #[inline]
    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }

    /// Number of completed ticks.
    #[inline]
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Read-only view of the alive set.
    #[inline]
    #[must_use]
    pub const fn alive(&self) -> &AliveSet {
        &self.alive
    }

    /// Read-only view of the dead set.
    #[inline]
    #[must_use]
    pub const fn dead(&self) -> &DeadSet {
        &self.dead
    }

    /// Read-only view of the spawners.
    #[inline]
    #[must_use]
    pub const fn spawners(&self) -> &SpawnerPool {
        &self.spawners
    }

    /// Emission distributions in use.
    #[inline]
    #[must_use]
    pub const fn emission(&self) -> &Emission {
        &self.emission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FloatRange;
    use crate::particles::{DeadParticle, RemovalStrategy, Vec2};
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_new_scatters_configured_spawners() {
        let config = EngineConfig {
            spawner_count: 64,
            ..EngineConfig::default()
        };
        let engine = ParticleEngine::new(&config).unwrap();
        assert_eq!(engine.spawners().len(), 64);
        assert_eq!(engine.alive_count(), 0);
        assert_eq!(engine.dead_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            lifetime: FloatRange::new(3.0, 1.0),
            ..EngineConfig::default()
        };
        assert!(ParticleEngine::new(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_delta_without_side_effects() {
        let config = EngineConfig::default();
        let spawners = vec![Spawner::new(Vec2::default(), 0.0)];
        let mut engine = ParticleEngine::with_spawners(&config, spawners, StepRng::new(0, 0)).unwrap();

        for dt in [-0.016, f32::NAN, f32::INFINITY] {
            assert!(matches!(engine.tick(dt), Err(EngineError::InvalidDeltaTime(_))));
        }
        assert_eq!(engine.ticks(), 0);
        assert_eq!(engine.alive_count(), 0);
        assert_eq!(engine.spawners().as_slice()[0].elapsed, 0.0);
    }

    #[test]
    fn test_tick_order_dead_aged_same_tick() {
        // A particle dying this tick is absorbed before ageing, so it
        // already lost `dt` of fade when tick returns.
        let mut alive = AliveSet::new(RemovalStrategy::SwapRemove);
        alive.spawn_into(Vec2::new(1.0, 1.0), Vec2::default(), 0.1);
        let mut engine = ParticleEngine::from_parts(
            alive,
            DeadSet::new(1.0),
            SpawnerPool::default(),
            Emission::default(),
            StepRng::new(0, 0),
        );

        let report = engine.tick(0.25).unwrap();
        assert_eq!(report, TickReport { died: 1, spawned: 0, reaped: 0, alive: 0, dead: 1 });
        assert_eq!(engine.dead().fades(), &[0.75]);
        assert_eq!(engine.dead().lifetimes(), &[0.1f32 - 0.25f32]);
    }

    #[test]
    fn test_zero_tick_with_zero_interval_spawner() {
        let config = EngineConfig::default();
        let spawners = vec![Spawner::new(Vec2::new(1.0, 1.0), 0.0)];
        let mut engine = ParticleEngine::with_spawners(&config, spawners, StepRng::new(0, 0)).unwrap();

        let report = engine.tick(0.0).unwrap();
        assert_eq!(report, TickReport::default());
        assert_eq!(engine.alive_count(), 0);
        assert_eq!(engine.ticks(), 1);

        assert_eq!(engine.tick(0.016).unwrap().spawned, 1);
        assert_eq!(engine.tick(0.0).unwrap().spawned, 0);
        assert_eq!(engine.alive_count(), 1);
    }

    #[test]
    fn test_spawned_particles_not_integrated_same_tick() {
        let spawners = vec![Spawner::new(Vec2::new(2.0, 3.0), 0.0)];
        let config = EngineConfig::default();
        let mut engine = ParticleEngine::with_spawners(&config, spawners, StepRng::new(0, 0)).unwrap();

        engine.tick(0.5).unwrap();
        let row = engine.alive().row(0).unwrap();
        assert_eq!((row.x, row.y), (2.0, 3.0));
        assert_eq!(row.lifetime, 1.0);
    }

    #[test]
    fn test_dead_fade_follows_config() {
        let config = EngineConfig {
            fade_duration: 0.5,
            lifetime: FloatRange::new(0.1, 0.1),
            ..EngineConfig::default()
        };
        let spawners = vec![Spawner::new(Vec2::default(), 10.0)];
        let mut engine = ParticleEngine::with_spawners(&config, spawners, StepRng::new(0, 0)).unwrap();

        assert_eq!(engine.tick(10.0).unwrap().spawned, 1);
        let report = engine.tick(0.2).unwrap();
        assert_eq!(report.died, 1);
        assert_eq!(engine.dead().fade_duration(), 0.5);
        assert_eq!(engine.dead().fade_ratio(0), Some((0.5f32 - 0.2f32) / 0.5));

        // Fade runs out after 0.5 s in total.
        assert_eq!(engine.tick(0.3).unwrap().reaped, 1);
        assert_eq!(engine.dead_count(), 0);
    }

    #[test]
    fn test_inserted_dead_particle_reaped_through_engine() {
        let mut dead = DeadSet::new(1.0);
        dead.insert(DeadParticle {
            position: Vec2::new(1.0, 2.0),
            lifetime: -0.3,
            fade: 0.01,
        });
        let mut engine = ParticleEngine::from_parts(
            AliveSet::default(),
            dead,
            SpawnerPool::default(),
            Emission::default(),
            StepRng::new(0, 0),
        );

        let report = engine.tick(0.02).unwrap();
        assert_eq!(report.reaped, 1);
        assert_eq!(engine.dead_count(), 0);
        assert_eq!(engine.dead().iter().count(), 0);
    }
}
