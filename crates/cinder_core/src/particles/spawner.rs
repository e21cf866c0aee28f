//! # Spawner Pool
//!
//! Fixed set of emission sources. Each one accumulates elapsed time and,
//! once it reaches its interval, emits a single particle and restarts from
//! zero.
//!
//! ## Rate limiting
//!
//! A spawner emits at most once per tick. If `dt` spans several intervals
//! the surplus is dropped, not carried: the elapsed counter resets to
//! exactly `0`. Long frames therefore lower the effective emission rate.
//!
//! A zero step emits nothing, even from a zero-interval spawner, so
//! `tick(0)` leaves every count unchanged.

use rand::distributions::Uniform;
use rand::Rng;

use super::{AliveSet, Vec2};
use crate::config::{EngineConfig, FloatRange, RangeSampler};
use crate::error::{ConfigError, ConfigResult};

/// One emission source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spawner {
    /// Where emitted particles start.
    pub position: Vec2,
    /// Seconds between emissions.
    pub interval: f32,
    /// Seconds since the last emission.
    pub elapsed: f32,
}

impl Spawner {
    /// Creates a spawner that has not emitted yet.
    #[inline]
    #[must_use]
    pub const fn new(position: Vec2, interval: f32) -> Self {
        Self {
            position,
            interval,
            elapsed: 0.0,
        }
    }
}

/// Distributions an emitted particle is drawn from.
///
/// Both ranges are half-open; the samplers are built once here.
#[derive(Clone, Copy, Debug)]
pub struct Emission {
    lifetime: FloatRange,
    velocity: FloatRange,
    lifetime_draw: RangeSampler,
    velocity_draw: RangeSampler,
}

impl Emission {
    /// Validates both ranges and builds their samplers.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRange`] naming the offending range.
    pub fn new(lifetime: FloatRange, velocity: FloatRange) -> ConfigResult<Self> {
        Ok(Self {
            lifetime,
            velocity,
            lifetime_draw: lifetime.sampler("lifetime")?,
            velocity_draw: velocity.sampler("velocity")?,
        })
    }

    /// Lifetime range in seconds.
    #[inline]
    #[must_use]
    pub const fn lifetime(&self) -> FloatRange {
        self.lifetime
    }

    /// Per-axis velocity range in units per second.
    #[inline]
    #[must_use]
    pub const fn velocity(&self) -> FloatRange {
        self.velocity
    }

    /// Draws lifetime, then velocity x, then velocity y.
    #[inline]
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, Vec2) {
        let lifetime = self.lifetime_draw.sample(rng);
        let vx = self.velocity_draw.sample(rng);
        let vy = self.velocity_draw.sample(rng);
        (lifetime, Vec2::new(vx, vy))
    }
}

impl Default for Emission {
    fn default() -> Self {
        let lifetime = FloatRange::new(1.0, 3.0);
        let velocity = FloatRange::new(-50.0, 50.0);
        Self {
            lifetime,
            velocity,
            lifetime_draw: RangeSampler::Uniform(Uniform::new(1.0, 3.0)),
            velocity_draw: RangeSampler::Uniform(Uniform::new(-50.0, 50.0)),
        }
    }
}

impl TryFrom<&EngineConfig> for Emission {
    type Error = ConfigError;

    fn try_from(config: &EngineConfig) -> ConfigResult<Self> {
        Self::new(config.lifetime, config.velocity)
    }
}

/// All spawners of an engine.
#[derive(Clone, Debug, Default)]
pub struct SpawnerPool {
    spawners: Vec<Spawner>,
}

impl SpawnerPool {
    /// Wraps an explicit list of spawners.
    #[must_use]
    pub fn new(spawners: Vec<Spawner>) -> Self {
        Self { spawners }
    }

    /// Scatters `config.spawner_count` spawners uniformly over
    /// `[0, width) x [0, height)`, each with an interval drawn from
    /// `config.spawn_interval`.
    ///
    /// # Errors
    ///
    /// Returns the first [`validate`](EngineConfig::validate) failure.
    pub fn scattered<R: Rng + ?Sized>(config: &EngineConfig, rng: &mut R) -> ConfigResult<Self> {
        config.validate()?;
        let x = FloatRange::new(0.0, config.bounds.width).sampler("bounds.width")?;
        let y = FloatRange::new(0.0, config.bounds.height).sampler("bounds.height")?;
        let interval = config.spawn_interval.sampler("spawn_interval")?;

        let spawners = (0..config.spawner_count)
            .map(|_| {
                let position = Vec2::new(x.sample(rng), y.sample(rng));
                Spawner::new(position, interval.sample(rng))
            })
            .collect();
        Ok(Self { spawners })
    }

    /// Returns the number of spawners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    /// Checks if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }

    /// Returns all spawners.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Spawner] {
        &self.spawners
    }

    /// Spawner positions, for a debug overlay.
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.spawners.iter().map(|s| s.position)
    }

    /// Advances every spawner by `dt`; each one that is due emits one
    /// particle into `alive`.
    ///
    /// Draw order per emission: lifetime, velocity x, velocity y. Returns
    /// the number of particles emitted. A step that is not positive
    /// touches nothing and emits nothing.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        alive: &mut AliveSet,
        emission: &Emission,
        rng: &mut R,
    ) -> usize {
        if !(dt > 0.0) {
            return 0;
        }

        let mut emitted = 0;
        for spawner in &mut self.spawners {
            spawner.elapsed += dt;
            if spawner.elapsed < spawner.interval {
                continue;
            }

            let (lifetime, velocity) = emission.draw(rng);
            alive.spawn_into(spawner.position, velocity, lifetime);
            spawner.elapsed = 0.0;
            emitted += 1;
        }
        emitted
    }
}
