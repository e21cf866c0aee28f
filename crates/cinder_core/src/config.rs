//! # Engine Configuration
//!
//! Everything that used to be a start-up constant: spawner count, world
//! bounds, emission ranges, fade duration and the removal strategy.
//!
//! Loaded once at startup, usually from TOML:
//!
//! ```toml
//! spawner_count = 500000
//! fade_duration = 1.0
//! removal = "swap_remove"
//!
//! [bounds]
//! width = 800.0
//! height = 600.0
//!
//! [lifetime]
//! min = 1.0
//! max = 3.0
//! ```
//!
//! Omitted keys fall back to [`EngineConfig::default`].

use std::path::Path;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::particles::RemovalStrategy;

/// A half-open `[min, max)` interval to draw values from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Inclusive lower bound.
    pub min: f32,
    /// Exclusive upper bound (equal to `min` for a constant).
    pub max: f32,
}

impl FloatRange {
    /// Creates a new range.
    #[inline]
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Builds the sampler for this range once, after validating it.
    pub(crate) fn sampler(self, field: &'static str) -> ConfigResult<RangeSampler> {
        self.validate(field)?;
        Ok(if self.min < self.max {
            RangeSampler::Uniform(Uniform::new(self.min, self.max))
        } else {
            RangeSampler::Constant(self.min)
        })
    }

    fn validate(self, field: &'static str) -> ConfigResult<()> {
        // A finite width keeps `Uniform::new` from overflowing.
        if self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && (self.max - self.min).is_finite()
        {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Draws from a validated [`FloatRange`]. Never returns `max` unless the
/// range is a single value.
#[derive(Clone, Copy, Debug)]
pub(crate) enum RangeSampler {
    /// `min == max`.
    Constant(f32),
    /// `min < max`.
    Uniform(Uniform<f32>),
}

impl RangeSampler {
    #[inline]
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Uniform(uniform) => uniform.sample(rng),
        }
    }
}

/// Rectangle spawners are scattered over, anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Extent along x.
    pub width: f32,
    /// Extent along y.
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Configuration handed to [`ParticleEngine`](crate::ParticleEngine) at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of spawners laid out by [`ParticleEngine::new`](crate::ParticleEngine::new).
    pub spawner_count: usize,
    /// Area the random spawner layout covers.
    pub bounds: WorldBounds,
    /// Per-spawner emission interval in seconds.
    pub spawn_interval: FloatRange,
    /// Lifetime of an emitted particle in seconds.
    pub lifetime: FloatRange,
    /// Velocity of an emitted particle, drawn independently per axis.
    pub velocity: FloatRange,
    /// Seconds a dead particle spends fading out.
    pub fade_duration: f32,
    /// How dying particles leave the alive set.
    pub removal: RemovalStrategy,
    /// Alive columns reserved up front (0 = grow on first spawn).
    pub initial_alive_capacity: usize,
    /// Dead columns reserved up front (0 = grow on first death).
    pub initial_dead_capacity: usize,
    /// Seed for the default random source.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spawner_count: 500_000,
            bounds: WorldBounds::default(),
            spawn_interval: FloatRange::new(0.1, 0.5),
            lifetime: FloatRange::new(1.0, 3.0),
            velocity: FloatRange::new(-50.0, 50.0),
            fade_duration: 1.0,
            removal: RemovalStrategy::default(),
            initial_alive_capacity: 0,
            initial_dead_capacity: 0,
            seed: 0x5EED_C1DE_u64,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and any
    /// [`validate`](Self::validate) error for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every range and scalar for consistency.
    ///
    /// A spawn interval of exactly zero is allowed: such a spawner emits on
    /// every tick.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.spawn_interval.validate("spawn_interval")?;
        if self.spawn_interval.min < 0.0 {
            return Err(ConfigError::NegativeInterval(self.spawn_interval.min));
        }
        self.lifetime.validate("lifetime")?;
        self.velocity.validate("velocity")?;
        positive("fade_duration", self.fade_duration)?;
        positive("bounds.width", self.bounds.width)?;
        positive("bounds.height", self.bounds.height)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
