//! # Error Types
//!
//! All recoverable errors the core can report. Allocation failure is not
//! among them: a failed buffer growth aborts through
//! [`std::alloc::handle_alloc_error`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a running engine.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EngineError {
    /// The host passed a negative, NaN or infinite frame delta.
    ///
    /// The tick is rejected before any state is touched.
    #[error("invalid delta time: {0} (must be finite and >= 0)")]
    InvalidDeltaTime(f32),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `[min, max)` range is inverted or not finite.
    #[error("invalid range for {field}: [{min}, {max})")]
    InvalidRange {
        /// Name of the offending setting.
        field: &'static str,
        /// Lower bound as configured.
        min: f32,
        /// Upper bound as configured.
        max: f32,
    },

    /// A setting that must be strictly positive was not.
    #[error("{field} must be finite and > 0, got {value}")]
    NotPositive {
        /// Name of the offending setting.
        field: &'static str,
        /// Value as configured.
        value: f32,
    },

    /// Spawn intervals are measured in elapsed seconds and cannot be negative.
    #[error("spawn interval must be >= 0, got {0}")]
    NegativeInterval(f32),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
