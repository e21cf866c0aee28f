//! # CINDER Core Engine
//!
//! Structure-of-arrays particle lifecycle engine designed for:
//! - 500,000+ spawners and millions of live particles
//! - One `tick` per frame, run to completion on a single thread
//! - Amortized O(1) spawn and removal
//!
//! ## Architecture Rules
//!
//! 1. **Columns, not structs** - every particle attribute lives in its own
//!    32-byte aligned array, indexed by slot
//! 2. **Batched arithmetic** - integration and ageing run 8 lanes at a time
//! 3. **Unordered removal** - dead slots are refilled from the tail, order
//!    carries no meaning
//!
//! ## Tick order
//!
//! ```text
//! integrate (alive) -> absorb (dead) -> emit (spawners) -> age (dead)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use cinder_core::{EngineConfig, ParticleEngine};
//!
//! let mut engine = ParticleEngine::new(&EngineConfig::default())?;
//! let report = engine.tick(0.016)?;
//! println!("alive={} dead={}", report.alive, report.dead);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod batch;
pub mod config;
pub mod error;
pub mod memory;
pub mod particles;

pub use config::{EngineConfig, FloatRange, WorldBounds};
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use memory::{AlignedBuffer, BUFFER_ALIGN};
pub use particles::{
    AliveRow, AliveSet, DeadParticle, DeadSet, DeathRecord, Emission, ParticleEngine,
    RemovalStrategy, Spawner, SpawnerPool, TickReport, Vec2,
};
