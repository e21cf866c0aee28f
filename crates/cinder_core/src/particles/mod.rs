//! # Particle Lifecycle
//!
//! Every particle moves through exactly three states:
//!
//! ```text
//!  spawner emits        lifetime <= 0           fade <= 0
//! ──────────────> Alive ─────────────> Dying ─────────────> Removed
//!                (AliveSet)           (DeadSet)            (slot reused)
//! ```
//!
//! Each set owns its own columns; nothing is shared or aliased between
//! them. Particles are created only by a [`SpawnerPool`] and destroyed only
//! by [`DeadSet::age`].

mod alive;
mod dead;
mod engine;
mod spawner;

use bytemuck::{Pod, Zeroable};

pub use alive::{AliveRow, AliveSet, DeathRecord, RemovalStrategy};
pub use dead::{DeadParticle, DeadSet};
pub use engine::{ParticleEngine, TickReport};
pub use spawner::{Emission, Spawner, SpawnerPool};

/// A 2D position or velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vec2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vec2 {
    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
