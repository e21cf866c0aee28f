//! # Dead Set
//!
//! Particles in their fade-out phase. A resident always has `fade > 0`;
//! the tick that takes it to `<= 0` removes it.

use tracing::debug;

use super::{DeathRecord, Vec2};
use crate::batch;
use crate::memory::AlignedBuffer;

/// One fading particle, gathered from all columns.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeadParticle {
    /// Position frozen at the moment of death.
    pub position: Vec2,
    /// Lifetime value the particle died with (`<= 0`).
    pub lifetime: f32,
    /// Seconds of fade-out left.
    pub fade: f32,
}

/// Store of fading particles.
///
/// # Example
///
/// ```rust,ignore
/// let mut dead = DeadSet::new(1.0);
/// dead.absorb(alive.dying());
/// let reaped = dead.age(0.016);
/// ```
#[derive(Debug)]
pub struct DeadSet {
    /// Position x column.
    x: AlignedBuffer<f32>,
    /// Position y column.
    y: AlignedBuffer<f32>,
    /// Lifetime each particle died with.
    lifetime: AlignedBuffer<f32>,
    /// Remaining fade-out seconds.
    fade: AlignedBuffer<f32>,
    /// Fade-out every absorbed particle starts with.
    fade_duration: f32,
}

impl DeadSet {
    /// Creates an empty set whose particles fade over `fade_duration` seconds.
    #[must_use]
    pub fn new(fade_duration: f32) -> Self {
        Self::with_capacity(0, fade_duration)
    }

    /// Creates an empty set with room for `capacity` particles.
    #[must_use]
    pub fn with_capacity(capacity: usize, fade_duration: f32) -> Self {
        Self {
            x: AlignedBuffer::with_capacity(capacity),
            y: AlignedBuffer::with_capacity(capacity),
            lifetime: AlignedBuffer::with_capacity(capacity),
            fade: AlignedBuffer::with_capacity(capacity),
            fade_duration,
        }
    }

    /// Returns the number of fading particles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fade.len()
    }

    /// Checks if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the allocated capacity of each column.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.fade.capacity()
    }

    /// Fade-out every absorbed particle starts with.
    #[inline]
    #[must_use]
    pub const fn fade_duration(&self) -> f32 {
        self.fade_duration
    }

    /// Position x column.
    #[inline]
    #[must_use]
    pub fn positions_x(&self) -> &[f32] {
        self.x.as_slice()
    }

    /// Position y column.
    #[inline]
    #[must_use]
    pub fn positions_y(&self) -> &[f32] {
        self.y.as_slice()
    }

    /// Lifetime each particle died with.
    #[inline]
    #[must_use]
    pub fn lifetimes(&self) -> &[f32] {
        self.lifetime.as_slice()
    }

    /// Remaining fade-out seconds.
    #[inline]
    #[must_use]
    pub fn fades(&self) -> &[f32] {
        self.fade.as_slice()
    }

    /// `remaining / fade_duration` for slot `index`.
    ///
    /// Not clamped; a renderer maps it to alpha and clamps to `[0, 1]` itself.
    #[inline]
    #[must_use]
    pub fn fade_ratio(&self, index: usize) -> Option<f32> {
        self.fades().get(index).map(|fade| fade / self.fade_duration)
    }

    /// Fade ratio of every resident, in slot order.
    pub fn fade_ratios(&self) -> impl Iterator<Item = f32> + '_ {
        let duration = self.fade_duration;
        self.fades().iter().map(move |fade| fade / duration)
    }

    /// Gathers the particle in slot `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<DeadParticle> {
        (index < self.len()).then(|| DeadParticle {
            position: Vec2::new(self.x.as_slice()[index], self.y.as_slice()[index]),
            lifetime: self.lifetime.as_slice()[index],
            fade: self.fade.as_slice()[index],
        })
    }

    /// Iterates over all fading particles.
    pub fn iter(&self) -> impl Iterator<Item = DeadParticle> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Admits freshly dead particles, each starting a full fade-out.
    ///
    /// Grows every column geometrically at most once per call.
    pub fn absorb(&mut self, records: &[DeathRecord]) {
        if records.is_empty() {
            return;
        }
        let previous = self.capacity();
        if self.reserve(records.len()) {
            debug!(from = previous, to = self.capacity(), "dead columns grew");
        }
        for record in records {
            debug_assert!(!(record.lifetime > 0.0), "living particle absorbed");
            self.push(record.x, record.y, record.lifetime, self.fade_duration);
        }
    }

    /// Admits one particle with an explicit remaining fade.
    ///
    /// Returns `false` and stores nothing unless `particle.fade > 0`.
    pub fn insert(&mut self, particle: DeadParticle) -> bool {
        if !(particle.fade > 0.0) {
            return false;
        }
        let previous = self.capacity();
        if self.reserve(1) {
            debug!(from = previous, to = self.capacity(), "dead columns grew");
        }
        self.push(
            particle.position.x,
            particle.position.y,
            particle.lifetime,
            particle.fade,
        );
        true
    }

    /// Ticks every fade-out by `dt` and reaps the ones that reached `<= 0`.
    ///
    /// Reaped slots are refilled from the tail, so order is not kept.
    /// Returns the number reaped.
    pub fn age(&mut self, dt: f32) -> usize {
        let expired = batch::decay(self.fade.as_mut_slice(), dt);
        if expired == 0 {
            return 0;
        }

        // Every fade is already decremented; rows moved in from the tail are
        // examined when the scan revisits the slot.
        let mut index = 0;
        while index < self.len() {
            if self.fade.as_slice()[index] <= 0.0 {
                self.x.swap_remove(index);
                self.y.swap_remove(index);
                self.lifetime.swap_remove(index);
                self.fade.swap_remove(index);
            } else {
                index += 1;
            }
        }
        expired
    }

    fn reserve(&mut self, additional: usize) -> bool {
        self.x.reserve(additional);
        self.y.reserve(additional);
        self.lifetime.reserve(additional);
        self.fade.reserve(additional)
    }

    #[inline]
    fn push(&mut self, x: f32, y: f32, lifetime: f32, fade: f32) {
        self.x.push(x);
        self.y.push(y);
        self.lifetime.push(lifetime);
        self.fade.push(fade);
    }
}
