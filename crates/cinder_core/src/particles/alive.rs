//! # Alive Set
//!
//! Structure-of-arrays store of living particles.
//!
//! ```text
//! pos_x:    [x0, x1, x2, ... x(n-1) | spare capacity ]
//! pos_y:    [y0, y1, y2, ... y(n-1) | spare capacity ]
//! vel_x:    [..................     |                ]
//! vel_y:    [..................     |                ]
//! lifetime: [l0, l1, l2, ... l(n-1) |                ]
//! ```
//!
//! Slot `i` of every column belongs to the same particle. Slot order means
//! nothing, so removal is free to move the tail into a hole.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Vec2;
use crate::batch::{self, LANES};
use crate::memory::AlignedBuffer;

/// How dying particles are taken out of the alive region.
///
/// Both produce the same survivors and the same dying records; they differ
/// in memory traffic and branch behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStrategy {
    /// Pass 1 steps every batch branch-free and only counts deaths.
    /// Pass 2 stages the survivors stranded in the tail in scratch storage
    /// and drops them into the dead slots of the head.
    #[default]
    CountThenCompact,
    /// Deaths found in a batch are swapped with the current tail on the
    /// spot. A tail row that had not been stepped yet is stepped as soon as
    /// it lands, so every particle advances exactly once per tick.
    SwapRemove,
}

/// One alive particle, gathered from all columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct AliveRow {
    /// Position x.
    pub x: f32,
    /// Position y.
    pub y: f32,
    /// Velocity x.
    pub vx: f32,
    /// Velocity y.
    pub vy: f32,
    /// Seconds left to live.
    pub lifetime: f32,
}

/// A particle that just died: where it was and its lifetime after the
/// decrement that killed it (zero or negative, never clamped).
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DeathRecord {
    /// Position x at the moment of death.
    pub x: f32,
    /// Position y at the moment of death.
    pub y: f32,
    /// Post-decrement lifetime.
    pub lifetime: f32,
}

/// The five parallel columns.
#[derive(Debug, Default)]
struct Columns {
    x: AlignedBuffer<f32>,
    y: AlignedBuffer<f32>,
    vx: AlignedBuffer<f32>,
    vy: AlignedBuffer<f32>,
    lifetime: AlignedBuffer<f32>,
}

impl Columns {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            x: AlignedBuffer::with_capacity(capacity),
            y: AlignedBuffer::with_capacity(capacity),
            vx: AlignedBuffer::with_capacity(capacity),
            vy: AlignedBuffer::with_capacity(capacity),
            lifetime: AlignedBuffer::with_capacity(capacity),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.lifetime.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.lifetime.capacity()
    }

    /// Appends a row; all columns share length and capacity, so they grow
    /// together.
    #[inline]
    fn push(&mut self, row: AliveRow) -> bool {
        self.x.push(row.x);
        self.y.push(row.y);
        self.vx.push(row.vx);
        self.vy.push(row.vy);
        self.lifetime.push(row.lifetime)
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        self.x.truncate(len);
        self.y.truncate(len);
        self.vx.truncate(len);
        self.vy.truncate(len);
        self.lifetime.truncate(len);
    }

    #[inline]
    fn view(&mut self) -> ColumnsMut<'_> {
        ColumnsMut {
            x: self.x.as_mut_slice(),
            y: self.y.as_mut_slice(),
            vx: self.vx.as_mut_slice(),
            vy: self.vy.as_mut_slice(),
            lifetime: self.lifetime.as_mut_slice(),
        }
    }
}

/// Mutable slices over the live region of every column.
struct ColumnsMut<'a> {
    x: &'a mut [f32],
    y: &'a mut [f32],
    vx: &'a mut [f32],
    vy: &'a mut [f32],
    lifetime: &'a mut [f32],
}

impl ColumnsMut<'_> {
    #[inline]
    fn row(&self, i: usize) -> AliveRow {
        AliveRow {
            x: self.x[i],
            y: self.y[i],
            vx: self.vx[i],
            vy: self.vy[i],
            lifetime: self.lifetime[i],
        }
    }

    #[inline]
    fn write_row(&mut self, i: usize, row: AliveRow) {
        self.x[i] = row.x;
        self.y[i] = row.y;
        self.vx[i] = row.vx;
        self.vy[i] = row.vy;
        self.lifetime[i] = row.lifetime;
    }

    #[inline]
    fn move_row(&mut self, from: usize, to: usize) {
        let row = self.row(from);
        self.write_row(to, row);
    }

    #[inline]
    fn death(&self, i: usize) -> DeathRecord {
        DeathRecord {
            x: self.x[i],
            y: self.y[i],
            lifetime: self.lifetime[i],
        }
    }

    /// Scalar step of one slot. Returns `true` if it expired.
    #[inline]
    fn step(&mut self, i: usize, dt: f32) -> bool {
        self.x[i] += self.vx[i] * dt;
        self.y[i] += self.vy[i] * dt;
        self.lifetime[i] -= dt;
        self.lifetime[i] <= 0.0
    }

    /// Batched step of `[start, start + LANES)`. Returns the death mask.
    #[inline]
    fn step_batch(&mut self, start: usize, dt: f32) -> u8 {
        let end = start + LANES;
        batch::step_lanes(
            &mut self.x[start..end],
            &mut self.y[start..end],
            &self.vx[start..end],
            &self.vy[start..end],
            &mut self.lifetime[start..end],
            dt,
        )
    }
}

/// Store of living particles.
///
/// # Example
///
/// ```rust,ignore
/// let mut alive = AliveSet::new(RemovalStrategy::SwapRemove);
/// alive.spawn_into(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 0.5);
///
/// let died = alive.integrate(1.0);
/// assert_eq!(died, 1);
/// assert_eq!(alive.dying()[0].lifetime, -0.5);
/// ```
#[derive(Debug, Default)]
pub struct AliveSet {
    /// Per-attribute columns.
    columns: Columns,
    /// Survivors lifted out of the tail during compaction.
    scratch: AlignedBuffer<AliveRow>,
    /// Particles that died during the last integrate.
    dying: AlignedBuffer<DeathRecord>,
    /// Removal strategy used by [`integrate`](Self::integrate).
    strategy: RemovalStrategy,
}

impl AliveSet {
    /// Creates an empty set without allocating.
    #[must_use]
    pub fn new(strategy: RemovalStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Creates an empty set with room for `capacity` particles.
    #[must_use]
    pub fn with_capacity(capacity: usize, strategy: RemovalStrategy) -> Self {
        Self {
            columns: Columns::with_capacity(capacity),
            strategy,
            ..Self::default()
        }
    }

    /// Returns the number of alive particles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
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
        self.columns.capacity()
    }

    /// Returns the configured removal strategy.
    #[inline]
    #[must_use]
    pub const fn strategy(&self) -> RemovalStrategy {
        self.strategy
    }

    /// Position x column over the live region.
    #[inline]
    #[must_use]
    pub fn positions_x(&self) -> &[f32] {
        self.columns.x.as_slice()
    }

    /// Position y column over the live region.
    #[inline]
    #[must_use]
    pub fn positions_y(&self) -> &[f32] {
        self.columns.y.as_slice()
    }

    /// Velocity x column over the live region.
    #[inline]
    #[must_use]
    pub fn velocities_x(&self) -> &[f32] {
        self.columns.vx.as_slice()
    }

    /// Velocity y column over the live region.
    #[inline]
    #[must_use]
    pub fn velocities_y(&self) -> &[f32] {
        self.columns.vy.as_slice()
    }

    /// Lifetime column over the live region.
    #[inline]
    #[must_use]
    pub fn lifetimes(&self) -> &[f32] {
        self.columns.lifetime.as_slice()
    }

    /// Gathers the particle in slot `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<AliveRow> {
        (index < self.len()).then(|| AliveRow {
            x: self.positions_x()[index],
            y: self.positions_y()[index],
            vx: self.velocities_x()[index],
            vy: self.velocities_y()[index],
            lifetime: self.lifetimes()[index],
        })
    }

    /// Iterates over all alive particles as gathered rows.
    pub fn iter(&self) -> impl Iterator<Item = AliveRow> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Particles removed by the most recent integrate, in no particular order.
    #[inline]
    #[must_use]
    pub fn dying(&self) -> &[DeathRecord] {
        self.dying.as_slice()
    }

    /// Appends one particle at slot `len`.
    ///
    /// When the columns are full they all move to a doubled allocation
    /// first; the live prefix is copied bit for bit. Returns `true` if this
    /// call grew the columns.
    pub fn spawn_into(&mut self, position: Vec2, velocity: Vec2, lifetime: f32) -> bool {
        let previous = self.columns.capacity();
        let grew = self.columns.push(AliveRow {
            x: position.x,
            y: position.y,
            vx: velocity.x,
            vy: velocity.y,
            lifetime,
        });
        if grew {
            debug!(
                from = previous,
                to = self.columns.capacity(),
                "alive columns grew"
            );
        }
        grew
    }

    /// Advances every particle by `dt` with the configured strategy.
    ///
    /// Returns the number that died; their records are in [`dying`](Self::dying).
    pub fn integrate(&mut self, dt: f32) -> usize {
        self.integrate_and_partition(dt, self.strategy)
    }

    /// Advances every particle by `dt` and moves the ones whose lifetime
    /// reached `<= 0` out of the alive region.
    ///
    /// For every particle: `position += velocity * dt`, `lifetime -= dt`.
    /// Afterwards `[0, len)` holds only survivors and [`dying`](Self::dying)
    /// holds one record per death. Returns the number of deaths.
    pub fn integrate_and_partition(&mut self, dt: f32, strategy: RemovalStrategy) -> usize {
        self.dying.clear();
        if self.is_empty() {
            return 0;
        }
        match strategy {
            RemovalStrategy::CountThenCompact => self.integrate_compact(dt),
            RemovalStrategy::SwapRemove => self.integrate_swap_remove(dt),
        }
    }

    fn integrate_compact(&mut self, dt: f32) -> usize {
        let len = self.columns.len();
        let mut view = self.columns.view();

        // Pass 1: branch-free arithmetic, deaths are only counted.
        batch::advance_axis(view.x, view.vx, dt);
        batch::advance_axis(view.y, view.vy, dt);
        let died = batch::decay(view.lifetime, dt);
        if died == 0 {
            return 0;
        }

        // Pass 2: the final live region is [0, keep). The survivors sitting
        // in [keep, len) are exactly as many as the dead slots in [0, keep).
        let keep = len - died;
        self.scratch.clear();
        self.scratch.reserve(died);
        self.dying.reserve(died);

        for index in (keep..len).rev() {
            if view.lifetime[index] <= 0.0 {
                self.dying.push(view.death(index));
            } else {
                self.scratch.push(view.row(index));
            }
        }

        let survivors = self.scratch.as_slice();
        let mut next = 0;
        for index in 0..keep {
            if next == survivors.len() {
                break;
            }
            if view.lifetime[index] <= 0.0 {
                self.dying.push(view.death(index));
                view.write_row(index, survivors[next]);
                next += 1;
            }
        }
        debug_assert_eq!(next, survivors.len());
        debug_assert_eq!(self.dying.len(), died);

        self.columns.truncate(keep);
        died
    }

    fn integrate_swap_remove(&mut self, dt: f32) -> usize {
        let mut len = self.columns.len();
        let mut view = self.columns.view();
        let mut died = 0;

        let mut start = 0;
        while start + LANES <= len {
            let batch_end = start + LANES;
            let mask = view.step_batch(start, dt);

            // High lanes first: every slot above the one being filled is
            // then already a stepped survivor.
            if mask != 0 {
                for lane in (0..LANES).rev() {
                    if mask & (1 << lane) == 0 {
                        continue;
                    }
                    let slot = start + lane;
                    loop {
                        self.dying.push(view.death(slot));
                        died += 1;
                        len -= 1;
                        if slot == len {
                            break;
                        }
                        view.move_row(len, slot);
                        if len < batch_end || !view.step(slot, dt) {
                            break;
                        }
                    }
                }
            }
            start = batch_end;
        }

        // Remainder: the row swapped into `index` has not been stepped yet,
        // so the same index is visited again.
        let mut index = start;
        while index < len {
            if !view.step(index, dt) {
                index += 1;
                continue;
            }
            self.dying.push(view.death(index));
            died += 1;
            len -= 1;
            if index != len {
                view.move_row(len, index);
            }
        }

        self.columns.truncate(len);
        died
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGIES: [RemovalStrategy; 2] =
        [RemovalStrategy::CountThenCompact, RemovalStrategy::SwapRemove];

    /// Particle `i` sits at (i, i) moving +1 on x, with the given lifetime.
    fn set_with(lifetimes: &[f32], strategy: RemovalStrategy) -> AliveSet {
        let mut alive = AliveSet::new(strategy);
        for (i, &life) in lifetimes.iter().enumerate() {
            let f = i as f32;
            alive.spawn_into(Vec2::new(f, f), Vec2::new(1.0, 0.0), life);
        }
        alive
    }

    fn sorted_by_y(mut rows: Vec<(f32, f32, f32)>) -> Vec<(f32, f32, f32)> {
        rows.sort_by(|a, b| a.1.total_cmp(&b.1));
        rows
    }

    #[test]
    fn test_spawn_and_columns() {
        let mut alive = AliveSet::new(RemovalStrategy::default());
        assert!(alive.spawn_into(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), 5.0));
        assert!(!alive.spawn_into(Vec2::new(6.0, 7.0), Vec2::new(8.0, 9.0), 10.0));

        assert_eq!(alive.len(), 2);
        assert_eq!(alive.positions_x(), &[1.0, 6.0]);
        assert_eq!(alive.positions_y(), &[2.0, 7.0]);
        assert_eq!(alive.velocities_x(), &[3.0, 8.0]);
        assert_eq!(alive.velocities_y(), &[4.0, 9.0]);
        assert_eq!(alive.lifetimes(), &[5.0, 10.0]);
        assert!(alive.row(2).is_none());
    }

    #[test]
    fn test_growth_preserves_every_column() {
        let lifetimes: Vec<f32> = (0..16).map(|i| 1.0 + i as f32).collect();
        let mut alive = set_with(&lifetimes, RemovalStrategy::default());
        assert_eq!(alive.capacity(), 16);
        let before: Vec<AliveRow> = alive.iter().collect();

        assert!(alive.spawn_into(Vec2::new(-1.0, -1.0), Vec2::default(), 9.0));
        assert_eq!(alive.capacity(), 32);

        let after: Vec<AliveRow> = alive.iter().take(16).collect();
        assert_eq!(bytemuck::cast_slice::<AliveRow, u8>(&before), bytemuck::cast_slice::<AliveRow, u8>(&after));
    }

    #[test]
    fn test_integrate_moves_without_deaths() {
        for strategy in STRATEGIES {
            let mut alive = set_with(&[5.0; 13], strategy);
            assert_eq!(alive.integrate(0.5), 0);
            assert!(alive.dying().is_empty());
            for row in alive.iter() {
                assert_eq!(row.x, row.y + 0.5);
                assert_eq!(row.lifetime, 4.5);
            }
        }
    }

    #[test]
    fn test_death_value_is_not_clamped() {
        for strategy in STRATEGIES {
            let mut alive = set_with(&[0.01], strategy);
            assert_eq!(alive.integrate(0.02), 1);
            assert!(alive.is_empty());

            let record = alive.dying()[0];
            assert_eq!(record.lifetime, 0.01f32 - 0.02f32);
            assert_eq!(record.x, 0.02);
            assert_eq!(record.y, 0.0);
        }
    }

    #[test]
    fn test_empty_and_single_element() {
        for strategy in STRATEGIES {
            let mut empty = AliveSet::new(strategy);
            assert_eq!(empty.integrate(1.0), 0);
            assert!(empty.is_empty());

            let mut single = set_with(&[2.0], strategy);
            assert_eq!(single.integrate(1.0), 0);
            assert_eq!(single.len(), 1);
            assert_eq!(single.integrate(1.0), 1);
            assert!(single.is_empty());
            assert_eq!(single.integrate(1.0), 0);
        }
    }

    #[test]
    fn test_every_survivor_stepped_exactly_once() {
        // Deaths in the first batch, the second batch and the remainder,
        // plus dead rows at the very tail that get swapped into holes.
        let mut lifetimes = vec![5.0f32; 27];
        for i in [0, 3, 7, 9, 15, 20, 25, 26] {
            lifetimes[i] = 0.5;
        }

        for strategy in STRATEGIES {
            let mut alive = set_with(&lifetimes, strategy);
            assert_eq!(alive.integrate(1.0), 8);
            assert_eq!(alive.len(), 19);
            assert_eq!(alive.dying().len(), 8);

            for row in alive.iter() {
                assert_eq!(row.x, row.y + 1.0, "{strategy:?} stepped a row twice or not at all");
                assert_eq!(row.lifetime, 4.0);
            }
            for record in alive.dying() {
                assert_eq!(record.x, record.y + 1.0);
                assert_eq!(record.lifetime, -0.5);
            }
        }
    }

    #[test]
    fn test_strategies_agree() {
        let lifetimes: Vec<f32> = (0..100).map(|i| ((i * 37) % 11) as f32 * 0.1).collect();

        let mut compact = set_with(&lifetimes, RemovalStrategy::CountThenCompact);
        let mut swap = set_with(&lifetimes, RemovalStrategy::SwapRemove);
        assert_eq!(compact.integrate(0.35), swap.integrate(0.35));

        let alive_a = sorted_by_y(compact.iter().map(|r| (r.x, r.y, r.lifetime)).collect());
        let alive_b = sorted_by_y(swap.iter().map(|r| (r.x, r.y, r.lifetime)).collect());
        assert_eq!(alive_a, alive_b);

        let dying_a = sorted_by_y(compact.dying().iter().map(|d| (d.x, d.y, d.lifetime)).collect());
        let dying_b = sorted_by_y(swap.dying().iter().map(|d| (d.x, d.y, d.lifetime)).collect());
        assert_eq!(dying_a, dying_b);
    }

    #[test]
    fn test_all_die() {
        for strategy in STRATEGIES {
            let mut alive = set_with(&[0.1; 19], strategy);
            assert_eq!(alive.integrate(1.0), 19);
            assert!(alive.is_empty());
            assert_eq!(alive.dying().len(), 19);
        }
    }

    #[test]
    fn test_dying_cleared_each_integrate() {
        let mut alive = set_with(&[0.1, 5.0], RemovalStrategy::default());
        assert_eq!(alive.integrate(0.5), 1);
        assert_eq!(alive.integrate(0.5), 0);
        assert!(alive.dying().is_empty());
    }

    #[test]
    fn test_explicit_strategy_overrides_configured() {
        let mut alive = set_with(&[0.1; 9], RemovalStrategy::CountThenCompact);
        assert_eq!(alive.integrate_and_partition(1.0, RemovalStrategy::SwapRemove), 9);
        assert_eq!(alive.strategy(), RemovalStrategy::CountThenCompact);
    }
}
