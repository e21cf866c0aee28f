//! # Batched Column Kernels
//!
//! The arithmetic the alive and dead sets run every tick, expressed over
//! contiguous `f32` columns in fixed groups of [`LANES`].
//!
//! ```text
//! column: [ lane 0..8 ][ lane 8..16 ] ... [ remainder < 8 ]
//!           batched      batched           scalar
//! ```
//!
//! With the `simd` feature the batched part reinterprets the column as
//! `wide::f32x8` in place; that needs the 32-byte alignment the particle
//! sets guarantee. Misaligned input (any plain `Vec<f32>`) quietly takes the
//! scalar path, which computes bit-identical results: both use a separate
//! multiply and add, never a fused one.

#[cfg(feature = "simd")]
mod lanes;
#[cfg(not(feature = "simd"))]
mod scalar;

#[cfg(feature = "simd")]
use lanes as kernel;
#[cfg(not(feature = "simd"))]
use scalar as kernel;

/// Number of particles processed together by one batched operation.
pub const LANES: usize = 8;

/// Length of the prefix of a column that splits evenly into batches.
#[inline]
#[must_use]
pub const fn batched_len(len: usize) -> usize {
    len - len % LANES
}

/// `pos[i] += vel[i] * dt` over the common length of both columns.
#[inline]
pub fn advance_axis(pos: &mut [f32], vel: &[f32], dt: f32) {
    let len = pos.len().min(vel.len());
    let split = batched_len(len);
    let (pos_head, pos_tail) = pos[..len].split_at_mut(split);
    let (vel_head, vel_tail) = vel[..len].split_at(split);

    if !kernel::advance(pos_head, vel_head, dt) {
        advance_scalar(pos_head, vel_head, dt);
    }
    advance_scalar(pos_tail, vel_tail, dt);
}

/// `values[i] -= dt`, returning how many ended at or below zero.
#[inline]
pub fn decay(values: &mut [f32], dt: f32) -> usize {
    let split = batched_len(values.len());
    let (head, tail) = values.split_at_mut(split);

    let expired = match kernel::decay(head, dt) {
        Some(count) => count,
        None => decay_scalar(head, dt),
    };
    expired + decay_scalar(tail, dt)
}

/// One full particle step over exactly [`LANES`] slots.
///
/// Advances both axes, decrements lifetime and returns the death mask:
/// bit `k` is set when lane `k` ended with lifetime `<= 0`.
///
/// # Panics
///
/// Panics if any slice is not exactly [`LANES`] long.
#[inline]
pub fn step_lanes(
    pos_x: &mut [f32],
    pos_y: &mut [f32],
    vel_x: &[f32],
    vel_y: &[f32],
    lifetime: &mut [f32],
    dt: f32,
) -> u8 {
    assert!(
        pos_x.len() == LANES
            && pos_y.len() == LANES
            && vel_x.len() == LANES
            && vel_y.len() == LANES
            && lifetime.len() == LANES,
        "step_lanes needs exactly {LANES} slots per column"
    );

    advance_axis(pos_x, vel_x, dt);
    advance_axis(pos_y, vel_y, dt);
    if let Some(mask) = kernel::decay_mask(lifetime, dt) {
        return mask;
    }

    let mut mask = 0u8;
    for (lane, value) in lifetime.iter_mut().enumerate() {
        *value -= dt;
        if *value <= 0.0 {
            mask |= 1 << lane;
        }
    }
    mask
}

#[inline]
fn advance_scalar(pos: &mut [f32], vel: &[f32], dt: f32) {
    for (p, v) in pos.iter_mut().zip(vel) {
        *p += *v * dt;
    }
}

#[inline]
fn decay_scalar(values: &mut [f32], dt: f32) -> usize {
    let mut expired = 0;
    for value in values.iter_mut() {
        *value -= dt;
        expired += usize::from(*value <= 0.0);
    }
    expired
}
