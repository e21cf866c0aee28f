//! `wide::f32x8` bodies for the batched kernels.
//!
//! Each function returns `None`/`false` when the slice cannot be viewed as
//! whole, aligned vectors; the caller then runs the scalar loop instead.

use wide::{f32x8, CmpLe};

#[inline]
fn as_lanes(values: &[f32]) -> Option<&[f32x8]> {
    bytemuck::try_cast_slice(values).ok()
}

#[inline]
fn as_lanes_mut(values: &mut [f32]) -> Option<&mut [f32x8]> {
    bytemuck::try_cast_slice_mut(values).ok()
}

#[inline]
pub(super) fn advance(pos: &mut [f32], vel: &[f32], dt: f32) -> bool {
    let Some(vel) = as_lanes(vel) else {
        return false;
    };
    let Some(pos) = as_lanes_mut(pos) else {
        return false;
    };

    let d = f32x8::splat(dt);
    for (p, v) in pos.iter_mut().zip(vel) {
        *p = *p + *v * d;
    }
    true
}

#[inline]
pub(super) fn decay(values: &mut [f32], dt: f32) -> Option<usize> {
    let lanes = as_lanes_mut(values)?;
    let d = f32x8::splat(dt);
    let zero = f32x8::splat(0.0);

    let mut expired = 0;
    for v in lanes {
        *v = *v - d;
        expired += v.cmp_le(zero).move_mask().count_ones() as usize;
    }
    Some(expired)
}

#[inline]
pub(super) fn decay_mask(values: &mut [f32], dt: f32) -> Option<u8> {
    let lanes = as_lanes_mut(values)?;
    let [v] = lanes else {
        return None;
    };
    *v = *v - f32x8::splat(dt);
    // Only the low eight bits of the mask are populated.
    Some((v.cmp_le(f32x8::splat(0.0)).move_mask() & 0xFF) as u8)
}
