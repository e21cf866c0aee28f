//! Fallback bodies when the crate is built without `simd`.
//!
//! Every function declines, so the portable loops in the parent module run
//! over the whole column. They are written as plain slice walks the
//! compiler is free to auto-vectorize.

#[inline]
pub(super) fn advance(_pos: &mut [f32], _vel: &[f32], _dt: f32) -> bool {
    false
}

#[inline]
pub(super) fn decay(_values: &mut [f32], _dt: f32) -> Option<usize> {
    None
}

#[inline]
pub(super) fn decay_mask(_values: &mut [f32], _dt: f32) -> Option<u8> {
    None
}
