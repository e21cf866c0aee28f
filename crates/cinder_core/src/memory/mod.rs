//! # Memory Management
//!
//! Owned column storage for the particle sets.
//!
//! ## Design Philosophy
//!
//! Allocation is rare and geometric. During steady state:
//! - Spawning writes into spare capacity
//! - Removal only shrinks the logical length
//! - Every column starts on a 32-byte boundary for 8-lane batches

mod aligned;

pub use aligned::{AlignedBuffer, BUFFER_ALIGN};
