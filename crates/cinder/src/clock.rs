//! Frame clock feeding `tick`.

use std::time::Instant;

/// Source of per-frame delta times in seconds.
#[derive(Debug)]
pub enum FrameClock {
    /// Wall time elapsed since the previous frame.
    Wall {
        /// Start of the previous frame.
        last: Instant,
    },
    /// The same step every frame.
    Fixed(f32),
}

impl FrameClock {
    /// Starts a wall clock now.
    pub fn wall() -> Self {
        Self::Wall {
            last: Instant::now(),
        }
    }

    /// A clock that always reports `dt`.
    pub const fn fixed(dt: f32) -> Self {
        Self::Fixed(dt)
    }

    /// Seconds since the previous call (or since construction).
    pub fn delta(&mut self) -> f32 {
        match self {
            Self::Wall { last } => {
                let now = Instant::now();
                let dt = now.duration_since(*last).as_secs_f32();
                *last = now;
                dt
            }
            Self::Fixed(dt) => *dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_repeats() {
        let mut clock = FrameClock::fixed(0.25);
        assert_eq!(clock.delta(), 0.25);
        assert_eq!(clock.delta(), 0.25);
    }

    #[test]
    fn test_wall_non_negative() {
        let mut clock = FrameClock::wall();
        for _ in 0..3 {
            let dt = clock.delta();
            assert!(dt >= 0.0 && dt.is_finite());
        }
    }
}
