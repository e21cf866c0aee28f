//! Stand-in for the renderer: reads what a draw pass would read, and
//! rolls frame reports into a once-per-simulated-second status line.

use cinder_core::{ParticleEngine, TickReport};

/// Per-frame observer of the engine's columns.
#[derive(Debug, Default)]
pub struct FrameProbe {
    peak_alive: usize,
    peak_dead: usize,
    /// Sum of clamped dead alphas from the last frame.
    last_alpha: f32,
}

impl FrameProbe {
    /// Walks alive positions and dead fade ratios like a draw pass.
    pub fn observe(&mut self, engine: &ParticleEngine) {
        let alive = engine.alive();
        let dead = engine.dead();
        debug_assert_eq!(alive.positions_x().len(), alive.positions_y().len());
        debug_assert_eq!(dead.positions_x().len(), dead.fades().len());

        self.peak_alive = self.peak_alive.max(alive.len());
        self.peak_dead = self.peak_dead.max(dead.len());
        self.last_alpha = dead.fade_ratios().map(|ratio| ratio.clamp(0.0, 1.0)).sum();
    }

    /// Highest alive count seen.
    pub const fn peak_alive(&self) -> usize {
        self.peak_alive
    }

    /// Highest dead count seen.
    pub const fn peak_dead(&self) -> usize {
        self.peak_dead
    }

    /// Total dead alpha drawn in the last observed frame.
    pub const fn last_alpha(&self) -> f32 {
        self.last_alpha
    }
}

/// One status line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusLine {
    /// Alive count at the end of the window.
    pub alive: usize,
    /// Dead count at the end of the window.
    pub dead: usize,
    /// Mean frame time over the window in milliseconds.
    pub mean_dt_ms: f32,
    /// `log10(alive)`; negative infinity when nothing is alive.
    pub log_alive: f32,
}

/// Accumulates frames until `period` seconds of simulated time passed.
#[derive(Debug)]
pub struct StatsWindow {
    period: f32,
    elapsed: f32,
    frames: u32,
}

impl StatsWindow {
    /// Creates a window reporting every `period` simulated seconds.
    pub const fn new(period: f32) -> Self {
        Self {
            period,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Records one frame; returns a line once the period is complete.
    pub fn record(&mut self, dt: f32, report: &TickReport) -> Option<StatusLine> {
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < self.period {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let line = StatusLine {
            alive: report.alive,
            dead: report.dead,
            mean_dt_ms: self.elapsed * 1000.0 / self.frames as f32,
            log_alive: (report.alive as f32).log10(),
        };
        self.elapsed = 0.0;
        self.frames = 0;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(alive: usize, dead: usize) -> TickReport {
        TickReport {
            alive,
            dead,
            ..TickReport::default()
        }
    }

    #[test]
    fn test_reports_once_per_period() {
        let mut window = StatsWindow::new(1.0);
        for _ in 0..3 {
            assert!(window.record(0.25, &report(1, 0)).is_none());
        }
        let line = window.record(0.25, &report(100, 7)).unwrap();
        assert_eq!(line.alive, 100);
        assert_eq!(line.dead, 7);
        assert_eq!(line.mean_dt_ms, 250.0);
        assert!((line.log_alive - 2.0).abs() < 1e-6);

        assert!(window.record(0.25, &report(1, 0)).is_none());
    }

    #[test]
    fn test_probe_tracks_peaks() {
        let config = cinder_core::EngineConfig {
            spawner_count: 32,
            spawn_interval: cinder_core::FloatRange::new(0.0, 0.0),
            ..cinder_core::EngineConfig::default()
        };
        let mut engine = ParticleEngine::new(&config).unwrap();
        let mut probe = FrameProbe::default();

        engine.tick(0.016).unwrap();
        probe.observe(&engine);
        assert_eq!(probe.peak_alive(), 32);
        assert_eq!(probe.peak_dead(), 0);
        assert_eq!(probe.last_alpha(), 0.0);
    }
}
