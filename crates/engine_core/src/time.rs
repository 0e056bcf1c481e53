//! Time management for the simulation loop.

use std::time::{Duration, Instant};

/// Nominal frame delta in seconds (~60 Hz).
///
/// Accumulating timers (run cycle, celebration) advance by this constant each
/// tick rather than by the measured frame time.
pub const NOMINAL_DT: f32 = 0.016;

/// Simulation clock: elapsed time plus a tick counter.
///
/// The clock is driven explicitly. A host loop calls [`SimClock::advance`]
/// with the measured frame time, tests step it by [`NOMINAL_DT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    elapsed: f32,
    frame_count: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds and count one frame.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        self.frame_count += 1;
    }

    /// Advance by the nominal delta.
    pub fn step(&mut self) {
        self.advance(NOMINAL_DT);
    }

    /// Total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Wall-clock frame pacing for a host loop running at a fixed rate.
#[derive(Debug)]
pub struct FramePacer {
    last_frame: Instant,
    frame_time: Duration,
}

impl FramePacer {
    /// Create a pacer targeting `hz` frames per second.
    pub fn new(hz: f64) -> Self {
        Self {
            last_frame: Instant::now(),
            frame_time: Duration::from_secs_f64(1.0 / hz),
        }
    }

    /// Sleep out the remainder of the current frame and return the measured
    /// delta in seconds.
    pub fn wait(&mut self) -> f32 {
        let spent = self.last_frame.elapsed();
        if spent < self.frame_time {
            std::thread::sleep(self.frame_time - spent);
        }
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        delta.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_clock_step_accumulates_nominal_delta() {
        let mut clock = SimClock::new();
        for _ in 0..10 {
            clock.step();
        }
        assert_eq!(clock.frame_count(), 10);
        assert!((clock.elapsed_seconds() - 0.16).abs() < 1e-5);
    }

    #[test]
    fn sim_clock_ignores_negative_delta() {
        let mut clock = SimClock::new();
        clock.advance(-1.0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
        assert_eq!(clock.frame_count(), 1);
    }
}
