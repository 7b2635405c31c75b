//! Fixed-timestep frame clock
//!
//! The host calls [`FrameClock::advance`] once per display frame with its
//! timestamp; the clock answers how many simulation ticks to run.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame delta honoured (s); longer gaps (tab switch) are dropped
pub const MAX_FRAME_DELTA: f32 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame timestamp (ms) and get the number of ticks due
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DELTA);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }

    /// Forget the last timestamp, e.g. after the page was hidden
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_nothing() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1000.0), 0);
    }

    #[test]
    fn test_steady_60hz() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        let total: u32 = (1..=60).map(|i| clock.advance(i as f64 * 1000.0 / 60.0 + 0.01)).sum();
        assert!((59..=60).contains(&total));
    }

    #[test]
    fn test_long_gap_is_capped() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        // 5 s gap: capped to 100 ms, about six ticks
        let steps = clock.advance(5000.0);
        assert!((5..=6).contains(&steps));
    }
}
