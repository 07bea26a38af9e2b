//! Frame clock - wall-clock delta between frames for hosts that don't supply one

use std::time::{Duration, Instant};

use mimic_core::PerceptualTime;

/// Largest delta a single frame may observe
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Monotonic frame clock. Each tick advances by the real time since the last
/// tick, clamped so a stall (backgrounded window, debugger) never produces a
/// huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Sum of clamped deltas
    value: PerceptualTime,
    last_update: Instant,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_DELTA)
    }

    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            value: PerceptualTime::ZERO,
            last_update: Instant::now(),
            max_delta,
        }
    }

    /// Advance to now. Returns the clamped delta.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.advance(now.saturating_duration_since(self.last_update), now)
    }

    fn advance(&mut self, elapsed: Duration, now: Instant) -> Duration {
        let clamped = elapsed.min(self.max_delta);
        self.value = self.value.saturating_add(clamped);
        self.last_update = now;
        clamped
    }

    /// Clock time without advancing
    pub fn now(&self) -> PerceptualTime {
        self.value
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    /// Back to zero, measuring from now
    pub fn reset(&mut self) {
        self.value = PerceptualTime::ZERO;
        self.last_update = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
