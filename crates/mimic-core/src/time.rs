//! Time primitives for mimic
//!
//! The capture pipeline and the frame loop share one monotonic timebase:
//! microseconds since the tracking session epoch. It never goes backwards.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Perceptual time (τp) - monotonic, local-driven
/// Represented as microseconds since session start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PerceptualTime(pub u64);

impl PerceptualTime {
    pub const ZERO: PerceptualTime = PerceptualTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        PerceptualTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        PerceptualTime(millis * 1000)
    }

    #[inline]
    pub fn from_duration(duration: Duration) -> Self {
        PerceptualTime(duration.as_micros().min(u64::MAX as u128) as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        PerceptualTime(self.0.saturating_add(duration.as_micros() as u64))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn since(self, earlier: PerceptualTime) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for PerceptualTime {
    type Output = PerceptualTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<PerceptualTime> for PerceptualTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: PerceptualTime) -> Self::Output {
        self.since(rhs)
    }
}

impl std::fmt::Debug for PerceptualTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "τp({:.3}ms)", self.0 as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perceptual_time_conversions() {
        let t = PerceptualTime::from_millis(1500);
        assert_eq!(t.as_micros(), 1_500_000);
        assert_eq!(PerceptualTime::from_duration(Duration::from_millis(1500)), t);
        assert_eq!(PerceptualTime::from_micros(1_500_000), t);
    }

    #[test]
    fn test_sub_saturates() {
        let early = PerceptualTime::from_millis(100);
        let late = PerceptualTime::from_millis(600);

        assert_eq!(late - early, Duration::from_millis(500));
        assert_eq!(early - late, Duration::ZERO);
    }

    #[test]
    fn test_add_duration() {
        let t = PerceptualTime::from_millis(10) + Duration::from_millis(5);
        assert_eq!(t, PerceptualTime::from_millis(15));
    }
}
