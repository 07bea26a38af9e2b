//! Animation State - per-avatar frame accumulator

use crate::BlinkPhase;

/// Everything the controllers carry from one frame to the next
///
/// Created on mount, mutated once per frame by the frame loop only,
/// discarded on teardown. Never shared between avatars.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Seconds since mount (sum of clamped frame deltas)
    pub elapsed: f32,
    /// Frames since mount
    pub frame: u64,

    pub blink: BlinkPhase,
    /// Eyelid weight written last frame
    pub blink_weight: f32,

    /// Breathing oscillator phase, radians in [0, 2π)
    pub breathing_phase: f32,

    /// Smoothed head rotation, radians
    pub head_pitch: f32,
    pub head_yaw: f32,
    /// Smoothed neck rotation, radians
    pub neck_pitch: f32,
    pub neck_yaw: f32,

    /// Smoothed audio amplitude envelope in [0, 1]
    pub envelope: f32,
    /// Viseme oscillator phase; only advances while speaking
    pub viseme_phase: f32,
}

impl AnimationState {
    /// Fresh state with the first blink `first_blink_in` seconds away
    pub fn new(first_blink_in: f32) -> Self {
        Self {
            elapsed: 0.0,
            frame: 0,
            blink: BlinkPhase::Idle {
                countdown: first_blink_in,
            },
            blink_weight: 0.0,
            breathing_phase: 0.0,
            head_pitch: 0.0,
            head_yaw: 0.0,
            neck_pitch: 0.0,
            neck_yaw: 0.0,
            envelope: 0.0,
            viseme_phase: 0.0,
        }
    }

    /// Advance the clocks by a (pre-clamped) delta
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_neutral() {
        let state = AnimationState::new(3.0);

        assert_eq!(state.blink, BlinkPhase::Idle { countdown: 3.0 });
        assert_eq!(state.envelope, 0.0);
        assert_eq!(state.head_yaw, 0.0);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_advance() {
        let mut state = AnimationState::new(3.0);
        state.advance(0.016);
        state.advance(0.016);

        assert_eq!(state.frame, 2);
        assert!((state.elapsed - 0.032).abs() < 1e-6);
    }
}
