//! Rotation math and per-frame smoothing helpers
//!
//! Rotations are Euler angles in radians applied in XYZ order:
//! `x` is pitch (nod), `y` is yaw (turn), `z` is roll (tilt).

use std::ops::{Add, Neg};

/// Euler rotation in radians (XYZ order)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerRotation {
    /// Pitch - positive looks down
    pub x: f32,
    /// Yaw - positive turns to the character's left
    pub y: f32,
    /// Roll
    pub z: f32,
}

impl EulerRotation {
    pub const ZERO: EulerRotation = EulerRotation {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Pitch/yaw rotation with zero roll
    #[inline]
    pub const fn from_pitch_yaw(pitch: f32, yaw: f32) -> Self {
        Self {
            x: pitch,
            y: yaw,
            z: 0.0,
        }
    }

    /// Mirror across the character's sagittal plane (left <-> right)
    #[inline]
    pub fn mirrored(self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Linear interpolation
    pub fn lerp(&self, other: &EulerRotation, t: f32) -> EulerRotation {
        let t = t.clamp(0.0, 1.0);
        EulerRotation {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Largest absolute difference on any axis
    pub fn max_abs_diff(&self, other: &EulerRotation) -> f32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

impl Add for EulerRotation {
    type Output = EulerRotation;

    #[inline]
    fn add(self, rhs: EulerRotation) -> Self::Output {
        EulerRotation {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Neg for EulerRotation {
    type Output = EulerRotation;

    #[inline]
    fn neg(self) -> Self::Output {
        EulerRotation {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Move `current` a fixed fraction of the remaining distance toward `target`.
///
/// Not time-normalized: the same factor per frame, whatever the frame rate.
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * sanitize(factor, 0.0, 1.0)
}

/// Clamp to `[-limit, limit]`. A NaN limit or value collapses to zero.
#[inline]
pub fn clamp_symmetric(value: f32, limit: f32) -> f32 {
    if value.is_nan() || limit.is_nan() {
        return 0.0;
    }
    let limit = limit.abs();
    value.clamp(-limit, limit)
}

/// Replace non-finite input with zero and clamp to `[min, max]`
#[inline]
pub fn sanitize(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        0.0_f32.clamp(min, max)
    }
}

/// Half-wave rectified sine: `max(sin(phase), 0)`
#[inline]
pub fn positive_sine(phase: f32) -> f32 {
    phase.sin().max(0.0)
}
