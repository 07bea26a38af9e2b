//! Head Tracking - head and neck rotation from face position or idle motion
//!
//! Per frame: pick a mode, compute a target, smooth a fixed fraction toward
//! it, clamp to the safety envelope, write with zero roll.

use std::f32::consts::PI;

use mimic_core::{approach, clamp_symmetric, EulerRotation, RigTarget};
use mimic_rig::RigHandles;
use mimic_tracking::TrackingState;

use crate::AnimationState;

/// Length of the idle glance cycle, seconds
pub const GLANCE_CYCLE: f32 = 12.0;

/// Default yaw safety limit, radians
pub const DEFAULT_MAX_YAW: f32 = 0.6;
/// Default pitch safety limit, radians
pub const DEFAULT_MAX_PITCH: f32 = 0.35;

/// Head tracking configuration
#[derive(Debug, Clone)]
pub struct HeadTrackingConfig {
    /// Yaw safety limit, radians
    pub max_yaw: f32,
    /// Pitch safety limit, radians
    pub max_pitch: f32,
    /// Fraction of the remaining distance covered per frame
    pub smoothing: f32,
    /// Neck smoothing, slower than the head
    pub neck_smoothing: f32,
    /// Fraction of head yaw the neck follows
    pub neck_yaw_follow: f32,
    /// Fraction of head pitch the neck follows
    pub neck_pitch_follow: f32,
    /// Yaw at the edge of the camera frame
    pub tracking_yaw_gain: f32,
    /// Pitch at the edge of the camera frame
    pub tracking_pitch_gain: f32,
    /// Amplitude of the liveliness jitter while tracking
    pub micro_amplitude: f32,
    /// Idle yaw sway amplitude
    pub idle_yaw_amplitude: f32,
    /// Idle pitch sway amplitude
    pub idle_pitch_amplitude: f32,
}

impl Default for HeadTrackingConfig {
    fn default() -> Self {
        Self {
            max_yaw: DEFAULT_MAX_YAW,
            max_pitch: DEFAULT_MAX_PITCH,
            smoothing: 0.1,
            neck_smoothing: 0.05,
            neck_yaw_follow: 0.35,
            neck_pitch_follow: 0.25,
            tracking_yaw_gain: 0.5,
            tracking_pitch_gain: 0.3,
            micro_amplitude: 0.012,
            idle_yaw_amplitude: 0.12,
            idle_pitch_amplitude: 0.05,
        }
    }
}

impl HeadTrackingConfig {
    /// Safety envelope. Non-finite limits fall back to the defaults.
    pub fn limits(&self) -> HeadLimits {
        HeadLimits {
            max_yaw: finite_limit(self.max_yaw, DEFAULT_MAX_YAW),
            max_pitch: finite_limit(self.max_pitch, DEFAULT_MAX_PITCH),
        }
    }
}

fn finite_limit(limit: f32, default: f32) -> f32 {
    if limit.is_finite() {
        limit.abs()
    } else {
        default
    }
}

/// Safety envelope for the head bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadLimits {
    pub max_yaw: f32,
    pub max_pitch: f32,
}

impl HeadLimits {
    pub fn clamp(&self, rotation: EulerRotation) -> EulerRotation {
        EulerRotation::from_pitch_yaw(
            clamp_symmetric(rotation.x, self.max_pitch),
            clamp_symmetric(rotation.y, self.max_yaw),
        )
    }

    pub fn contains(&self, rotation: EulerRotation) -> bool {
        rotation.x.abs() <= self.max_pitch && rotation.y.abs() <= self.max_yaw && rotation.z == 0.0
    }
}

/// Head behavior for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadMode {
    /// Follow the user's face at a normalized position
    Tracking { position: (f32, f32) },
    /// Idle sway with occasional glances
    Fallback,
}

impl HeadMode {
    /// Choose the mode from the latest tracking record
    pub fn select(tracking: &TrackingState) -> Self {
        if tracking.is_tracking() {
            HeadMode::Tracking {
                position: tracking.position,
            }
        } else {
            HeadMode::Fallback
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self, HeadMode::Tracking { .. })
    }

    /// Target rotation at time `t` (pitch in x, yaw in y)
    pub fn target(&self, t: f32, config: &HeadTrackingConfig) -> EulerRotation {
        match *self {
            HeadMode::Tracking { position } => tracking_target(position, t, config),
            HeadMode::Fallback => fallback_target(t, config),
        }
    }
}

/// Look toward the user. Image-space +x is the user's side the character
/// must turn away from, so yaw is inverted; +y (user higher) pitches up.
pub fn tracking_target(position: (f32, f32), t: f32, config: &HeadTrackingConfig) -> EulerRotation {
    let (x, y) = position;
    let micro = micro_movement(t, config.micro_amplitude);
    EulerRotation::from_pitch_yaw(
        -y * config.tracking_pitch_gain + micro.x,
        -x * config.tracking_yaw_gain + micro.y,
    )
}

/// Small multi-frequency jitter so a tracked head never looks frozen
pub fn micro_movement(t: f32, amplitude: f32) -> EulerRotation {
    EulerRotation::from_pitch_yaw(
        amplitude * (0.7 * (t * 1.3 + 1.0).sin() + 0.3 * (t * 2.9).sin()),
        amplitude * (0.65 * (t * 1.7).sin() + 0.35 * (t * 3.1 + 0.5).sin()),
    )
}

/// Idle motion: a slow primary sway, a faster secondary sway, and two glances
pub fn fallback_target(t: f32, config: &HeadTrackingConfig) -> EulerRotation {
    let yaw_a = config.idle_yaw_amplitude;
    let pitch_a = config.idle_pitch_amplitude;

    let primary = EulerRotation::from_pitch_yaw(
        pitch_a * (t * 0.23 + 0.6).sin(),
        yaw_a * (t * 0.31).sin(),
    );
    let secondary = EulerRotation::from_pitch_yaw(
        0.4 * pitch_a * (t * 0.71 + 2.3).sin(),
        0.35 * yaw_a * (t * 0.83 + 1.1).sin(),
    );

    primary + secondary + glance_offset(t)
}

/// One-shot glances at fixed points of the 12 s cycle: a look to one side at
/// 3 s, a shorter look to the other side at 8 s
pub fn glance_offset(t: f32) -> EulerRotation {
    let cycle = t.rem_euclid(GLANCE_CYCLE);
    let pulse = |start: f32, length: f32| -> f32 {
        if cycle >= start && cycle < start + length {
            (PI * (cycle - start) / length).sin()
        } else {
            0.0
        }
    };

    let first = pulse(3.0, 0.8);
    let second = pulse(8.0, 0.6);
    EulerRotation::from_pitch_yaw(
        -0.03 * first + 0.05 * second,
        0.22 * first - 0.16 * second,
    )
}

/// Head tracking controller
#[derive(Debug, Clone, Default)]
pub struct HeadTrackingController {
    config: HeadTrackingConfig,
}

impl HeadTrackingController {
    pub fn new(config: HeadTrackingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeadTrackingConfig {
        &self.config
    }

    pub fn limits(&self) -> HeadLimits {
        self.config.limits()
    }

    /// Update head and neck. No-op (returns the mode anyway) when the head
    /// bone is unresolved.
    pub fn update<T: RigTarget + ?Sized>(
        &self,
        state: &mut AnimationState,
        rig: &RigHandles,
        tracking: &TrackingState,
        tracking_enabled: bool,
        target: &mut T,
    ) -> HeadMode {
        let mode = if tracking_enabled {
            HeadMode::select(tracking)
        } else {
            HeadMode::Fallback
        };

        let Some(head) = rig.head else {
            return mode;
        };

        let cfg = &self.config;
        let limits = cfg.limits();
        let goal = mode.target(state.elapsed, cfg);

        state.head_pitch = clamp_symmetric(
            approach(state.head_pitch, goal.x, cfg.smoothing),
            limits.max_pitch,
        );
        state.head_yaw = clamp_symmetric(
            approach(state.head_yaw, goal.y, cfg.smoothing),
            limits.max_yaw,
        );
        target.set_bone_rotation(
            head.id,
            EulerRotation::from_pitch_yaw(state.head_pitch, state.head_yaw),
        );

        if let Some(neck) = rig.neck {
            if tracking_enabled {
                state.neck_pitch = approach(
                    state.neck_pitch,
                    state.head_pitch * cfg.neck_pitch_follow,
                    cfg.neck_smoothing,
                );
                state.neck_yaw = approach(
                    state.neck_yaw,
                    state.head_yaw * cfg.neck_yaw_follow,
                    cfg.neck_smoothing,
                );
            } else {
                state.neck_pitch = 0.0;
                state.neck_yaw = 0.0;
            }
            target.set_bone_rotation(
                neck.id,
                EulerRotation::from_pitch_yaw(state.neck_pitch, state.neck_yaw),
            );
        }

        mode
    }
}
