//! Avatar configuration

use mimic_core::Theme;
use mimic_motion::{BlinkConfig, BreathingConfig, HeadTrackingConfig, LipSyncConfig, RestPose};
use mimic_tracking::CaptureConfig;

/// Largest frame delta bound accepted from configuration, seconds
pub const MAX_FRAME_DELTA_LIMIT: f32 = 1.0;

/// Everything an avatar reads at mount
#[derive(Debug, Clone)]
pub struct AvatarConfig {
    pub head: HeadTrackingConfig,
    pub lip_sync: LipSyncConfig,
    pub blink: BlinkConfig,
    pub breathing: BreathingConfig,
    pub pose: RestPose,
    pub capture: CaptureConfig,
    /// Follow the user's face when a camera session is running
    pub enable_tracking: bool,
    pub theme: Theme,
    /// Upper bound on a single frame delta, seconds
    pub max_frame_delta: f32,
    /// Fixed RNG seed for reproducible blink timing
    pub seed: Option<u64>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        AvatarConfig {
            head: HeadTrackingConfig::default(),
            lip_sync: LipSyncConfig::default(),
            blink: BlinkConfig::default(),
            breathing: BreathingConfig::default(),
            pose: RestPose::default(),
            capture: CaptureConfig::default(),
            enable_tracking: true,
            theme: Theme::default(),
            max_frame_delta: 0.1,
            seed: None,
        }
    }
}

impl AvatarConfig {
    /// Subdued motion: narrower head range, slower blinks, gentle mouth
    pub fn calm() -> Self {
        AvatarConfig {
            head: HeadTrackingConfig {
                max_yaw: 0.4,
                max_pitch: 0.25,
                smoothing: 0.06,
                idle_yaw_amplitude: 0.08,
                idle_pitch_amplitude: 0.03,
                ..HeadTrackingConfig::default()
            },
            lip_sync: LipSyncConfig {
                sensitivity: 1.8,
                jaw_open_max: 0.25,
                ..LipSyncConfig::default()
            },
            blink: BlinkConfig {
                min_interval: 3.5,
                max_interval: 6.5,
                duration: 0.18,
            },
            breathing: BreathingConfig {
                period: 5.0,
                spine_amplitude: 0.01,
            },
            pose: RestPose::relaxed(),
            ..AvatarConfig::default()
        }
    }

    /// Livelier motion for presenters: wider range, snappier response
    pub fn expressive() -> Self {
        AvatarConfig {
            head: HeadTrackingConfig {
                max_yaw: 0.75,
                max_pitch: 0.45,
                smoothing: 0.18,
                micro_amplitude: 0.02,
                idle_yaw_amplitude: 0.16,
                idle_pitch_amplitude: 0.07,
                ..HeadTrackingConfig::default()
            },
            lip_sync: LipSyncConfig {
                sensitivity: 3.2,
                attack: 0.5,
                jaw_open_max: 0.42,
                ..LipSyncConfig::default()
            },
            blink: BlinkConfig {
                min_interval: 2.0,
                max_interval: 4.0,
                duration: 0.12,
            },
            ..AvatarConfig::default()
        }
    }

    /// Clamp the frame delta bound to something usable
    pub fn frame_delta_limit(&self) -> f32 {
        if self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0 {
            self.max_frame_delta.min(MAX_FRAME_DELTA_LIMIT)
        } else {
            0.1
        }
    }
}
