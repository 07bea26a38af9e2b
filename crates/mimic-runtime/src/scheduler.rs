//! Frame Scheduler - one animation frame, in a fixed stage order
//!
//! 1. Pose: limbs to rest, breathing on the spine
//! 2. Tracking snapshot (passed in by the caller)
//! 3. Head and neck
//! 4. Blink
//! 5. Jaw back to rest
//! 6. Lip sync
//!
//! No stage sees another stage's output from this frame except through the
//! rig, and every stage runs every frame whatever the others resolved.

use tracing::trace;

use mimic_core::{sanitize, RigTarget};
use mimic_motion::{
    AnimationState, BlinkController, BreathingController, HeadMode, HeadTrackingController,
    LipSyncController, PoseController,
};
use mimic_rig::ResolvedRig;
use mimic_tracking::TrackingState;

use crate::AvatarConfig;

/// Host-supplied inputs, latest value wins
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostInputs {
    pub speaking: bool,
    /// Audio meter level in [0, 1]
    pub audio_level: f32,
}

/// What happened in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Delta actually used, after clamping
    pub dt: f32,
    pub head_mode: HeadMode,
    pub envelope: f32,
    pub articulating: bool,
    pub fallback_nod: bool,
    pub blink_weight: f32,
}

/// Owns the controllers and the per-avatar animation state
#[derive(Debug)]
pub struct FrameScheduler {
    rig: ResolvedRig,
    state: AnimationState,
    pose: PoseController,
    breathing: BreathingController,
    head: HeadTrackingController,
    blink: BlinkController,
    lip_sync: LipSyncController,
    tracking_enabled: bool,
    max_frame_delta: f32,
}

impl FrameScheduler {
    pub fn new(rig: ResolvedRig, config: &AvatarConfig) -> Self {
        let head = HeadTrackingController::new(config.head.clone());
        let lip_sync = LipSyncController::new(config.lip_sync.clone(), head.limits());
        let mut blink = BlinkController::new(config.blink.clone(), config.seed);
        let state = AnimationState::new(blink.next_interval());

        Self {
            rig,
            state,
            pose: PoseController::new(config.pose),
            breathing: BreathingController::new(config.breathing.clone()),
            head,
            blink,
            lip_sync,
            tracking_enabled: config.enable_tracking,
            max_frame_delta: config.frame_delta_limit(),
        }
    }

    pub fn rig(&self) -> &ResolvedRig {
        &self.rig
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    pub fn set_tracking_enabled(&mut self, enabled: bool) {
        self.tracking_enabled = enabled;
    }

    /// Discard all accumulated animation state
    pub fn reset(&mut self) {
        self.state = AnimationState::new(self.blink.next_interval());
    }

    /// Clamp a host delta to `[0, max_frame_delta]`; non-finite becomes 0
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        sanitize(dt, 0.0, self.max_frame_delta)
    }

    /// Run one frame against `target`
    pub fn tick<T: RigTarget + ?Sized>(
        &mut self,
        dt: f32,
        inputs: &HostInputs,
        tracking: &TrackingState,
        target: &mut T,
    ) -> FrameReport {
        let dt = self.clamp_delta(dt);
        let audio_level = sanitize(inputs.audio_level, 0.0, 1.0);
        self.state.advance(dt);

        // Stage 1: Pose - NEVER SKIP
        self.pose.apply(&self.rig.handles, target);
        self.breathing
            .update(&mut self.state, &self.rig.handles, dt, target);

        // Stage 2-3: Head from this frame's tracking snapshot
        let head_mode = self.head.update(
            &mut self.state,
            &self.rig.handles,
            tracking,
            self.tracking_enabled,
            target,
        );

        // Stage 4: Blink - NEVER SKIP
        let blink_weight = self.blink.update(&mut self.state, &self.rig.morphs, dt, target);

        // Stage 5: Jaw to rest
        self.lip_sync.reset_jaw(&self.rig.handles, target);

        // Stage 6: Lip sync
        let lip = self.lip_sync.update(
            &mut self.state,
            &self.rig,
            inputs.speaking,
            audio_level,
            dt,
            target,
        );

        trace!(
            frame = self.state.frame,
            dt,
            tracking = head_mode.is_tracking(),
            envelope = lip.envelope,
            blink = blink_weight,
            "frame"
        );

        FrameReport {
            frame: self.state.frame,
            dt,
            head_mode,
            envelope: lip.envelope,
            articulating: lip.articulating,
            fallback_nod: lip.fallback_nod,
            blink_weight,
        }
    }
}
