//! Avatar - the host-facing handle
//!
//! Mount resolves the rig once and builds the frame loop. Nothing here
//! returns an error: acquisition failures degrade to idle motion and show up
//! only on the status signal.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use mimic_core::{RigTarget, SceneGraph, Theme, ThemePalette};
use mimic_rig::{ResolvedRig, RigResolver};
use mimic_tracking::{CaptureDevice, LandmarkDetector, TrackingSource, TrackingStatus};

use crate::{AvatarConfig, FrameClock, FrameReport, FrameScheduler, HostInputs, MAX_FRAME_DELTA};

/// A mounted avatar driving a scene
pub struct Avatar<S> {
    // Declared first: dropped (capture stopped, device released) before
    // anything else on teardown
    tracking: TrackingSource,
    scheduler: FrameScheduler,
    inputs: HostInputs,
    theme: Theme,
    clock: FrameClock,
    scene: S,
}

impl<S: SceneGraph + RigTarget> Avatar<S> {
    /// Resolve the rig and prepare the frame loop
    pub fn mount(scene: S, config: AvatarConfig) -> Self {
        Self::mount_with(scene, config, &RigResolver::new())
    }

    /// Mount with a custom resolver
    pub fn mount_with(scene: S, config: AvatarConfig, resolver: &RigResolver) -> Self {
        let rig = resolver.resolve(&scene);
        info!(
            bound = rig.handles.bound_count(),
            mouth_shapes = rig.has_mouth_morphs(),
            ambiguous = rig.report.ambiguous.len(),
            "avatar mounted"
        );

        let max_delta =
            Duration::try_from_secs_f32(config.frame_delta_limit()).unwrap_or(MAX_FRAME_DELTA);
        let clock = FrameClock::with_max_delta(max_delta);
        Self {
            tracking: TrackingSource::new(config.capture.clone()),
            scheduler: FrameScheduler::new(rig, &config),
            inputs: HostInputs::default(),
            theme: config.theme,
            clock,
            scene,
        }
    }

    pub fn rig(&self) -> &ResolvedRig {
        self.scheduler.rig()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn set_speaking(&mut self, speaking: bool) {
        self.inputs.speaking = speaking;
    }

    /// Latest audio meter level; clamped to [0, 1] when used
    pub fn set_audio_level(&mut self, level: f32) {
        self.inputs.audio_level = level;
    }

    pub fn inputs(&self) -> HostInputs {
        self.inputs
    }

    /// Switching tracking off also stops any running capture session
    pub fn set_enable_tracking(&mut self, enabled: bool) {
        if !enabled {
            self.tracking.stop();
        }
        self.scheduler.set_tracking_enabled(enabled);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> ThemePalette {
        self.theme.palette()
    }

    /// Start camera tracking. Idempotent; ignored while tracking is disabled.
    pub fn start_tracking(&mut self, device: Box<dyn CaptureDevice>, detector: Box<dyn LandmarkDetector>) {
        if !self.scheduler.tracking_enabled() {
            debug!("tracking disabled, not starting capture");
            return;
        }
        self.tracking.start(device, detector);
    }

    /// Stop camera tracking. Always safe; the device is released on return.
    pub fn stop_tracking(&mut self) {
        self.tracking.stop();
    }

    pub fn status(&self) -> TrackingStatus {
        self.tracking.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TrackingStatus> {
        self.tracking.subscribe()
    }

    /// Run one frame with a host-supplied delta in seconds
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let tracking = self.tracking.snapshot();
        self.scheduler
            .tick(dt, &self.inputs, &tracking, &mut self.scene)
    }

    /// Run one frame timed by the internal clock
    pub fn frame_now(&mut self) -> FrameReport {
        let dt = self.clock.tick().as_secs_f32();
        self.frame(dt)
    }

    /// Stop tracking and start over with fresh animation state
    pub fn reset(&mut self) {
        self.tracking.stop();
        self.scheduler.reset();
        self.inputs = HostInputs::default();
        self.clock.reset();
        debug!("avatar reset");
    }

    /// Stop tracking, then hand the scene back
    pub fn unmount(mut self) -> S {
        self.tracking.stop();
        debug!("avatar unmounted");
        self.scene
    }
}

impl<S> std::fmt::Debug for Avatar<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Avatar")
            .field("tracking", &self.tracking)
            .field("inputs", &self.inputs)
            .field("theme", &self.theme)
            .field("frame", &self.scheduler.state().frame)
            .finish()
    }
}
