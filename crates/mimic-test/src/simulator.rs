//! Avatar Simulator - frame-level harness for controller testing
//!
//! Simulates:
//! - A display loop with jittered frame deltas and occasional stalls
//! - A hand-fed tracking record (detections and misses at chosen times)
//! - Host speech inputs
//!
//! and records what the rig looked like after every frame.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mimic_core::{EulerRotation, PerceptualTime, RigTarget, Scene};
use mimic_motion::HeadMode;
use mimic_rig::RigResolver;
use mimic_runtime::{AvatarConfig, FrameReport, FrameScheduler, HostInputs};
use mimic_tracking::TrackingCell;

/// Display refresh model
#[derive(Clone, Debug)]
pub struct FrameTiming {
    /// Nominal frame interval
    pub interval: Duration,
    /// Random jitter per frame (microseconds)
    pub jitter_us: u32,
    /// Probability of a long stall on any frame
    pub stall_probability: f64,
    /// Length of a stall
    pub stall: Duration,
}

impl FrameTiming {
    /// Perfect 60 Hz
    pub fn steady() -> Self {
        Self {
            interval: Duration::from_micros(16_667),
            jitter_us: 0,
            stall_probability: 0.0,
            stall: Duration::ZERO,
        }
    }

    /// 60 Hz with jitter and occasional half-second stalls
    pub fn unstable() -> Self {
        Self {
            interval: Duration::from_micros(16_667),
            jitter_us: 4_000,
            stall_probability: 0.01,
            stall: Duration::from_millis(500),
        }
    }

    /// Next raw frame delta
    pub fn sample(&self, rng: &mut StdRng) -> Duration {
        if self.stall_probability > 0.0 && rng.gen_bool(self.stall_probability.min(1.0)) {
            return self.stall;
        }
        let base = self.interval.as_micros() as i64;
        let jitter = if self.jitter_us > 0 {
            rng.gen_range(-(self.jitter_us as i64)..=self.jitter_us as i64)
        } else {
            0
        };
        Duration::from_micros((base + jitter).max(0) as u64)
    }
}

/// Per-run observations
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    pub frames: u64,
    pub tracking_frames: u64,
    pub fallback_frames: u64,
    /// Tracking <-> fallback transitions
    pub mode_switches: u64,
    pub articulating_frames: u64,
    pub nod_frames: u64,
    pub max_head_yaw: f32,
    pub max_head_pitch: f32,
    pub max_head_roll: f32,
    /// Largest jaw distance from rest on any frame
    pub max_jaw_deviation: f32,
    /// Largest jaw distance from rest on frames without voiced speech
    pub max_silent_jaw_deviation: f32,
    pub max_envelope: f32,
    pub max_blink_weight: f32,
    /// Largest clamped delta used
    pub max_dt: f32,
    last_tracking: Option<bool>,
}

impl SimulationResult {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, report: &FrameReport, head: EulerRotation, jaw_deviation: f32, silent: bool) {
        self.frames += 1;
        let tracking = report.head_mode.is_tracking();
        if tracking {
            self.tracking_frames += 1;
        } else {
            self.fallback_frames += 1;
        }
        if self.last_tracking.is_some_and(|last| last != tracking) {
            self.mode_switches += 1;
        }
        self.last_tracking = Some(tracking);

        if report.articulating {
            self.articulating_frames += 1;
        }
        if report.fallback_nod {
            self.nod_frames += 1;
        }

        self.max_head_yaw = self.max_head_yaw.max(head.y.abs());
        self.max_head_pitch = self.max_head_pitch.max(head.x.abs());
        self.max_head_roll = self.max_head_roll.max(head.z.abs());
        self.max_jaw_deviation = self.max_jaw_deviation.max(jaw_deviation);
        if silent {
            self.max_silent_jaw_deviation = self.max_silent_jaw_deviation.max(jaw_deviation);
        }
        self.max_envelope = self.max_envelope.max(report.envelope);
        self.max_blink_weight = self.max_blink_weight.max(report.blink_weight);
        self.max_dt = self.max_dt.max(report.dt);
    }
}

/// Frame loop over an in-memory scene
pub struct AvatarSimulator {
    pub scene: Scene,
    scheduler: FrameScheduler,
    cell: TrackingCell,
    inputs: HostInputs,
    timing: FrameTiming,
    rng: StdRng,
    time: PerceptualTime,
    noise_threshold: f32,
}

impl AvatarSimulator {
    pub fn new(scene: Scene, config: AvatarConfig) -> Self {
        Self::with_timing(scene, config, FrameTiming::steady(), 0)
    }

    pub fn with_timing(scene: Scene, config: AvatarConfig, timing: FrameTiming, seed: u64) -> Self {
        let rig = RigResolver::new().resolve(&scene);
        let noise_threshold = config.lip_sync.noise_threshold;
        Self {
            cell: TrackingCell::new(config.capture.grace_period),
            scheduler: FrameScheduler::new(rig, &config),
            scene,
            inputs: HostInputs::default(),
            timing,
            rng: StdRng::seed_from_u64(seed),
            time: PerceptualTime::ZERO,
            noise_threshold,
        }
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Simulated time (sum of raw frame deltas)
    pub fn now(&self) -> PerceptualTime {
        self.time
    }

    pub fn speak(&mut self, level: f32) {
        self.inputs = HostInputs {
            speaking: true,
            audio_level: level,
        };
    }

    pub fn silence(&mut self) {
        self.inputs = HostInputs::default();
    }

    pub fn set_inputs(&mut self, inputs: HostInputs) {
        self.inputs = inputs;
    }

    /// Camera session up or down
    pub fn set_source_active(&mut self, active: bool) {
        self.cell.set_source_active(active);
    }

    /// The camera saw a face now
    pub fn detect(&mut self, x: f32, y: f32) {
        self.cell.record_detection((x, y), self.time);
    }

    /// The camera saw no face now
    pub fn miss(&mut self) {
        self.cell.record_miss(self.time);
    }

    /// One display frame
    pub fn step(&mut self, result: &mut SimulationResult) -> FrameReport {
        let raw = self.timing.sample(&mut self.rng);
        self.step_with(raw, result)
    }

    /// One display frame with a chosen raw delta
    pub fn step_with(&mut self, raw: Duration, result: &mut SimulationResult) -> FrameReport {
        self.time = self.time.saturating_add(raw);
        let tracking = self.cell.snapshot();
        let report = self
            .scheduler
            .tick(raw.as_secs_f32(), &self.inputs, &tracking, &mut self.scene);

        let rig = &self.scheduler.rig().handles;
        let head = rig
            .head
            .map(|h| self.scene.bone_rotation(h.id))
            .unwrap_or_default();
        let jaw_deviation = rig
            .jaw
            .map(|j| self.scene.bone_rotation(j.id).max_abs_diff(&j.rest))
            .unwrap_or(0.0);
        let silent = !self.inputs.speaking || self.inputs.audio_level <= self.noise_threshold;

        result.record(&report, head, jaw_deviation, silent);
        report
    }

    /// Run for a simulated duration
    pub fn run(&mut self, duration: Duration) -> SimulationResult {
        let mut result = SimulationResult::new();
        let end = self.time.saturating_add(duration);
        while self.time < end {
            self.step(&mut result);
        }
        result
    }

    /// Head mode the next frame would pick
    pub fn next_mode(&self) -> HeadMode {
        if self.scheduler.tracking_enabled() {
            HeadMode::select(&self.cell.snapshot())
        } else {
            HeadMode::Fallback
        }
    }

    /// Fresh session: tracking cleared, animation state discarded
    pub fn reset(&mut self) {
        self.cell.clear();
        self.scheduler.reset();
        self.inputs = HostInputs::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios;
    use proptest::prelude::*;

    #[test]
    fn test_steady_timing() {
        let mut rng = StdRng::seed_from_u64(1);
        let timing = FrameTiming::steady();
        for _ in 0..10 {
            assert_eq!(timing.sample(&mut rng), Duration::from_micros(16_667));
        }
    }

    #[test]
    fn test_unstable_timing_is_clamped() {
        let mut sim = AvatarSimulator::with_timing(
            scenarios::minimal_rig(),
            AvatarConfig::default(),
            FrameTiming::unstable(),
            42,
        );
        let result = sim.run(Duration::from_secs(30));

        assert!(result.frames > 100);
        assert!(result.max_dt <= 0.1);
        assert_eq!(result.max_head_roll, 0.0);
    }

    #[test]
    fn test_mode_switch_counting() {
        let mut sim = AvatarSimulator::new(scenarios::minimal_rig(), AvatarConfig::default());
        let mut result = SimulationResult::new();

        sim.set_source_active(true);
        sim.detect(0.0, 0.0);
        sim.step(&mut result);
        sim.set_source_active(false);
        sim.step(&mut result);

        assert_eq!(result.tracking_frames, 1);
        assert_eq!(result.fallback_frames, 1);
        assert_eq!(result.mode_switches, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn invariants_hold_under_jitter(
            seed in any::<u64>(),
            talk in prop::collection::vec((any::<bool>(), 0.0f32..1.0, any::<bool>()), 1..60),
        ) {
            let config = AvatarConfig { seed: Some(seed), ..AvatarConfig::default() };
            let limits = config.head.limits();
            let mut sim = AvatarSimulator::with_timing(
                scenarios::minimal_rig(),
                config,
                FrameTiming::unstable(),
                seed,
            );
            let mut result = SimulationResult::new();
            sim.set_source_active(true);

            for (speaking, level, seen) in talk {
                sim.set_inputs(HostInputs { speaking, audio_level: level });
                if seen {
                    sim.detect(level * 2.0 - 1.0, 0.5 - level);
                } else {
                    sim.miss();
                }
                for _ in 0..5 {
                    sim.step(&mut result);
                }
            }

            prop_assert!(result.max_head_yaw <= limits.max_yaw);
            prop_assert!(result.max_head_pitch <= limits.max_pitch);
            prop_assert_eq!(result.max_head_roll, 0.0);
            prop_assert_eq!(result.max_silent_jaw_deviation, 0.0);
            prop_assert!(result.max_dt <= 0.1);
        }
    }
}
