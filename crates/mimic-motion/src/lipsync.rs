//! Lip Sync - jaw and mouth shapes from an audio amplitude envelope
//!
//! There is no phoneme alignment. Five phase-shifted sines stand in for
//! visemes, scaled by a smoothed amplitude envelope. Rigs with neither mouth
//! blend shapes nor a jaw get a small head nod instead.

use mimic_core::{approach, clamp_symmetric, positive_sine, sanitize, EulerRotation, RigTarget};
use mimic_rig::{MorphConcept, ResolvedRig, RigHandles};

use crate::{AnimationState, HeadLimits};

/// Lip sync configuration
#[derive(Debug, Clone)]
pub struct LipSyncConfig {
    /// Envelope target is `min(level * sensitivity, 1)`
    pub sensitivity: f32,
    /// Attack smoothing factor per frame
    pub attack: f32,
    /// Geometric decay per frame in silence
    pub decay: f32,
    /// Audio level (and envelope) below this counts as silence
    pub noise_threshold: f32,
    /// Envelope snaps to zero below this
    pub silence_floor: f32,
    /// Jaw opening at full envelope, radians
    pub jaw_open_max: f32,
    /// Viseme oscillator rate, radians per second
    pub viseme_rate: f32,
    /// Head nod at full envelope on rigs without mouth shapes or jaw
    pub nod_amplitude: f32,
    /// Neck emphasis at full envelope on the same rigs
    pub neck_emphasis: f32,
}

impl Default for LipSyncConfig {
    fn default() -> Self {
        Self {
            sensitivity: 2.5,
            attack: 0.35,
            decay: 0.85,
            noise_threshold: 0.02,
            silence_floor: 0.01,
            jaw_open_max: 0.35,
            viseme_rate: 14.0,
            nod_amplitude: 0.05,
            neck_emphasis: 0.025,
        }
    }
}

/// What lip sync did this frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LipSyncFrame {
    pub envelope: f32,
    /// Jaw and mouth shapes were driven
    pub articulating: bool,
    /// The head-nod substitute was used
    pub fallback_nod: bool,
}

/// Per-viseme weights before envelope scaling, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisemeWeights {
    pub a: f32,
    pub o: f32,
    pub e: f32,
    pub p: f32,
    pub f: f32,
}

impl VisemeWeights {
    /// Pseudo-phonemes at a given oscillator phase
    pub fn at(phase: f32) -> Self {
        Self {
            a: 0.5 + 0.5 * phase.sin(),
            o: 0.5 + 0.5 * (phase * 0.7 + 1.3).sin(),
            e: 0.5 + 0.5 * (phase * 1.3 + 2.1).sin(),
            p: positive_sine(phase * 2.3 + 0.5),
            f: positive_sine(phase * 1.9 + 4.0),
        }
    }

    fn pairs(&self) -> [(MorphConcept, f32); 5] {
        [
            (MorphConcept::VisemeA, self.a),
            (MorphConcept::VisemeO, self.o * 0.8),
            (MorphConcept::VisemeE, self.e * 0.6),
            (MorphConcept::VisemeP, self.p * 0.5),
            (MorphConcept::VisemeF, self.f * 0.4),
        ]
    }

    /// Composite opening: open vowels widen, closures narrow
    pub fn mouth_open(&self) -> f32 {
        (0.6 + 0.3 * self.a + 0.2 * self.o - 0.3 * self.p).clamp(0.0, 1.0)
    }
}

/// Lip sync controller
#[derive(Debug, Clone)]
pub struct LipSyncController {
    config: LipSyncConfig,
    head_limits: HeadLimits,
}

impl LipSyncController {
    /// `head_limits` bound the fallback nod so it never leaves the head envelope
    pub fn new(config: LipSyncConfig, head_limits: HeadLimits) -> Self {
        Self {
            config,
            head_limits,
        }
    }

    pub fn config(&self) -> &LipSyncConfig {
        &self.config
    }

    /// Put the jaw back at its rest rotation, if resolved
    pub fn reset_jaw<T: RigTarget + ?Sized>(&self, rig: &RigHandles, target: &mut T) {
        if let Some(jaw) = rig.jaw {
            target.set_bone_rotation(jaw.id, jaw.rest);
        }
    }

    /// Advance the envelope one frame. Returns whether the input counts as speech.
    pub fn update_envelope(&self, state: &mut AnimationState, speaking: bool, level: f32) -> bool {
        let cfg = &self.config;
        let level = sanitize(level, 0.0, 1.0);
        let voiced = speaking && level > cfg.noise_threshold;

        if voiced {
            let goal = (level * cfg.sensitivity).min(1.0);
            state.envelope = approach(state.envelope, goal, cfg.attack);
        } else {
            state.envelope *= cfg.decay.clamp(0.0, 0.99);
            if state.envelope < cfg.silence_floor {
                state.envelope = 0.0;
            }
        }
        voiced
    }

    /// Run after the jaw has been reset. Never leaves the jaw off rest unless
    /// speech is voiced this frame.
    pub fn update<T: RigTarget + ?Sized>(
        &self,
        state: &mut AnimationState,
        rig: &ResolvedRig,
        speaking: bool,
        level: f32,
        dt: f32,
        target: &mut T,
    ) -> LipSyncFrame {
        let cfg = &self.config;
        let voiced = self.update_envelope(state, speaking, level);
        if voiced {
            state.viseme_phase += dt * cfg.viseme_rate;
        }

        let envelope = state.envelope;
        let articulating = voiced && envelope > cfg.noise_threshold;
        if !articulating {
            rig.morphs.clear(target, &MorphConcept::LIP_SYNC);
            return LipSyncFrame {
                envelope,
                articulating: false,
                fallback_nod: false,
            };
        }

        if let Some(jaw) = rig.handles.jaw {
            let mut rotation = jaw.rest;
            rotation.x += envelope * cfg.jaw_open_max;
            target.set_bone_rotation(jaw.id, rotation);
        }

        let visemes = VisemeWeights::at(state.viseme_phase);
        for (concept, weight) in visemes.pairs() {
            rig.morphs.apply(target, concept, weight * envelope);
        }
        rig.morphs
            .apply(target, MorphConcept::MouthOpen, visemes.mouth_open() * envelope);

        // Only a rig with no blend shapes of any kind and no jaw nods
        let fallback_nod = rig.morphs.is_empty() && rig.handles.jaw.is_none();
        if fallback_nod {
            self.nod(state, &rig.handles, envelope, target);
        }

        LipSyncFrame {
            envelope,
            articulating,
            fallback_nod,
        }
    }

    /// Layer a small speech nod over this frame's head and neck rotation
    fn nod<T: RigTarget + ?Sized>(
        &self,
        state: &AnimationState,
        rig: &RigHandles,
        envelope: f32,
        target: &mut T,
    ) {
        let beat = positive_sine(state.viseme_phase * 0.5);

        if let Some(head) = rig.head {
            let pitch = clamp_symmetric(
                state.head_pitch + self.config.nod_amplitude * envelope * beat,
                self.head_limits.max_pitch,
            );
            target.set_bone_rotation(head.id, EulerRotation::from_pitch_yaw(pitch, state.head_yaw));
        }
        if let Some(neck) = rig.neck {
            let pitch = state.neck_pitch + self.config.neck_emphasis * envelope * beat;
            target.set_bone_rotation(neck.id, EulerRotation::from_pitch_yaw(pitch, state.neck_yaw));
        }
    }
}
