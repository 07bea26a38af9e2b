//! Breathing - slow pitch sway on the spine over its rest rotation

use std::f32::consts::TAU;

use mimic_core::RigTarget;
use mimic_rig::RigHandles;

use crate::AnimationState;

#[derive(Debug, Clone)]
pub struct BreathingConfig {
    /// Seconds per breath
    pub period: f32,
    /// Spine pitch amplitude, radians
    pub spine_amplitude: f32,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            period: 4.0,
            spine_amplitude: 0.015,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BreathingController {
    config: BreathingConfig,
}

impl BreathingController {
    pub fn new(config: BreathingConfig) -> Self {
        Self { config }
    }

    /// Advance the breathing phase and sway the spine, if resolved
    pub fn update<T: RigTarget + ?Sized>(
        &self,
        state: &mut AnimationState,
        rig: &RigHandles,
        dt: f32,
        target: &mut T,
    ) {
        let period = self.config.period.max(0.1);
        state.breathing_phase = (state.breathing_phase + dt * TAU / period) % TAU;

        if let Some(spine) = rig.spine {
            let mut rotation = spine.rest;
            rotation.x += self.config.spine_amplitude * state.breathing_phase.sin();
            target.set_bone_rotation(spine.id, rotation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{EulerRotation, Scene};
    use mimic_rig::RigResolver;

    #[test]
    fn test_spine_sways_around_rest() {
        let rest = EulerRotation::new(0.05, 0.0, 0.0);
        let mut scene = Scene::new().with_bone_at("Spine", rest);
        let rig = RigResolver::new().resolve(&scene);
        let spine = scene.bone_by_name("Spine").unwrap();
        let controller = BreathingController::default();
        let mut state = AnimationState::new(3.0);

        // A quarter breath: peak inhale
        controller.update(&mut state, &rig.handles, 1.0, &mut scene);
        let rotation = scene.bone_rotation(spine);
        assert!((rotation.x - (0.05 + 0.015)).abs() < 1e-4);
        assert_eq!(rotation.y, 0.0);

        // A full breath: back to rest
        for _ in 0..3 {
            controller.update(&mut state, &rig.handles, 1.0, &mut scene);
        }
        assert!((scene.bone_rotation(spine).x - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_phase_wraps() {
        let controller = BreathingController::default();
        let mut state = AnimationState::new(3.0);
        let mut scene = Scene::new();
        let rig = RigResolver::new().resolve(&scene);

        for _ in 0..1000 {
            controller.update(&mut state, &rig.handles, 0.1, &mut scene);
        }
        assert!(state.breathing_phase >= 0.0 && state.breathing_phase < TAU);
    }
}
