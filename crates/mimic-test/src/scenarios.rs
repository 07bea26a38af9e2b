//! Asset presets and end-to-end avatar scenarios

use mimic_core::Scene;

/// Head, neck, jaw and two Mixamo upper arms; no blend shapes
pub fn minimal_rig() -> Scene {
    Scene::new()
        .with_bone("Head")
        .with_bone("Neck")
        .with_bone("Jaw")
        .with_bone("mixamorig:LeftArm")
        .with_bone("mixamorig:RightArm")
}

/// A head and nothing else
pub fn bare_head() -> Scene {
    Scene::new().with_bone("Head").with_bone("Neck")
}

/// Full Mixamo skeleton with a viseme face and a teeth mesh
pub fn mixamo_rig() -> Scene {
    Scene::new()
        .with_bone("mixamorig:Hips")
        .with_bone("mixamorig:Spine")
        .with_bone("mixamorig:Spine1")
        .with_bone("mixamorig:Neck")
        .with_bone("mixamorig:Head")
        .with_bone("mixamorig:HeadTop_End")
        .with_bone("mixamorig:LeftShoulder")
        .with_bone("mixamorig:LeftArm")
        .with_bone("mixamorig:LeftForeArm")
        .with_bone("mixamorig:LeftHand")
        .with_bone("mixamorig:LeftHandIndex1")
        .with_bone("mixamorig:RightShoulder")
        .with_bone("mixamorig:RightArm")
        .with_bone("mixamorig:RightForeArm")
        .with_bone("mixamorig:RightHand")
        .with_mesh(
            "Wolf3D_Head",
            &[
                "viseme_sil",
                "viseme_PP",
                "viseme_FF",
                "viseme_aa",
                "viseme_E",
                "viseme_O",
                "mouthOpen",
                "eyeBlinkLeft",
                "eyeBlinkRight",
            ],
        )
        .with_mesh("Wolf3D_Teeth", &["viseme_aa", "mouthOpen"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mimic_core::{EulerRotation, MimicError, RigTarget};
    use mimic_motion::{BlinkPhase, HeadMode, RestPose};
    use mimic_rig::{BoneSlot, MorphConcept, RigResolver};
    use mimic_runtime::{Avatar, AvatarConfig};
    use mimic_tracking::{CaptureConfig, TrackingStatus};

    use crate::{AvatarSimulator, FaceStep, ScriptedCamera, ScriptedDetector, SimulationResult};

    const FRAME: Duration = Duration::from_millis(16);

    fn untracked() -> AvatarConfig {
        AvatarConfig {
            enable_tracking: false,
            seed: Some(11),
            ..AvatarConfig::default()
        }
    }

    fn fast_capture() -> AvatarConfig {
        AvatarConfig {
            capture: CaptureConfig {
                frame_interval: Duration::from_millis(5),
                ..CaptureConfig::default()
            },
            seed: Some(5),
            ..AvatarConfig::default()
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let scene = mixamo_rig();
        let resolver = RigResolver::new();

        let first = resolver.resolve(&scene);
        let second = resolver.resolve(&scene);
        assert_eq!(first, second);

        // Mixamo skeletons ship without a jaw
        assert_eq!(first.report.unresolved, vec![BoneSlot::Jaw]);
        assert!(first.report.ambiguous.is_empty());
        assert_eq!(first.morphs.targets(MorphConcept::VisemeA).len(), 2);
        assert_eq!(first.morphs.targets(MorphConcept::BlinkLeft).len(), 1);
    }

    #[test]
    fn test_minimal_rig_idles_at_rest() {
        let mut sim = AvatarSimulator::new(minimal_rig(), untracked());
        let handles = sim.scheduler().rig().handles;
        for slot in [
            BoneSlot::Head,
            BoneSlot::Neck,
            BoneSlot::Jaw,
            BoneSlot::LeftUpperArm,
            BoneSlot::RightUpperArm,
        ] {
            assert!(handles.is_bound(slot), "{slot:?} unbound");
        }

        let (Some(left), Some(right)) = (handles.left_upper_arm, handles.right_upper_arm) else {
            panic!("arms unbound");
        };
        let pose = RestPose::default();
        let limits = AvatarConfig::default().head.limits();
        let mut result = SimulationResult::new();

        // Feeding detections changes nothing while tracking is disabled
        sim.set_source_active(true);
        for i in 0..(60 * 20) {
            sim.detect(0.9, 0.9);
            // Something else pokes the arms between frames
            sim.scene.set_bone_rotation(left.id, EulerRotation::new(1.0, 1.0, 1.0));
            if i % 7 == 0 {
                sim.scene.set_bone_rotation(right.id, EulerRotation::ZERO);
            }

            let report = sim.step(&mut result);
            assert_eq!(report.head_mode, HeadMode::Fallback);
            assert_eq!(sim.scene.bone_rotation(left.id), pose.upper_arm);
            assert_eq!(sim.scene.bone_rotation(right.id), pose.upper_arm.mirrored());
        }

        assert_eq!(result.tracking_frames, 0);
        assert!(result.max_head_yaw > 0.0);
        assert!(result.max_head_yaw <= limits.max_yaw);
        assert!(result.max_head_pitch <= limits.max_pitch);
        assert_eq!(result.max_head_roll, 0.0);
        assert_eq!(result.max_jaw_deviation, 0.0);
        assert_eq!(result.articulating_frames, 0);
    }

    #[test]
    fn test_minimal_rig_speaks_with_jaw() {
        let config = untracked();
        let jaw_open_max = config.lip_sync.jaw_open_max;
        let mut sim = AvatarSimulator::new(minimal_rig(), config);
        let jaw = sim.scheduler().rig().handles.jaw.unwrap();
        let mut result = SimulationResult::new();

        sim.speak(0.3);
        for _ in 0..120 {
            let report = sim.step_with(FRAME, &mut result);
            assert!(report.articulating);
            assert!(!report.fallback_nod);

            let rotation = sim.scene.bone_rotation(jaw.id);
            let expected = jaw.rest.x + report.envelope * jaw_open_max;
            assert!((rotation.x - expected).abs() < 1e-6);
            assert_eq!(rotation.y, jaw.rest.y);
            assert_eq!(rotation.z, jaw.rest.z);
        }
        assert_eq!(result.nod_frames, 0);
        assert!(result.max_envelope > 0.7);

        // Silence: jaw at rest at once, envelope gone within a bounded time
        sim.silence();
        for _ in 0..40 {
            sim.step_with(FRAME, &mut result);
            assert_eq!(sim.scene.bone_rotation(jaw.id), jaw.rest);
        }
        assert_eq!(sim.scheduler().state().envelope, 0.0);
        assert_eq!(result.max_silent_jaw_deviation, 0.0);
    }

    #[test]
    fn test_bare_head_nods_instead() {
        let mut sim = AvatarSimulator::new(bare_head(), untracked());
        let mut result = SimulationResult::new();

        sim.speak(0.5);
        for _ in 0..120 {
            sim.step_with(FRAME, &mut result);
        }
        assert!(result.nod_frames > 0);
        assert!(result.max_head_pitch <= AvatarConfig::default().head.max_pitch);
    }

    #[test]
    fn test_brief_loss_does_not_flip_mode() {
        let mut sim = AvatarSimulator::new(minimal_rig(), AvatarConfig::default());
        let mut result = SimulationResult::new();

        sim.set_source_active(true);
        sim.detect(0.3, 0.1);
        // 400 ms of misses, then the face is back
        for _ in 0..25 {
            sim.miss();
            sim.step_with(FRAME, &mut result);
        }
        sim.detect(0.3, 0.1);
        sim.step_with(FRAME, &mut result);

        assert_eq!(result.fallback_frames, 0);
        assert_eq!(result.mode_switches, 0);

        // Sustained loss flips once the grace period has passed
        let lost_at = sim.now();
        let mut flipped_after = None;
        for _ in 0..45 {
            sim.miss();
            let report = sim.step_with(FRAME, &mut result);
            if report.head_mode == HeadMode::Fallback && flipped_after.is_none() {
                flipped_after = Some(sim.now().since(lost_at));
            }
        }
        let flipped_after = flipped_after.unwrap();
        assert!(flipped_after >= Duration::from_millis(500));
        assert!(flipped_after <= Duration::from_millis(500) + 2 * FRAME);
        assert_eq!(result.mode_switches, 1);
    }

    #[test]
    fn test_reset_carries_nothing_over() {
        let mut sim = AvatarSimulator::new(mixamo_rig(), AvatarConfig::default());
        let mut result = SimulationResult::new();

        sim.set_source_active(true);
        sim.detect(-0.8, 0.5);
        sim.speak(0.6);
        for _ in 0..200 {
            sim.step_with(FRAME, &mut result);
        }
        assert!(sim.scheduler().state().head_yaw.abs() > 0.1);

        sim.reset();
        let state = sim.scheduler().state();
        assert_eq!(state.frame, 0);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.head_yaw, 0.0);
        assert_eq!(state.neck_yaw, 0.0);
        assert_eq!(state.envelope, 0.0);
        assert_eq!(state.viseme_phase, 0.0);
        assert!(matches!(state.blink, BlinkPhase::Idle { countdown } if countdown >= 2.5));
        assert_eq!(sim.next_mode(), HeadMode::Fallback);
    }

    #[tokio::test]
    async fn test_camera_session_end_to_end() {
        let camera = ScriptedCamera::new();
        let stats = camera.stats();
        let detector = ScriptedDetector::fixed(0.5, 0.0);
        let mut avatar = Avatar::mount(mixamo_rig(), fast_capture());
        let mut status = avatar.subscribe_status();

        avatar.start_tracking(Box::new(camera), Box::new(detector));
        status
            .wait_for(|s| *s == TrackingStatus::Active)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let report = avatar.frame(1.0 / 60.0);
        assert_eq!(report.head_mode, HeadMode::Tracking { position: (0.5, 0.0) });
        for _ in 0..120 {
            avatar.frame(1.0 / 60.0);
        }
        // Face to the right of frame: character turns the other way
        assert!(avatar.scheduler().state().head_yaw < 0.0);

        avatar.stop_tracking();
        assert_eq!(stats.released(), 1);
        let grabbed = stats.grabbed();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(stats.grabbed(), grabbed);

        let report = avatar.frame(1.0 / 60.0);
        assert_eq!(report.head_mode, HeadMode::Fallback);
    }

    #[tokio::test]
    async fn test_face_leaving_frame_falls_back() {
        let detector = ScriptedDetector::new([FaceStep::Face(0.0, 0.0), FaceStep::Glitch]);
        let mut avatar = Avatar::mount(minimal_rig(), fast_capture());
        let mut status = avatar.subscribe_status();

        avatar.start_tracking(Box::new(ScriptedCamera::new()), Box::new(detector.clone()));
        status
            .wait_for(|s| *s == TrackingStatus::Active)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Glitches are misses, not failures: still active, still in grace
        assert_eq!(avatar.status(), TrackingStatus::Active);
        assert!(avatar.frame(1.0 / 60.0).head_mode.is_tracking());

        detector.push(FaceStep::Absent);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(avatar.frame(1.0 / 60.0).head_mode, HeadMode::Fallback);
        assert_eq!(avatar.status(), TrackingStatus::Active);
    }

    #[tokio::test]
    async fn test_acquisition_failures_degrade() {
        // (camera, detector, releases expected)
        let failures: [(ScriptedCamera, ScriptedDetector, u64); 3] = [
            (ScriptedCamera::failing(MimicError::PermissionDenied), ScriptedDetector::empty(), 0),
            (
                ScriptedCamera::failing(MimicError::CameraUnavailable("no device".into())),
                ScriptedDetector::empty(),
                0,
            ),
            (ScriptedCamera::new(), ScriptedDetector::unloadable("model missing"), 1),
        ];

        for (camera, detector, releases) in failures {
            let stats = camera.stats();
            let mut avatar = Avatar::mount(minimal_rig(), fast_capture());
            let mut status = avatar.subscribe_status();

            avatar.start_tracking(Box::new(camera), Box::new(detector));
            status
                .wait_for(|s| *s == TrackingStatus::Fallback)
                .await
                .unwrap();

            let report = avatar.frame(1.0 / 60.0);
            assert_eq!(report.head_mode, HeadMode::Fallback);
            assert_eq!(stats.opened(), 1);
            assert_eq!(stats.grabbed(), 0);
            // A device that did open is released on failure
            assert_eq!(stats.released(), releases);
        }
    }

    #[tokio::test]
    async fn test_unmount_releases_camera() {
        let camera = ScriptedCamera::new();
        let stats = camera.stats();
        let mut avatar = Avatar::mount(minimal_rig(), fast_capture());
        let mut status = avatar.subscribe_status();

        avatar.start_tracking(Box::new(camera), Box::new(ScriptedDetector::empty()));
        status
            .wait_for(|s| *s == TrackingStatus::Active)
            .await
            .unwrap();

        let scene = avatar.unmount();
        assert_eq!(stats.released(), 1);
        assert_eq!(scene.bone_count(), 5);
    }
}
