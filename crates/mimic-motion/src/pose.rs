//! Rest pose - holds the arms in a relaxed, elbows-bent pose every frame

use mimic_core::{EulerRotation, RigTarget};
use mimic_rig::RigHandles;

/// Left-side limb rotations; the right side is the mirror image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestPose {
    pub upper_arm: EulerRotation,
    pub forearm: EulerRotation,
    pub hand: EulerRotation,
}

impl Default for RestPose {
    fn default() -> Self {
        Self {
            // Arms down from the bind T-pose, slightly forward
            upper_arm: EulerRotation::new(0.1, 0.05, 1.2),
            // Elbows bent
            forearm: EulerRotation::new(0.35, 0.55, 0.0),
            hand: EulerRotation::new(0.0, 0.1, 0.15),
        }
    }
}

impl RestPose {
    /// Arms hanging straight, no elbow bend
    pub fn relaxed() -> Self {
        Self {
            upper_arm: EulerRotation::new(0.0, 0.0, 1.35),
            forearm: EulerRotation::new(0.1, 0.15, 0.0),
            hand: EulerRotation::ZERO,
        }
    }
}

/// Pose controller
#[derive(Debug, Clone, Default)]
pub struct PoseController {
    pose: RestPose,
}

impl PoseController {
    pub fn new(pose: RestPose) -> Self {
        Self { pose }
    }

    pub fn pose(&self) -> &RestPose {
        &self.pose
    }

    /// Overwrite every resolved limb bone with the rest pose
    pub fn apply<T: RigTarget + ?Sized>(&self, rig: &RigHandles, target: &mut T) {
        let pose = &self.pose;
        let limbs = [
            (rig.left_upper_arm, pose.upper_arm),
            (rig.right_upper_arm, pose.upper_arm.mirrored()),
            (rig.left_forearm, pose.forearm),
            (rig.right_forearm, pose.forearm.mirrored()),
            (rig.left_hand, pose.hand),
            (rig.right_hand, pose.hand.mirrored()),
        ];
        for (binding, rotation) in limbs {
            if let Some(bone) = binding {
                target.set_bone_rotation(bone.id, rotation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::Scene;
    use mimic_rig::RigResolver;

    #[test]
    fn test_pose_is_mirrored() {
        let mut scene = Scene::new()
            .with_bone("LeftArm")
            .with_bone("RightArm")
            .with_bone("LeftForeArm")
            .with_bone("RightForeArm");
        let rig = RigResolver::new().resolve(&scene);
        let controller = PoseController::default();

        controller.apply(&rig.handles, &mut scene);

        let left = scene.bone_rotation(scene.bone_by_name("LeftArm").unwrap());
        let right = scene.bone_rotation(scene.bone_by_name("RightArm").unwrap());
        assert_eq!(left, controller.pose().upper_arm);
        assert_eq!(right, left.mirrored());

        let left = scene.bone_rotation(scene.bone_by_name("LeftForeArm").unwrap());
        let right = scene.bone_rotation(scene.bone_by_name("RightForeArm").unwrap());
        assert_eq!(right, left.mirrored());
    }

    #[test]
    fn test_pose_overrides_perturbation() {
        let mut scene = Scene::new().with_bone("LeftArm");
        let rig = RigResolver::new().resolve(&scene);
        let arm = scene.bone_by_name("LeftArm").unwrap();
        let controller = PoseController::default();

        scene.set_bone_rotation(arm, EulerRotation::new(2.0, 2.0, 2.0));
        controller.apply(&rig.handles, &mut scene);

        assert_eq!(scene.bone_rotation(arm), controller.pose().upper_arm);
    }

    #[test]
    fn test_missing_limbs_skipped() {
        let mut scene = Scene::new().with_bone("Head");
        let rig = RigResolver::new().resolve(&scene);
        let head = scene.bone_by_name("Head").unwrap();

        PoseController::new(RestPose::relaxed()).apply(&rig.handles, &mut scene);

        assert_eq!(scene.bone_rotation(head), EulerRotation::ZERO);
    }
}
