//! Rig Resolver - one-time discovery of bones and blend shapes
//!
//! Resolution is pure and deterministic: resolving the same asset twice gives
//! identical handles, maps and reports.

use mimic_core::{BoneId, BoneNode, EulerRotation, SceneGraph};

use crate::{matching_slots, BoneRule, BoneSlot, MorphConcept, MorphIndexMap, DEFAULT_BONE_RULES};

/// A resolved bone and the rotation it had at load time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneBinding {
    pub id: BoneId,
    pub rest: EulerRotation,
}

/// One optional binding per canonical slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RigHandles {
    pub head: Option<BoneBinding>,
    pub neck: Option<BoneBinding>,
    pub jaw: Option<BoneBinding>,
    pub spine: Option<BoneBinding>,
    pub left_upper_arm: Option<BoneBinding>,
    pub right_upper_arm: Option<BoneBinding>,
    pub left_forearm: Option<BoneBinding>,
    pub right_forearm: Option<BoneBinding>,
    pub left_hand: Option<BoneBinding>,
    pub right_hand: Option<BoneBinding>,
}

impl RigHandles {
    pub fn get(&self, slot: BoneSlot) -> Option<BoneBinding> {
        match slot {
            BoneSlot::Head => self.head,
            BoneSlot::Neck => self.neck,
            BoneSlot::Jaw => self.jaw,
            BoneSlot::Spine => self.spine,
            BoneSlot::LeftUpperArm => self.left_upper_arm,
            BoneSlot::RightUpperArm => self.right_upper_arm,
            BoneSlot::LeftForearm => self.left_forearm,
            BoneSlot::RightForearm => self.right_forearm,
            BoneSlot::LeftHand => self.left_hand,
            BoneSlot::RightHand => self.right_hand,
        }
    }

    fn slot_mut(&mut self, slot: BoneSlot) -> &mut Option<BoneBinding> {
        match slot {
            BoneSlot::Head => &mut self.head,
            BoneSlot::Neck => &mut self.neck,
            BoneSlot::Jaw => &mut self.jaw,
            BoneSlot::Spine => &mut self.spine,
            BoneSlot::LeftUpperArm => &mut self.left_upper_arm,
            BoneSlot::RightUpperArm => &mut self.right_upper_arm,
            BoneSlot::LeftForearm => &mut self.left_forearm,
            BoneSlot::RightForearm => &mut self.right_forearm,
            BoneSlot::LeftHand => &mut self.left_hand,
            BoneSlot::RightHand => &mut self.right_hand,
        }
    }

    pub fn is_bound(&self, slot: BoneSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Number of bound slots
    pub fn bound_count(&self) -> usize {
        BoneSlot::ALL.iter().filter(|s| self.is_bound(**s)).count()
    }
}

/// A bone whose name satisfied rules for more than one slot
#[derive(Debug, Clone, PartialEq)]
pub struct Ambiguity {
    pub bone: String,
    pub slots: Vec<BoneSlot>,
    /// The slot it was actually bound to, if any was still free
    pub bound_to: Option<BoneSlot>,
}

/// Diagnostics produced alongside the handles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    /// (slot, bone name) for every bound slot, in binding order
    pub bound: Vec<(BoneSlot, String)>,
    pub unresolved: Vec<BoneSlot>,
    /// Concepts with at least one blend shape, with their surface count
    pub concepts: Vec<(MorphConcept, usize)>,
    pub ambiguous: Vec<Ambiguity>,
}

impl ResolveReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Everything discovered about an asset. Read-only after load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRig {
    pub handles: RigHandles,
    pub morphs: MorphIndexMap,
    pub report: ResolveReport,
}

impl ResolvedRig {
    /// Are there any lip-sync blend shapes at all?
    pub fn has_mouth_morphs(&self) -> bool {
        self.morphs.any_resolved(&MorphConcept::LIP_SYNC)
    }
}

/// Rule-driven resolver
#[derive(Debug, Clone)]
pub struct RigResolver {
    rules: Vec<BoneRule>,
}

impl RigResolver {
    /// Resolver with the default rule table
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_BONE_RULES.to_vec())
    }

    /// Resolver with a custom rule table (priority = order)
    pub fn with_rules(rules: Vec<BoneRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[BoneRule] {
        &self.rules
    }

    /// Resolve bones and blend shapes. Never fails.
    pub fn resolve<G: SceneGraph + ?Sized>(&self, scene: &G) -> ResolvedRig {
        let mut report = ResolveReport::default();
        let handles = self.resolve_bones(&scene.bone_nodes(), &mut report);
        let morphs = MorphIndexMap::from_surfaces(&scene.morph_surfaces());

        report.unresolved = BoneSlot::ALL
            .iter()
            .copied()
            .filter(|s| !handles.is_bound(*s))
            .collect();
        report.concepts = MorphConcept::ALL
            .iter()
            .map(|c| (*c, morphs.targets(*c).len()))
            .filter(|(_, n)| *n > 0)
            .collect();

        tracing::debug!(
            bound = handles.bound_count(),
            unresolved = report.unresolved.len(),
            concepts = report.concepts.len(),
            "rig resolved"
        );

        ResolvedRig {
            handles,
            morphs,
            report,
        }
    }

    fn resolve_bones(&self, nodes: &[BoneNode], report: &mut ResolveReport) -> RigHandles {
        let mut handles = RigHandles::default();

        for node in nodes {
            let lower = node.name.to_lowercase();

            let mut bound_to = None;
            for rule in &self.rules {
                let slot = handles.slot_mut(rule.slot);
                if slot.is_none() && rule.matches(&lower) {
                    *slot = Some(BoneBinding {
                        id: node.id,
                        rest: node.rest,
                    });
                    report.bound.push((rule.slot, node.name.clone()));
                    bound_to = Some(rule.slot);
                    break;
                }
            }

            let slots = matching_slots(&self.rules, &lower);
            if slots.len() > 1 {
                tracing::warn!(
                    bone = %node.name,
                    slots = ?slots,
                    bound_to = ?bound_to,
                    "bone name matches several rig slots"
                );
                report.ambiguous.push(Ambiguity {
                    bone: node.name.clone(),
                    slots,
                    bound_to,
                });
            }
        }

        handles
    }
}

impl Default for RigResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchKind;
    use mimic_core::Scene;
    use proptest::prelude::*;

    fn mixamo_scene() -> Scene {
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
            .with_mesh("Wolf3D_Head", &["viseme_aa", "viseme_O", "eyeBlinkLeft", "eyeBlinkRight", "mouthOpen"])
            .with_mesh("Wolf3D_Teeth", &["viseme_aa", "mouthOpen"])
    }

    #[test]
    fn test_resolve_mixamo() {
        let scene = mixamo_scene();
        let rig = RigResolver::new().resolve(&scene);

        let id = |name: &str| scene.bone_by_name(name).unwrap();
        assert_eq!(rig.handles.head.map(|b| b.id), Some(id("mixamorig:Head")));
        assert_eq!(rig.handles.neck.map(|b| b.id), Some(id("mixamorig:Neck")));
        assert_eq!(rig.handles.spine.map(|b| b.id), Some(id("mixamorig:Spine")));
        assert_eq!(rig.handles.left_upper_arm.map(|b| b.id), Some(id("mixamorig:LeftArm")));
        assert_eq!(rig.handles.left_forearm.map(|b| b.id), Some(id("mixamorig:LeftForeArm")));
        assert_eq!(rig.handles.right_hand.map(|b| b.id), Some(id("mixamorig:RightHand")));
        assert!(rig.handles.jaw.is_none());

        assert_eq!(rig.report.unresolved, vec![BoneSlot::Jaw]);
        assert_eq!(rig.morphs.targets(MorphConcept::VisemeA).len(), 2);
        assert_eq!(rig.morphs.targets(MorphConcept::BlinkRight).len(), 1);
        assert!(rig.has_mouth_morphs());
    }

    #[test]
    fn test_first_match_wins() {
        let scene = Scene::new()
            .with_bone("Spine")
            .with_bone("Spine1")
            .with_bone("Head")
            .with_bone("Head2");
        let rig = RigResolver::new().resolve(&scene);

        assert_eq!(rig.handles.spine.map(|b| b.id), scene.bone_by_name("Spine"));
        assert_eq!(rig.handles.head.map(|b| b.id), scene.bone_by_name("Head"));
        assert_eq!(rig.report.bound.len(), 2);
    }

    #[test]
    fn test_rest_rotation_recorded() {
        let rest = EulerRotation::new(0.3, 0.0, 0.0);
        let scene = Scene::new().with_bone_at("Jaw", rest);
        let rig = RigResolver::new().resolve(&scene);

        assert_eq!(rig.handles.jaw.map(|b| b.rest), Some(rest));
    }

    #[test]
    fn test_empty_scene_degrades() {
        let rig = RigResolver::new().resolve(&Scene::new());

        assert_eq!(rig.handles.bound_count(), 0);
        assert_eq!(rig.report.unresolved.len(), BoneSlot::COUNT);
        assert!(rig.morphs.is_empty());
        assert!(!rig.has_mouth_morphs());
    }

    #[test]
    fn test_ambiguous_bone_flagged() {
        // "headneck" would satisfy the neck substring rule and a custom head rule
        let rules = vec![
            BoneRule::new(BoneSlot::Head, MatchKind::Substring, |n| n.contains("head")),
            BoneRule::new(BoneSlot::Neck, MatchKind::Substring, |n| n.contains("neck")),
        ];
        let scene = Scene::new().with_bone("HeadNeck").with_bone("Neck");
        let rig = RigResolver::with_rules(rules).resolve(&scene);

        assert_eq!(rig.report.ambiguous.len(), 1);
        assert_eq!(rig.report.ambiguous[0].bound_to, Some(BoneSlot::Head));
        assert_eq!(rig.handles.neck.map(|b| b.id), scene.bone_by_name("Neck"));
    }

    #[test]
    fn test_bone_falls_through_to_free_slot() {
        let rules = vec![
            BoneRule::new(BoneSlot::Head, MatchKind::Substring, |n| n.contains("head")),
            BoneRule::new(BoneSlot::Neck, MatchKind::Substring, |n| n.contains("neck")),
        ];
        let scene = Scene::new().with_bone("Head").with_bone("HeadNeck");
        let rig = RigResolver::with_rules(rules).resolve(&scene);

        assert_eq!(rig.handles.neck.map(|b| b.id), scene.bone_by_name("HeadNeck"));
    }

    proptest! {
        #[test]
        fn resolution_is_idempotent(names in prop::collection::vec("[A-Za-z:_.]{1,16}", 0..24)) {
            let mut scene = Scene::new();
            for name in &names {
                scene.add_bone(name, EulerRotation::ZERO);
            }
            let targets: Vec<&str> = names.iter().map(String::as_str).collect();
            scene.add_mesh("Face", &targets);

            let resolver = RigResolver::new();
            let first = resolver.resolve(&scene);
            let second = resolver.resolve(&scene);
            prop_assert_eq!(first, second);
        }
    }
}
