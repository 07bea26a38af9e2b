//! Blend-shape concepts and the resolved index map

use mimic_core::{MeshId, MorphSurface, RigTarget};

/// Canonical blend-shape concepts mimic animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MorphConcept {
    /// Composite mouth opening
    MouthOpen,
    /// Open vowel "aa"
    VisemeA,
    /// Rounded vowel "oh"
    VisemeO,
    /// Spread vowel "ee"
    VisemeE,
    /// Bilabial closure "p", "b", "m"
    VisemeP,
    /// Labiodental "f", "v"
    VisemeF,
    /// Both eyelids
    Blink,
    BlinkLeft,
    BlinkRight,
}

impl MorphConcept {
    pub const ALL: [MorphConcept; 9] = [
        MorphConcept::MouthOpen,
        MorphConcept::VisemeA,
        MorphConcept::VisemeO,
        MorphConcept::VisemeE,
        MorphConcept::VisemeP,
        MorphConcept::VisemeF,
        MorphConcept::Blink,
        MorphConcept::BlinkLeft,
        MorphConcept::BlinkRight,
    ];

    pub const COUNT: usize = 9;

    /// Concepts driven (and silenced) by lip sync
    pub const LIP_SYNC: [MorphConcept; 6] = [
        MorphConcept::MouthOpen,
        MorphConcept::VisemeA,
        MorphConcept::VisemeO,
        MorphConcept::VisemeE,
        MorphConcept::VisemeP,
        MorphConcept::VisemeF,
    ];

    /// Eyelid concepts driven by blinking
    pub const EYELIDS: [MorphConcept; 3] = [
        MorphConcept::Blink,
        MorphConcept::BlinkLeft,
        MorphConcept::BlinkRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Accepted blend-shape names, lower-cased, in priority order
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            MorphConcept::MouthOpen => &["mouthopen", "mouth_open", "jawopen", "jaw_open"],
            MorphConcept::VisemeA => &["viseme_aa", "vrc.v_aa", "v_aa", "fcl_mth_a", "aa", "a"],
            MorphConcept::VisemeO => &[
                "viseme_o",
                "viseme_oh",
                "vrc.v_oh",
                "v_oh",
                "fcl_mth_o",
                "oh",
                "o",
            ],
            MorphConcept::VisemeE => &[
                "viseme_e",
                "viseme_ee",
                "vrc.v_e",
                "v_e",
                "fcl_mth_e",
                "ee",
                "e",
            ],
            MorphConcept::VisemeP => &["viseme_pp", "vrc.v_pp", "v_pp", "pp", "mouthclose"],
            MorphConcept::VisemeF => &["viseme_ff", "vrc.v_ff", "v_ff", "ff"],
            MorphConcept::Blink => &["blink", "eyesclosed", "eyes_closed", "eyeblink", "fcl_eye_close"],
            MorphConcept::BlinkLeft => &[
                "eyeblinkleft",
                "eyeblink_l",
                "blink_l",
                "blinkleft",
                "eye_blink_l",
                "fcl_eye_close_l",
            ],
            MorphConcept::BlinkRight => &[
                "eyeblinkright",
                "eyeblink_r",
                "blink_r",
                "blinkright",
                "eye_blink_r",
                "fcl_eye_close_r",
            ],
        }
    }

    /// First index in `targets` that names this concept, case-insensitively.
    /// Candidates are tried in priority order; duplicates resolve to the lowest index.
    pub fn find_in(self, targets: &[String]) -> Option<usize> {
        self.candidates().iter().find_map(|candidate| {
            targets
                .iter()
                .position(|name| name.eq_ignore_ascii_case(candidate))
        })
    }
}

/// One concrete blend shape: an index into a mesh surface's dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MorphTarget {
    pub mesh: MeshId,
    pub index: usize,
}

/// Concept -> concrete blend shapes, built once at load
///
/// A concept may map to several surfaces (e.g. face and teeth meshes); all of
/// them receive the same weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphIndexMap {
    targets: [Vec<MorphTarget>; MorphConcept::COUNT],
}

impl MorphIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from surfaces in traversal order
    pub fn from_surfaces(surfaces: &[MorphSurface]) -> Self {
        let mut map = Self::new();
        for surface in surfaces {
            for concept in MorphConcept::ALL {
                if let Some(index) = concept.find_in(&surface.targets) {
                    map.insert(
                        concept,
                        MorphTarget {
                            mesh: surface.id,
                            index,
                        },
                    );
                }
            }
        }
        map
    }

    fn insert(&mut self, concept: MorphConcept, target: MorphTarget) {
        let slot = &mut self.targets[concept.index()];
        if !slot.contains(&target) {
            slot.push(target);
        }
    }

    /// Concrete blend shapes for a concept (possibly empty)
    pub fn targets(&self, concept: MorphConcept) -> &[MorphTarget] {
        &self.targets[concept.index()]
    }

    pub fn is_resolved(&self, concept: MorphConcept) -> bool {
        !self.targets[concept.index()].is_empty()
    }

    /// Does any of `concepts` resolve to at least one blend shape?
    pub fn any_resolved(&self, concepts: &[MorphConcept]) -> bool {
        concepts.iter().any(|c| self.is_resolved(*c))
    }

    /// No concept resolved at all
    pub fn is_empty(&self) -> bool {
        self.targets.iter().all(Vec::is_empty)
    }

    /// Write `weight`, clamped to [0, 1], to every blend shape of `concept`.
    /// Unresolved concepts are a no-op.
    pub fn apply<T: RigTarget + ?Sized>(&self, target: &mut T, concept: MorphConcept, weight: f32) {
        let weight = if weight.is_finite() {
            weight.clamp(0.0, 1.0)
        } else {
            0.0
        };
        for t in self.targets(concept) {
            target.set_morph_weight(t.mesh, t.index, weight);
        }
    }

    /// Force every blend shape of every concept in `concepts` to zero
    pub fn clear<T: RigTarget + ?Sized>(&self, target: &mut T, concepts: &[MorphConcept]) {
        for concept in concepts {
            self.apply(target, *concept, 0.0);
        }
    }
}
