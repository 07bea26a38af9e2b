//! Bone naming rules
//!
//! An ordered table of `(slot, predicate)` pairs over lower-cased bone names.
//! Order is significant: for each bone, the first rule whose predicate holds
//! and whose slot is still free wins.

/// Canonical bone slots mimic animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoneSlot {
    Head,
    Neck,
    Jaw,
    Spine,
    LeftUpperArm,
    RightUpperArm,
    LeftForearm,
    RightForearm,
    LeftHand,
    RightHand,
}

impl BoneSlot {
    /// All slots in order
    pub const ALL: [BoneSlot; 10] = [
        BoneSlot::Head,
        BoneSlot::Neck,
        BoneSlot::Jaw,
        BoneSlot::Spine,
        BoneSlot::LeftUpperArm,
        BoneSlot::RightUpperArm,
        BoneSlot::LeftForearm,
        BoneSlot::RightForearm,
        BoneSlot::LeftHand,
        BoneSlot::RightHand,
    ];

    /// Number of slots
    pub const COUNT: usize = 10;

    pub fn name(self) -> &'static str {
        match self {
            BoneSlot::Head => "head",
            BoneSlot::Neck => "neck",
            BoneSlot::Jaw => "jaw",
            BoneSlot::Spine => "spine",
            BoneSlot::LeftUpperArm => "left upper arm",
            BoneSlot::RightUpperArm => "right upper arm",
            BoneSlot::LeftForearm => "left forearm",
            BoneSlot::RightForearm => "right forearm",
            BoneSlot::LeftHand => "left hand",
            BoneSlot::RightHand => "right hand",
        }
    }

    /// Is this one of the limb slots held by the rest pose?
    pub fn is_limb(self) -> bool {
        !matches!(
            self,
            BoneSlot::Head | BoneSlot::Neck | BoneSlot::Jaw | BoneSlot::Spine
        )
    }
}

/// How a rule matches, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Suffix,
    Substring,
}

/// One entry of the rule table
#[derive(Clone, Copy)]
pub struct BoneRule {
    pub slot: BoneSlot,
    pub kind: MatchKind,
    /// Predicate over the lower-cased bone name
    pub predicate: fn(&str) -> bool,
}

impl BoneRule {
    pub const fn new(slot: BoneSlot, kind: MatchKind, predicate: fn(&str) -> bool) -> Self {
        Self {
            slot,
            kind,
            predicate,
        }
    }

    #[inline]
    pub fn matches(&self, lower_name: &str) -> bool {
        (self.predicate)(lower_name)
    }
}

impl std::fmt::Debug for BoneRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoneRule")
            .field("slot", &self.slot)
            .field("kind", &self.kind)
            .finish()
    }
}

const FINGER_TERMS: [&str; 6] = ["thumb", "index", "middle", "ring", "pinky", "finger"];
const LEAF_TERMS: [&str; 2] = ["end", "nub"];

fn contains_any(name: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| name.contains(t))
}

/// `:x`, `_x` or `.x` at the end of the name (namespaced exact match)
fn ends_with_part(name: &str, part: &str) -> bool {
    name.strip_suffix(part)
        .map(|head| head.ends_with(|c: char| matches!(c, ':' | '_' | '.' | ' ')))
        .unwrap_or(false)
}

pub fn is_left(name: &str) -> bool {
    name.contains("left")
        || name.contains("_l_")
        || name.ends_with("_l")
        || name.ends_with(".l")
        || name.starts_with("l_")
}

pub fn is_right(name: &str) -> bool {
    name.contains("right")
        || name.contains("_r_")
        || name.ends_with("_r")
        || name.ends_with(".r")
        || name.starts_with("r_")
}

fn head_exact(n: &str) -> bool {
    n == "head"
}

fn head_suffix(n: &str) -> bool {
    ends_with_part(n, "head")
}

fn head_substring(n: &str) -> bool {
    n.contains("head") && !n.contains("top") && !n.contains("neck") && !contains_any(n, &LEAF_TERMS)
}

fn neck_exact(n: &str) -> bool {
    n == "neck"
}

fn neck_substring(n: &str) -> bool {
    n.contains("neck") && !contains_any(n, &LEAF_TERMS)
}

fn jaw_exact(n: &str) -> bool {
    n == "jaw"
}

fn jaw_substring(n: &str) -> bool {
    n.contains("jaw") && !contains_any(n, &LEAF_TERMS)
}

fn spine_exact(n: &str) -> bool {
    n == "spine"
}

fn spine_substring(n: &str) -> bool {
    n.contains("spine") && !contains_any(n, &LEAF_TERMS)
}

fn is_forearm(n: &str) -> bool {
    (n.contains("fore") || n.contains("lower")) && n.contains("arm")
}

fn is_upper_arm(n: &str) -> bool {
    n.contains("arm")
        && !n.contains("fore")
        && !n.contains("lower")
        && !n.contains("shoulder")
        && !n.contains("hand")
        && !n.contains("twist")
}

fn is_hand(n: &str) -> bool {
    n.contains("hand") && !contains_any(n, &FINGER_TERMS) && !contains_any(n, &LEAF_TERMS)
}

fn left_forearm_suffix(n: &str) -> bool {
    n.ends_with("leftforearm")
}

fn left_forearm_substring(n: &str) -> bool {
    is_left(n) && is_forearm(n)
}

fn right_forearm_suffix(n: &str) -> bool {
    n.ends_with("rightforearm")
}

fn right_forearm_substring(n: &str) -> bool {
    is_right(n) && is_forearm(n)
}

fn left_upper_arm_suffix(n: &str) -> bool {
    n.ends_with("leftarm") || n.ends_with("leftupperarm")
}

fn left_upper_arm_substring(n: &str) -> bool {
    is_left(n) && is_upper_arm(n)
}

fn right_upper_arm_suffix(n: &str) -> bool {
    n.ends_with("rightarm") || n.ends_with("rightupperarm")
}

fn right_upper_arm_substring(n: &str) -> bool {
    is_right(n) && is_upper_arm(n)
}

fn left_hand_suffix(n: &str) -> bool {
    n.ends_with("lefthand")
}

fn left_hand_substring(n: &str) -> bool {
    is_left(n) && is_hand(n)
}

fn right_hand_suffix(n: &str) -> bool {
    n.ends_with("righthand")
}

fn right_hand_substring(n: &str) -> bool {
    is_right(n) && is_hand(n)
}

/// The default rule table, in priority order
pub const DEFAULT_BONE_RULES: &[BoneRule] = &[
    BoneRule::new(BoneSlot::Head, MatchKind::Exact, head_exact),
    BoneRule::new(BoneSlot::Head, MatchKind::Suffix, head_suffix),
    BoneRule::new(BoneSlot::Head, MatchKind::Substring, head_substring),
    BoneRule::new(BoneSlot::Neck, MatchKind::Exact, neck_exact),
    BoneRule::new(BoneSlot::Neck, MatchKind::Substring, neck_substring),
    BoneRule::new(BoneSlot::Jaw, MatchKind::Exact, jaw_exact),
    BoneRule::new(BoneSlot::Jaw, MatchKind::Substring, jaw_substring),
    BoneRule::new(BoneSlot::Spine, MatchKind::Exact, spine_exact),
    BoneRule::new(BoneSlot::Spine, MatchKind::Substring, spine_substring),
    BoneRule::new(BoneSlot::LeftForearm, MatchKind::Suffix, left_forearm_suffix),
    BoneRule::new(BoneSlot::LeftForearm, MatchKind::Substring, left_forearm_substring),
    BoneRule::new(BoneSlot::RightForearm, MatchKind::Suffix, right_forearm_suffix),
    BoneRule::new(BoneSlot::RightForearm, MatchKind::Substring, right_forearm_substring),
    BoneRule::new(BoneSlot::LeftUpperArm, MatchKind::Suffix, left_upper_arm_suffix),
    BoneRule::new(BoneSlot::LeftUpperArm, MatchKind::Substring, left_upper_arm_substring),
    BoneRule::new(BoneSlot::RightUpperArm, MatchKind::Suffix, right_upper_arm_suffix),
    BoneRule::new(BoneSlot::RightUpperArm, MatchKind::Substring, right_upper_arm_substring),
    BoneRule::new(BoneSlot::LeftHand, MatchKind::Suffix, left_hand_suffix),
    BoneRule::new(BoneSlot::LeftHand, MatchKind::Substring, left_hand_substring),
    BoneRule::new(BoneSlot::RightHand, MatchKind::Suffix, right_hand_suffix),
    BoneRule::new(BoneSlot::RightHand, MatchKind::Substring, right_hand_substring),
];

/// Distinct slots any rule in `rules` accepts for `lower_name`, in rule order
pub fn matching_slots(rules: &[BoneRule], lower_name: &str) -> Vec<BoneSlot> {
    let mut slots = Vec::new();
    for rule in rules {
        if rule.matches(lower_name) && !slots.contains(&rule.slot) {
            slots.push(rule.slot);
        }
    }
    slots
}
