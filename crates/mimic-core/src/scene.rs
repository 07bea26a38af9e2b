//! Scene seams between mimic and the host's 3-D asset
//!
//! The asset schema is unknown. mimic only needs two things from it:
//! - [`SceneGraph`]: enumerate named bones and blend-shape dictionaries once at load
//! - [`RigTarget`]: read and write bone rotations and blend-shape weights every frame
//!
//! [`Scene`] is a plain in-memory implementation of both, used by hosts that
//! mirror their engine's scene into mimic and by the test harness.

use std::fmt;

use crate::EulerRotation;

/// Bone handle, opaque to mimic (host-defined index)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BoneId(pub u32);

impl fmt::Debug for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bone({})", self.0)
    }
}

/// Mesh surface handle, opaque to mimic (host-defined index)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct MeshId(pub u32);

impl fmt::Debug for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mesh({})", self.0)
    }
}

/// A named bone as seen during discovery
#[derive(Debug, Clone, PartialEq)]
pub struct BoneNode {
    pub id: BoneId,
    pub name: String,
    /// Rotation at load time, recorded as the bone's rest rotation
    pub rest: EulerRotation,
}

/// A mesh surface and its blend-shape dictionary (index = position in `targets`)
#[derive(Debug, Clone, PartialEq)]
pub struct MorphSurface {
    pub id: MeshId,
    pub name: String,
    pub targets: Vec<String>,
}

/// Discovery view of an asset, walked once at load time
pub trait SceneGraph {
    /// Bones in traversal order
    fn bone_nodes(&self) -> Vec<BoneNode>;

    /// Mesh surfaces exposing blend shapes, in traversal order
    fn morph_surfaces(&self) -> Vec<MorphSurface>;
}

/// Per-frame write target. Unknown handles must be ignored, never panic.
pub trait RigTarget {
    fn bone_rotation(&self, bone: BoneId) -> EulerRotation;

    fn set_bone_rotation(&mut self, bone: BoneId, rotation: EulerRotation);

    fn morph_weight(&self, mesh: MeshId, index: usize) -> f32;

    fn set_morph_weight(&mut self, mesh: MeshId, index: usize, weight: f32);
}

#[derive(Debug, Clone)]
struct SceneBone {
    name: String,
    rest: EulerRotation,
    rotation: EulerRotation,
}

#[derive(Debug, Clone)]
struct SceneMesh {
    name: String,
    targets: Vec<String>,
    weights: Vec<f32>,
}

/// In-memory scene: bones and mesh surfaces in insertion order
#[derive(Debug, Clone, Default)]
pub struct Scene {
    bones: Vec<SceneBone>,
    meshes: Vec<SceneMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone at identity rest rotation
    pub fn with_bone(self, name: &str) -> Self {
        self.with_bone_at(name, EulerRotation::ZERO)
    }

    /// Add a bone with an explicit rest rotation
    pub fn with_bone_at(mut self, name: &str, rest: EulerRotation) -> Self {
        self.add_bone(name, rest);
        self
    }

    /// Add a mesh surface with a blend-shape dictionary
    pub fn with_mesh(mut self, name: &str, targets: &[&str]) -> Self {
        self.add_mesh(name, targets);
        self
    }

    pub fn add_bone(&mut self, name: &str, rest: EulerRotation) -> BoneId {
        let id = BoneId(self.bones.len() as u32);
        self.bones.push(SceneBone {
            name: name.to_string(),
            rest,
            rotation: rest,
        });
        id
    }

    pub fn add_mesh(&mut self, name: &str, targets: &[&str]) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(SceneMesh {
            name: name.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            weights: vec![0.0; targets.len()],
        });
        id
    }

    /// Look up a bone by exact name
    pub fn bone_by_name(&self, name: &str) -> Option<BoneId> {
        self.bones
            .iter()
            .position(|b| b.name == name)
            .map(|i| BoneId(i as u32))
    }

    /// Look up a mesh by exact name
    pub fn mesh_by_name(&self, name: &str) -> Option<MeshId> {
        self.meshes
            .iter()
            .position(|m| m.name == name)
            .map(|i| MeshId(i as u32))
    }

    /// Weight of a blend shape by exact name on a mesh
    pub fn morph_weight_by_name(&self, mesh: MeshId, target: &str) -> Option<f32> {
        let mesh = self.meshes.get(mesh.0 as usize)?;
        let index = mesh.targets.iter().position(|t| t == target)?;
        mesh.weights.get(index).copied()
    }

    /// Rest rotation recorded when the bone was added
    pub fn rest_rotation(&self, bone: BoneId) -> Option<EulerRotation> {
        self.bones.get(bone.0 as usize).map(|b| b.rest)
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

impl SceneGraph for Scene {
    fn bone_nodes(&self) -> Vec<BoneNode> {
        self.bones
            .iter()
            .enumerate()
            .map(|(i, b)| BoneNode {
                id: BoneId(i as u32),
                name: b.name.clone(),
                rest: b.rest,
            })
            .collect()
    }

    fn morph_surfaces(&self) -> Vec<MorphSurface> {
        self.meshes
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.targets.is_empty())
            .map(|(i, m)| MorphSurface {
                id: MeshId(i as u32),
                name: m.name.clone(),
                targets: m.targets.clone(),
            })
            .collect()
    }
}

impl RigTarget for Scene {
    fn bone_rotation(&self, bone: BoneId) -> EulerRotation {
        self.bones
            .get(bone.0 as usize)
            .map(|b| b.rotation)
            .unwrap_or_default()
    }

    fn set_bone_rotation(&mut self, bone: BoneId, rotation: EulerRotation) {
        if let Some(b) = self.bones.get_mut(bone.0 as usize) {
            b.rotation = rotation;
        }
    }

    fn morph_weight(&self, mesh: MeshId, index: usize) -> f32 {
        self.meshes
            .get(mesh.0 as usize)
            .and_then(|m| m.weights.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    fn set_morph_weight(&mut self, mesh: MeshId, index: usize, weight: f32) {
        if let Some(w) = self
            .meshes
            .get_mut(mesh.0 as usize)
            .and_then(|m| m.weights.get_mut(index))
        {
            *w = weight;
        }
    }
}
