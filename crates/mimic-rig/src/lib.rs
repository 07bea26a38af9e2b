//! mimic Rig - One-time discovery of an unknown character rig
//!
//! Character assets arrive with arbitrary naming conventions (Mixamo, VRM,
//! Blender `.L/.R`, ARKit blend shapes, Oculus visemes). This crate walks the
//! asset once at load and turns names into typed handles:
//! - [`RigHandles`]: one optional bone per canonical slot
//! - [`MorphIndexMap`]: blend-shape indices per canonical concept
//!
//! Nothing here runs per frame and nothing here fails. Unresolved slots and
//! concepts are a permanent, valid state for the asset.

pub mod morph;
pub mod resolver;
pub mod rules;

pub use morph::*;
pub use resolver::*;
pub use rules::*;
