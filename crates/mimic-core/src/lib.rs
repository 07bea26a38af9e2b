//! mimic Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every mimic crate:
//! - Rotations and smoothing helpers (EulerRotation, approach)
//! - Time primitives (PerceptualTime)
//! - Scene seams (SceneGraph for discovery, RigTarget for per-frame writes)
//! - Presentation theme
//! - Error taxonomy

pub mod error;
pub mod math;
pub mod scene;
pub mod theme;
pub mod time;

pub use error::*;
pub use math::*;
pub use scene::*;
pub use theme::*;
pub use time::*;
