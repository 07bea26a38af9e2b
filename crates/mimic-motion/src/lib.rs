//! mimic Motion - Procedural controllers for a resolved rig
//!
//! Each controller is a small, non-blocking step over the rig:
//!
//! - [`PoseController`]: limbs back to a mirrored resting pose
//! - [`BreathingController`]: slow spine sway
//! - [`HeadTrackingController`]: follow the user's face, or idle motion
//! - [`BlinkController`]: periodic eyelid blend shapes
//! - [`LipSyncController`]: jaw and mouth shapes from an audio envelope
//!
//! Controllers hold configuration only. All per-frame accumulation lives in
//! [`AnimationState`], passed in explicitly and owned by the frame loop.

pub mod blink;
pub mod breathing;
pub mod head;
pub mod lipsync;
pub mod pose;
pub mod state;

pub use blink::*;
pub use breathing::*;
pub use head::*;
pub use lipsync::*;
pub use pose::*;
pub use state::*;
