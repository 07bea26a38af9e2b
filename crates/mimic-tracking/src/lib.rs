//! mimic Tracking - Face position from a camera, decoupled from rendering
//!
//! # Model
//!
//! Camera → Landmarks → Reference point → TrackingCell ← Frame loop
//!
//! The capture pipeline runs at the camera's cadence on a tokio task. It
//! publishes into a [`TrackingCell`]: a handful of atomics, single writer,
//! single reader, no lock on the render path. Only the latest value matters,
//! so there is no queue; the reader sees at most one frame of stale position.
//!
//! # Failure
//!
//! - Acquisition failure (no camera, permission, pipeline load): source stays
//!   inactive for the rest of the session, status goes to `Fallback`
//! - Transient inference failure: counted as "no detection this tick"
//! - Detection loss: only reported after a 500 ms grace period

pub mod pipeline;
pub mod source;
pub mod state;

pub use pipeline::*;
pub use source::*;
pub use state::*;
