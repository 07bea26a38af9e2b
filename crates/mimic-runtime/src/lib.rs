//! mimic Runtime - Avatar frame loop and lifecycle
//!
//! [`Avatar`] is the only type a host needs: mount it on a scene, feed it
//! speech inputs, call [`Avatar::frame`] once per display refresh.
//! [`FrameScheduler`] is the loop itself, usable without a tracking source.

pub mod avatar;
pub mod clock;
pub mod config;
pub mod scheduler;

pub use avatar::*;
pub use clock::*;
pub use config::*;
pub use scheduler::*;
