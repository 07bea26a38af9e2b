//! mimic Test Harness - Scripted devices and frame-level simulation
//!
//! This crate provides:
//! - Scripted camera and landmark detector for driving a real `TrackingSource`
//! - Frame simulator with jittered frame deltas and a hand-fed tracking record
//! - Asset presets and end-to-end scenarios

pub mod scenarios;
pub mod scripted;
pub mod simulator;

pub use scripted::*;
pub use simulator::*;
