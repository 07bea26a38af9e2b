//! Blink - eyelid blend shapes on a randomized timer
//!
//! `Idle(countdown) -> Closing(progress) -> Opening(progress) -> Idle`.
//! Progress runs 0..1 over the whole blink; the eyelids close over the
//! first half and reopen over the second.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use mimic_core::{sanitize, RigTarget};
use mimic_rig::{MorphConcept, MorphIndexMap};

use crate::AnimationState;

/// Blink configuration
#[derive(Debug, Clone)]
pub struct BlinkConfig {
    /// Shortest pause between blinks, seconds
    pub min_interval: f32,
    /// Longest pause between blinks, seconds
    pub max_interval: f32,
    /// Length of one blink, seconds
    pub duration: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            min_interval: 2.5,
            max_interval: 5.0,
            duration: 0.15,
        }
    }
}

/// Upper bound on the time between blinks, seconds
pub const MAX_BLINK_INTERVAL: f32 = 60.0;
/// Upper bound on one blink, seconds
pub const MAX_BLINK_DURATION: f32 = 2.0;

/// Blink state machine phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlinkPhase {
    /// Eyes open, seconds until the next blink
    Idle { countdown: f32 },
    /// Lids going down, progress in [0, 0.5)
    Closing { progress: f32 },
    /// Lids coming up, progress in [0.5, 1)
    Opening { progress: f32 },
}

impl BlinkPhase {
    fn at(progress: f32) -> Self {
        if progress < 0.5 {
            BlinkPhase::Closing { progress }
        } else {
            BlinkPhase::Opening { progress }
        }
    }

    pub fn is_blinking(&self) -> bool {
        !matches!(self, BlinkPhase::Idle { .. })
    }
}

/// Triangular eyelid curve: 0 at both ends, 1 at the midpoint
#[inline]
pub fn blink_curve(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    if p <= 0.5 {
        2.0 * p
    } else {
        2.0 * (1.0 - p)
    }
}

/// Blink controller
#[derive(Debug, Clone)]
pub struct BlinkController {
    config: BlinkConfig,
    rng: StdRng,
}

impl BlinkController {
    /// Seeded when `seed` is given, otherwise from entropy
    pub fn new(config: BlinkConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    /// Draw a fresh pause, uniform in `[min_interval, max_interval]`
    pub fn next_interval(&mut self) -> f32 {
        let lo = sanitize(self.config.min_interval, 0.0, MAX_BLINK_INTERVAL);
        let hi = sanitize(self.config.max_interval, 0.0, MAX_BLINK_INTERVAL).max(lo);
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }

    /// Step the state machine and write the eyelid weight. Returns the weight.
    pub fn update<T: RigTarget + ?Sized>(
        &mut self,
        state: &mut AnimationState,
        morphs: &MorphIndexMap,
        dt: f32,
        target: &mut T,
    ) -> f32 {
        let duration = sanitize(self.config.duration, 1e-3, MAX_BLINK_DURATION);

        let weight = match state.blink {
            BlinkPhase::Idle { countdown } => {
                let countdown = countdown - dt;
                if countdown <= 0.0 {
                    trace!(frame = state.frame, "blink start");
                    state.blink = BlinkPhase::Closing { progress: 0.0 };
                } else {
                    state.blink = BlinkPhase::Idle { countdown };
                }
                0.0
            }
            BlinkPhase::Closing { progress } | BlinkPhase::Opening { progress } => {
                let progress = progress + dt / duration;
                if progress >= 1.0 {
                    state.blink = BlinkPhase::Idle {
                        countdown: self.next_interval(),
                    };
                    0.0
                } else {
                    state.blink = BlinkPhase::at(progress);
                    blink_curve(progress)
                }
            }
        };

        state.blink_weight = weight;
        for concept in MorphConcept::EYELIDS {
            morphs.apply(target, concept, weight);
        }
        weight
    }
}
