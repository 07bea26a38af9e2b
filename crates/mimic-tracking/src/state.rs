//! Tracking State - the shared record between capture and render

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use mimic_core::PerceptualTime;

/// Default time without a detection before the target counts as lost
pub const DETECTION_GRACE: Duration = Duration::from_millis(500);

/// Snapshot of the tracking record, as read by the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackingState {
    /// Capture pipeline is running
    pub source_active: bool,
    /// A face was seen within the grace period
    pub target_detected: bool,
    /// Reference point in [-1, 1]², +x right and +y up in image space
    pub position: (f32, f32),
    /// Time of the last successful detection
    pub last_detected_at: PerceptualTime,
}

impl TrackingState {
    /// Should the head follow the user this frame?
    pub fn is_tracking(&self) -> bool {
        self.source_active && self.target_detected
    }
}

/// Host-visible tracking status. Observational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingStatus {
    /// Pipeline is starting (device open, model load)
    Initializing,
    /// Camera running
    Active,
    /// Acquisition failed; head uses idle motion for this session
    Fallback,
    /// Tracking switched off or stopped
    #[default]
    Disabled,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Initializing => "initializing",
            TrackingStatus::Active => "active",
            TrackingStatus::Fallback => "fallback",
            TrackingStatus::Disabled => "disabled",
        }
    }
}

#[inline]
fn pack(position: (f32, f32)) -> u64 {
    ((position.0.to_bits() as u64) << 32) | position.1.to_bits() as u64
}

#[inline]
fn unpack(bits: u64) -> (f32, f32) {
    (f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}

/// Lock-free tracking record
///
/// One writer (the capture task), one reader (the frame loop). Fields are
/// individually atomic; a reader may observe a position one update older than
/// the flags, never a torn coordinate pair.
#[derive(Debug)]
pub struct TrackingCell {
    source_active: AtomicBool,
    target_detected: AtomicBool,
    position: AtomicU64,
    last_detected_at: AtomicU64,
    grace: Duration,
}

impl TrackingCell {
    pub fn new(grace: Duration) -> Self {
        Self {
            source_active: AtomicBool::new(false),
            target_detected: AtomicBool::new(false),
            position: AtomicU64::new(pack((0.0, 0.0))),
            last_detected_at: AtomicU64::new(0),
            grace,
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Read the current record
    pub fn snapshot(&self) -> TrackingState {
        let target_detected = self.target_detected.load(Ordering::Acquire);
        TrackingState {
            source_active: self.source_active.load(Ordering::Acquire),
            target_detected,
            position: unpack(self.position.load(Ordering::Relaxed)),
            last_detected_at: PerceptualTime::from_micros(
                self.last_detected_at.load(Ordering::Relaxed),
            ),
        }
    }

    pub fn set_source_active(&self, active: bool) {
        self.source_active.store(active, Ordering::Release);
    }

    /// A face was found this camera frame
    pub fn record_detection(&self, position: (f32, f32), at: PerceptualTime) {
        let position = (
            sanitize_axis(position.0),
            sanitize_axis(position.1),
        );
        self.position.store(pack(position), Ordering::Relaxed);
        self.last_detected_at.store(at.as_micros(), Ordering::Relaxed);
        self.target_detected.store(true, Ordering::Release);
    }

    /// No face this camera frame. The target is only dropped once the grace
    /// period since the last detection has fully elapsed.
    pub fn record_miss(&self, at: PerceptualTime) {
        if !self.target_detected.load(Ordering::Acquire) {
            return;
        }
        let last = PerceptualTime::from_micros(self.last_detected_at.load(Ordering::Relaxed));
        if at.since(last) >= self.grace {
            self.target_detected.store(false, Ordering::Release);
        }
    }

    /// Back to the inactive, undetected state
    pub fn clear(&self) {
        self.source_active.store(false, Ordering::Release);
        self.target_detected.store(false, Ordering::Release);
        self.position.store(pack((0.0, 0.0)), Ordering::Relaxed);
        self.last_detected_at.store(0, Ordering::Relaxed);
    }
}

impl Default for TrackingCell {
    fn default() -> Self {
        Self::new(DETECTION_GRACE)
    }
}

fn sanitize_axis(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
