//! Capture Pipeline - camera acquisition and landmark inference
//!
//! Devices and detectors are host-provided. The pipeline only knows how to
//! turn their output into a normalized reference position.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use mimic_core::{MimicError, MimicResult, PerceptualTime};

use crate::{TrackingCell, DETECTION_GRACE};

/// Nose tip in the 468-point face mesh topology
pub const NOSE_TIP_LANDMARK: usize = 1;

/// Capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Camera frame cadence
    pub frame_interval: Duration,
    /// Landmark used as the face position
    pub reference_landmark: usize,
    /// Time without detection before the target counts as lost
    pub grace_period: Duration,
    /// Mirror the x axis (front-facing cameras deliver mirrored frames)
    pub mirror: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            reference_landmark: NOSE_TIP_LANDMARK,
            grace_period: DETECTION_GRACE,
            mirror: false,
        }
    }
}

impl CaptureConfig {
    /// Cheaper cadence for low-power hosts
    pub fn low_power() -> Self {
        Self {
            frame_interval: Duration::from_millis(66),
            ..Self::default()
        }
    }
}

/// One captured camera frame
#[derive(Debug, Clone, Default)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Device-assigned sequence number
    pub sequence: u64,
    /// Packed pixel data, format is device/detector contract
    pub pixels: Vec<u8>,
}

/// A landmark in normalized image coordinates ([0, 1], y down)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Landmarks of one detected face
#[derive(Debug, Clone, Default)]
pub struct FaceLandmarks {
    pub points: Vec<Landmark>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Reference landmark mapped to [-1, 1]², +y up
    pub fn normalized_position(&self, index: usize, mirror: bool) -> MimicResult<(f32, f32)> {
        let lm = self.points.get(index).ok_or(MimicError::MissingLandmark {
            index,
            available: self.points.len(),
        })?;
        if !lm.x.is_finite() || !lm.y.is_finite() {
            return Err(MimicError::Inference(format!(
                "non-finite landmark {index}"
            )));
        }

        let mut x = (lm.x * 2.0 - 1.0).clamp(-1.0, 1.0);
        let y = (1.0 - lm.y * 2.0).clamp(-1.0, 1.0);
        if mirror {
            x = -x;
        }
        Ok((x, y))
    }
}

/// Camera acquisition
pub trait CaptureDevice: Send {
    /// Acquire the device. Permission and availability errors surface here.
    fn open(&mut self) -> MimicResult<()>;

    /// Latest frame, `None` if the camera has nothing new
    fn grab(&mut self) -> MimicResult<Option<CameraFrame>>;

    /// Release the device. Must be safe to call repeatedly.
    fn release(&mut self);
}

/// Face landmark inference
pub trait LandmarkDetector: Send {
    /// Load models. Called once per session after the device opens.
    fn load(&mut self) -> MimicResult<()>;

    /// Landmarks of the most prominent face, `None` if no face
    fn detect(&mut self, frame: &CameraFrame) -> MimicResult<Option<FaceLandmarks>>;
}

/// Outcome of one camera frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSample {
    /// Reference position of the detected face
    Face((f32, f32)),
    /// Nothing new, no face, or a transient failure
    Miss,
}

impl FrameSample {
    pub fn record(self, cell: &TrackingCell, at: PerceptualTime) {
        match self {
            FrameSample::Face(position) => cell.record_detection(position, at),
            FrameSample::Miss => cell.record_miss(at),
        }
    }
}

struct DeviceSlot {
    device: Box<dyn CaptureDevice>,
    /// Cleared by `shutdown`; checked under the slot lock before every
    /// device call and every cell write
    live: bool,
}

/// Device + detector, sampled once per camera frame.
///
/// Shared between the session owner and the capture task. Device and
/// detector sit behind separate locks so a slow inference never holds up
/// `shutdown`.
pub struct CapturePipeline {
    device: Mutex<DeviceSlot>,
    detector: Mutex<Box<dyn LandmarkDetector>>,
    reference_landmark: usize,
    mirror: bool,
    frames: AtomicU64,
    detections: AtomicU64,
}

impl CapturePipeline {
    pub fn new(
        device: Box<dyn CaptureDevice>,
        detector: Box<dyn LandmarkDetector>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            device: Mutex::new(DeviceSlot { device, live: true }),
            detector: Mutex::new(detector),
            reference_landmark: config.reference_landmark,
            mirror: config.mirror,
            frames: AtomicU64::new(0),
            detections: AtomicU64::new(0),
        }
    }

    /// Open the device and load the detector. Blocking.
    pub fn open(&self) -> MimicResult<()> {
        {
            let mut slot = self.device.lock();
            if !slot.live {
                return Err(MimicError::DeviceReleased);
            }
            slot.device.open()?;
        }
        self.detector.lock().load()
    }

    /// Grab and analyze one camera frame. Blocking.
    ///
    /// Transient failures come back as a miss; only fatal errors are returned.
    pub fn sample(&self) -> MimicResult<FrameSample> {
        let grabbed = {
            let mut slot = self.device.lock();
            if !slot.live {
                return Err(MimicError::DeviceReleased);
            }
            slot.device.grab()
        };
        let frame = match grabbed {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(FrameSample::Miss),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::trace!(error = %e, "frame grab failed");
                return Ok(FrameSample::Miss);
            }
        };
        self.frames.fetch_add(1, Ordering::Relaxed);

        let position = self.detector.lock().detect(&frame).and_then(|landmarks| {
            landmarks
                .map(|l| l.normalized_position(self.reference_landmark, self.mirror))
                .transpose()
        });

        match position {
            Ok(Some(position)) => {
                self.detections.fetch_add(1, Ordering::Relaxed);
                Ok(FrameSample::Face(position))
            }
            Ok(None) => Ok(FrameSample::Miss),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::trace!(error = %e, frame = frame.sequence, "inference failed");
                Ok(FrameSample::Miss)
            }
        }
    }

    /// Run `publish` under the device lock if the pipeline is still live.
    /// Returns false once the pipeline has shut down.
    pub fn if_live(&self, publish: impl FnOnce()) -> bool {
        let slot = self.device.lock();
        if slot.live {
            publish();
        }
        slot.live
    }

    /// Release the device and run `on_shutdown` under the device lock.
    /// Only the first call does anything; returns whether this call did.
    pub fn shutdown_with(&self, on_shutdown: impl FnOnce()) -> bool {
        let mut slot = self.device.lock();
        if !slot.live {
            return false;
        }
        slot.live = false;
        slot.device.release();
        on_shutdown();
        true
    }

    pub fn shutdown(&self) -> bool {
        self.shutdown_with(|| ())
    }

    pub fn is_live(&self) -> bool {
        self.device.lock().live
    }

    /// Frames processed this session
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Frames with a face this session
    pub fn detections(&self) -> u64 {
        self.detections.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for CapturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturePipeline")
            .field("reference_landmark", &self.reference_landmark)
            .field("live", &self.is_live())
            .field("frames", &self.frames())
            .field("detections", &self.detections())
            .finish()
    }
}
