//! Scripted capture devices
//!
//! Stand-ins for a camera and a face landmark model. The camera counts what
//! happens to it; the detector replays a script of face positions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use mimic_core::{MimicError, MimicResult};
use mimic_tracking::{CameraFrame, CaptureDevice, FaceLandmarks, Landmark, LandmarkDetector, NOSE_TIP_LANDMARK};

/// Device lifecycle counters, shared with the test
#[derive(Debug, Default)]
pub struct CameraStats {
    pub opened: AtomicU64,
    pub released: AtomicU64,
    pub grabbed: AtomicU64,
}

impl CameraStats {
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    pub fn grabbed(&self) -> u64 {
        self.grabbed.load(Ordering::SeqCst)
    }
}

/// Camera that always delivers a blank frame, or refuses to open
#[derive(Debug)]
pub struct ScriptedCamera {
    stats: Arc<CameraStats>,
    open_error: Option<MimicError>,
    is_open: bool,
}

impl ScriptedCamera {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(CameraStats::default()),
            open_error: None,
            is_open: false,
        }
    }

    /// Camera whose `open` fails with `error`
    pub fn failing(error: MimicError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::new()
        }
    }

    pub fn stats(&self) -> Arc<CameraStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for ScriptedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDevice for ScriptedCamera {
    fn open(&mut self) -> MimicResult<()> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        self.is_open = true;
        Ok(())
    }

    fn grab(&mut self) -> MimicResult<Option<CameraFrame>> {
        if !self.is_open {
            return Err(MimicError::DeviceReleased);
        }
        let sequence = self.stats.grabbed.fetch_add(1, Ordering::SeqCst);
        Ok(Some(CameraFrame {
            width: 640,
            height: 480,
            sequence,
            pixels: Vec::new(),
        }))
    }

    fn release(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.stats.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// One scripted detector result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceStep {
    /// A face with its reference point at a normalized position
    Face(f32, f32),
    /// No face in frame
    Absent,
    /// Transient inference failure
    Glitch,
}

/// Detector replaying a script; the last step repeats forever
#[derive(Debug, Clone)]
pub struct ScriptedDetector {
    script: Arc<Mutex<VecDeque<FaceStep>>>,
    last: FaceStep,
    load_error: Option<MimicError>,
}

impl ScriptedDetector {
    pub fn new(steps: impl IntoIterator<Item = FaceStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into_iter().collect())),
            last: FaceStep::Absent,
            load_error: None,
        }
    }

    /// Always sees a face at `(x, y)`
    pub fn fixed(x: f32, y: f32) -> Self {
        Self::new([FaceStep::Face(x, y)])
    }

    /// Never sees a face
    pub fn empty() -> Self {
        Self::new([FaceStep::Absent])
    }

    /// Model fails to load
    pub fn unloadable(reason: &str) -> Self {
        Self {
            load_error: Some(MimicError::PipelineLoad(reason.to_string())),
            ..Self::empty()
        }
    }

    /// Append steps while the session is running
    pub fn push(&self, step: FaceStep) {
        self.script.lock().push_back(step);
    }

    /// Drop pending steps; `step` applies from the next camera frame on
    pub fn set(&self, step: FaceStep) {
        let mut script = self.script.lock();
        script.clear();
        script.push_back(step);
    }

    fn next_step(&mut self) -> FaceStep {
        if let Some(step) = self.script.lock().pop_front() {
            self.last = step;
        }
        self.last
    }
}

/// Landmarks with the reference point at a normalized position
pub fn landmarks_at(x: f32, y: f32) -> FaceLandmarks {
    let mut points = vec![Landmark::default(); NOSE_TIP_LANDMARK + 1];
    points[NOSE_TIP_LANDMARK] = Landmark::new((x + 1.0) / 2.0, (1.0 - y) / 2.0, 0.0);
    FaceLandmarks::new(points)
}

impl LandmarkDetector for ScriptedDetector {
    fn load(&mut self) -> MimicResult<()> {
        match &self.load_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn detect(&mut self, frame: &CameraFrame) -> MimicResult<Option<FaceLandmarks>> {
        match self.next_step() {
            FaceStep::Face(x, y) => Ok(Some(landmarks_at(x, y))),
            FaceStep::Absent => Ok(None),
            FaceStep::Glitch => Err(MimicError::Inference(format!("frame {}", frame.sequence))),
        }
    }
}
