//! Tracking Source - lifecycle of the capture session
//!
//! - `start` is idempotent: a running or failed session is left alone
//! - `stop` is always safe, releases the device before returning
//! - a failed session stays failed until `stop`; the next `start` is a fresh attempt
//! - device and detector calls run on the blocking pool, never on an async worker

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use mimic_core::{MimicError, MimicResult, PerceptualTime};

use crate::{
    CaptureConfig, CaptureDevice, CapturePipeline, LandmarkDetector, TrackingCell, TrackingState,
    TrackingStatus,
};

/// Shortest camera cadence the capture task will run at
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

struct CaptureSession {
    pipeline: Arc<CapturePipeline>,
    task: Option<JoinHandle<()>>,
}

/// Owner of the capture session and the shared tracking record
pub struct TrackingSource {
    cell: Arc<TrackingCell>,
    config: CaptureConfig,
    status: Arc<watch::Sender<TrackingStatus>>,
    session: Option<CaptureSession>,
}

impl TrackingSource {
    pub fn new(config: CaptureConfig) -> Self {
        let (status, _) = watch::channel(TrackingStatus::Disabled);
        Self {
            cell: Arc::new(TrackingCell::new(config.grace_period)),
            config,
            status: Arc::new(status),
            session: None,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Shared record, for readers on other threads
    pub fn cell(&self) -> Arc<TrackingCell> {
        Arc::clone(&self.cell)
    }

    /// Latest tracking record
    pub fn snapshot(&self) -> TrackingState {
        self.cell.snapshot()
    }

    /// Current status
    pub fn status(&self) -> TrackingStatus {
        *self.status.borrow()
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<TrackingStatus> {
        self.status.subscribe()
    }

    /// Has a session been started (running or failed) and not stopped?
    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    /// Start capturing. Requires a tokio runtime; without one the session
    /// fails into fallback like any other acquisition failure.
    pub fn start(&mut self, device: Box<dyn CaptureDevice>, detector: Box<dyn LandmarkDetector>) {
        if self.session.is_some() {
            tracing::debug!(status = self.status().as_str(), "tracking already started");
            return;
        }

        let pipeline = Arc::new(CapturePipeline::new(device, detector, &self.config));
        self.status.send_replace(TrackingStatus::Initializing);

        let task = match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(run_capture(
                Arc::clone(&pipeline),
                Arc::clone(&self.cell),
                Arc::clone(&self.status),
                self.config.clone(),
            ))),
            Err(_) => {
                fail_session(&pipeline, &self.cell, &self.status, &MimicError::NoRuntime);
                None
            }
        };

        self.session = Some(CaptureSession { pipeline, task });
    }

    /// Stop capturing and release the device. Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            // Waits for an in-flight grab at most, never for inference
            session.pipeline.shutdown();
            if let Some(task) = session.task {
                task.abort();
            }
            tracing::debug!("tracking stopped");
        }
        self.cell.clear();
        self.status.send_replace(TrackingStatus::Disabled);
    }
}

impl Drop for TrackingSource {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TrackingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingSource")
            .field("status", &self.status())
            .field("started", &self.is_started())
            .field("state", &self.snapshot())
            .finish()
    }
}

fn fail_session(
    pipeline: &CapturePipeline,
    cell: &TrackingCell,
    status: &watch::Sender<TrackingStatus>,
    error: &MimicError,
) {
    pipeline.shutdown_with(|| {
        tracing::warn!(error = %error, "face tracking unavailable, using idle head motion");
        cell.set_source_active(false);
        status.send_replace(TrackingStatus::Fallback);
    });
}

/// Run a blocking pipeline call on the blocking pool
async fn off_worker<T: Send + 'static>(
    pipeline: &Arc<CapturePipeline>,
    call: fn(&CapturePipeline) -> MimicResult<T>,
) -> MimicResult<T> {
    let pipeline = Arc::clone(pipeline);
    tokio::task::spawn_blocking(move || call(&pipeline))
        .await
        .map_err(|e| MimicError::Worker(e.to_string()))?
}

async fn run_capture(
    pipeline: Arc<CapturePipeline>,
    cell: Arc<TrackingCell>,
    status: Arc<watch::Sender<TrackingStatus>>,
    config: CaptureConfig,
) {
    if let Err(e) = off_worker(&pipeline, CapturePipeline::open).await {
        fail_session(&pipeline, &cell, &status, &e);
        return;
    }
    let activated = pipeline.if_live(|| {
        cell.set_source_active(true);
        status.send_replace(TrackingStatus::Active);
    });
    if !activated {
        return;
    }
    tracing::debug!("face tracking active");

    let epoch = Instant::now();
    let mut interval = tokio::time::interval(config.frame_interval.max(MIN_FRAME_INTERVAL));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let at = PerceptualTime::from_duration(epoch.elapsed());
        match off_worker(&pipeline, CapturePipeline::sample).await {
            Ok(sample) => {
                if !pipeline.if_live(|| sample.record(&cell, at)) {
                    break;
                }
            }
            Err(e) => {
                fail_session(&pipeline, &cell, &status, &e);
                break;
            }
        }
    }
    tracing::trace!(
        frames = pipeline.frames(),
        detections = pipeline.detections(),
        "capture task finished"
    );
}
