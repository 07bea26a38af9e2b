//! Error types for mimic
//!
//! Only the tracking pipeline produces errors. Everything on the render path
//! degrades instead of failing.

use thiserror::Error;

/// Core mimic errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MimicError {
    // Acquisition errors
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Capture device released")]
    DeviceReleased,

    // Pipeline errors
    #[error("Landmark pipeline failed to load: {0}")]
    PipelineLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Reference landmark {index} missing (frame has {available})")]
    MissingLandmark { index: usize, available: usize },

    // Runtime errors
    #[error("No async runtime available for the capture task")]
    NoRuntime,

    #[error("Capture worker failed: {0}")]
    Worker(String),
}

impl MimicError {
    /// Does this error end the tracking session for good?
    ///
    /// Acquisition failures are permanent for a session; a single failed
    /// inference only counts as "no detection this tick".
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MimicError::Inference(_) | MimicError::MissingLandmark { .. }
        )
    }
}

/// Result type for mimic operations
pub type MimicResult<T> = Result<T, MimicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(MimicError::PermissionDenied.is_fatal());
        assert!(MimicError::CameraUnavailable("none".into()).is_fatal());
        assert!(MimicError::PipelineLoad("wasm".into()).is_fatal());
        assert!(MimicError::NoRuntime.is_fatal());
        assert!(MimicError::Worker("cancelled".into()).is_fatal());

        assert!(!MimicError::Inference("blurry".into()).is_fatal());
        assert!(!MimicError::MissingLandmark {
            index: 1,
            available: 0
        }
        .is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = MimicError::MissingLandmark {
            index: 4,
            available: 2,
        };
        assert_eq!(err.to_string(), "Reference landmark 4 missing (frame has 2)");
    }
}
