//! User-facing error taxonomy.
//!
//! Module errors convert into `StyleError`; the shell turns each one into a
//! notice. Nothing here is fatal: every failure leaves a state the user can
//! retry from.

use thiserror::Error;

use crate::acquisition::AcquisitionError;
use crate::analysis::AnalysisError;
use crate::capture::{CameraError, CaptureError};
use crate::shell::Notice;
use crate::submission::SubmissionError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Camera permission denied")]
    CameraPermissionDenied,

    #[error("No camera device available")]
    CameraDeviceUnavailable,

    #[error("Camera has not shown a picture yet")]
    CameraSinkNotReady,

    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    #[error("Signup could not be saved: {0}")]
    PersistFailed(String),

    #[error("A signup is already being submitted")]
    SubmissionInFlight,

    #[error("Cancelled")]
    Cancelled,

    #[error("Unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl StyleError {
    /// Notice for the user. `None` for cancellation, which the user asked for.
    pub fn notice(&self) -> Option<Notice> {
        let notice = match self {
            Self::InvalidEmail => {
                Notice::destructive("Invalid email", "Please enter a valid email address.")
            }
            Self::CameraPermissionDenied => Notice::destructive(
                "Camera access denied",
                "Allow camera access to take a photo, or upload an image instead.",
            ),
            Self::CameraDeviceUnavailable => Notice::destructive(
                "No camera found",
                "Connect a camera or upload an image instead.",
            ),
            Self::CameraSinkNotReady => Notice::destructive(
                "Camera not ready",
                "Wait for the preview to appear, then try again.",
            ),
            Self::UploadFailed(_) => Notice::destructive(
                "Upload Error",
                "Failed to upload your outfit image. Please try again.",
            ),
            Self::PersistFailed(_) => Notice::destructive(
                "Error",
                "Failed to save your information. Please try again.",
            ),
            Self::SubmissionInFlight => Notice::destructive(
                "Please wait",
                "Your signup is still being saved.",
            ),
            Self::Cancelled => return None,
            Self::UnexpectedFailure(_) => Notice::destructive(
                "Error",
                "An unexpected error occurred. Please try again.",
            ),
        };
        Some(notice)
    }
}

impl From<CameraError> for StyleError {
    fn from(e: CameraError) -> Self {
        match e {
            CameraError::PermissionDenied => Self::CameraPermissionDenied,
            CameraError::DeviceUnavailable => Self::CameraDeviceUnavailable,
            CameraError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CaptureError> for StyleError {
    fn from(e: CaptureError) -> Self {
        match e {
            CaptureError::SinkNotReady => Self::CameraSinkNotReady,
            other => Self::UnexpectedFailure(other.to_string()),
        }
    }
}

impl From<AcquisitionError> for StyleError {
    fn from(e: AcquisitionError) -> Self {
        match e {
            AcquisitionError::Camera(e) => e.into(),
            AcquisitionError::Capture(e) => e.into(),
            AcquisitionError::Io(e) => Self::UnexpectedFailure(e.to_string()),
        }
    }
}

impl From<AnalysisError> for StyleError {
    fn from(e: AnalysisError) -> Self {
        Self::UnexpectedFailure(e.to_string())
    }
}

impl From<SubmissionError> for StyleError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::InvalidEmail => Self::InvalidEmail,
            SubmissionError::UploadFailed(e) => Self::UploadFailed(e.to_string()),
            SubmissionError::PersistFailed(e) => Self::PersistFailed(e.to_string()),
            SubmissionError::AlreadyInFlight => Self::SubmissionInFlight,
            SubmissionError::Cancelled => Self::Cancelled,
            SubmissionError::Serialization(e) => Self::UnexpectedFailure(e.to_string()),
        }
    }
}
