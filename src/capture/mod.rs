//! Camera lifecycle and still capture.
//!
//! `MediaCaptureController` opens the environment-facing camera through a
//! platform `MediaDevice`, snapshots the rendered frame into a JPEG still,
//! and guarantees every opened stream is stopped: on capture, on cancel,
//! and when the session is dropped.

pub mod controller;
pub mod device;

pub use controller::*;
pub use device::*;

use thiserror::Error;

/// Failure to obtain a live camera stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera device available")]
    DeviceUnavailable,

    #[error("Camera request cancelled")]
    Cancelled,
}

/// Failure to turn the current video frame into a still image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Video sink has not rendered a frame yet")]
    SinkNotReady,

    #[error("Camera session is closed")]
    SessionClosed,

    #[error("Frame encoding failed: {0}")]
    Encoding(String),
}
