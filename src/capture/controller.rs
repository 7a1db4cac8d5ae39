use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::device::{FacingMode, MediaDevice, MediaStream, VideoFrame};
use super::{CameraError, CaptureError};
use crate::config;

/// JPEG still taken from the live camera.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
}

impl CapturedPhoto {
    pub const MEDIA_TYPE: &'static str = "image/jpeg";

    pub fn file_name(&self) -> String {
        format!("capture-{}.jpg", self.captured_at.timestamp_millis())
    }
}

/// An open camera. Owns the stream exclusively; the rest of the app only
/// sees the frame rendered in the viewfinder.
///
/// Dropping an open session stops its tracks.
pub struct CameraSession<S: MediaStream> {
    id: Uuid,
    stream: Option<S>,
    error_state: Option<String>,
}

impl<S: MediaStream> CameraSession<S> {
    fn new(stream: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            stream: Some(stream),
            error_state: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    /// Last capture failure, cleared by a successful capture.
    pub fn error_state(&self) -> Option<&str> {
        self.error_state.as_deref()
    }

    /// Frame currently shown in the viewfinder.
    pub fn preview_frame(&self) -> Option<VideoFrame> {
        self.stream.as_ref().and_then(|s| s.latest_frame())
    }

    /// Stop every track. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
            tracing::debug!(session = %self.id, "Camera session closed");
        }
    }
}

impl<S: MediaStream> Drop for CameraSession<S> {
    fn drop(&mut self) {
        if self.stream.is_some() {
            tracing::debug!(session = %self.id, "Camera session dropped while open");
            self.close();
        }
    }
}

/// Opens the environment-facing camera and turns frames into JPEG stills.
pub struct MediaCaptureController<D: MediaDevice> {
    device: D,
    facing: FacingMode,
    jpeg_quality: u8,
}

impl<D: MediaDevice> MediaCaptureController<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            facing: FacingMode::Environment,
            jpeg_quality: config::JPEG_QUALITY,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Ask the platform for a camera stream.
    ///
    /// The permission prompt is the only suspend point; cancelling the token
    /// abandons it and yields `CameraError::Cancelled`.
    pub async fn open(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CameraSession<D::Stream>, CameraError> {
        if cancel.is_cancelled() {
            return Err(CameraError::Cancelled);
        }

        let requested = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Camera request cancelled before the platform answered");
                return Err(CameraError::Cancelled);
            }
            result = self.device.request_stream(self.facing) => result,
        };

        match requested {
            Ok(stream) => {
                let session = CameraSession::new(stream);
                tracing::info!(session = %session.id, facing = ?self.facing, "Camera opened");
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera could not be opened");
                Err(e)
            }
        }
    }

    /// Snapshot the rendered frame at its native resolution.
    pub fn capture(
        &self,
        session: &mut CameraSession<D::Stream>,
    ) -> Result<CapturedPhoto, CaptureError> {
        let stream = session.stream.as_ref().ok_or(CaptureError::SessionClosed)?;
        let result = stream
            .latest_frame()
            .ok_or(CaptureError::SinkNotReady)
            .and_then(|frame| encode_jpeg(&frame, self.jpeg_quality));

        match result {
            Ok(photo) => {
                session.error_state = None;
                tracing::info!(
                    session = %session.id,
                    width = photo.width,
                    height = photo.height,
                    bytes = photo.bytes.len(),
                    "Camera frame captured"
                );
                Ok(photo)
            }
            Err(e) => {
                session.error_state = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn close(&self, session: &mut CameraSession<D::Stream>) {
        session.close();
    }
}

/// Encode an RGBA frame as JPEG. Alpha is dropped.
pub fn encode_jpeg(frame: &VideoFrame, quality: u8) -> Result<CapturedPhoto, CaptureError> {
    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or_else(|| CaptureError::Encoding("frame buffer does not match its dimensions".into()))?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut buf, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| CaptureError::Encoding(e.to_string()))?;

    Ok(CapturedPhoto {
        bytes: buf.into_inner(),
        width: frame.width,
        height: frame.height,
        captured_at: Utc::now(),
    })
}
