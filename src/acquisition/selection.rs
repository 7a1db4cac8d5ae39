use std::path::Path;

use tokio_util::sync::CancellationToken;

use super::state::{reduce, AcquiredImage, AcquisitionEvent, AcquisitionState, SourceKind};
use super::{
    is_image_type, AcquisitionError, ImageCandidate, MemoryPreviewStore, PreviewStore,
    SelectOutcome,
};
use crate::capture::{
    CameraError, CameraSession, CaptureError, MediaCaptureController, MediaDevice, VideoFrame,
};

/// Owns the selected image, its preview, and the camera session while the
/// camera is open.
///
/// At most one image is live: selecting another releases the previous
/// preview before the new one becomes active.
pub struct ImageAcquisition<D: MediaDevice, P: PreviewStore = MemoryPreviewStore> {
    state: AcquisitionState,
    previews: P,
    camera: MediaCaptureController<D>,
    session: Option<CameraSession<D::Stream>>,
    is_dragging: bool,
}

impl<D: MediaDevice> ImageAcquisition<D> {
    pub fn new(device: D) -> Self {
        Self::with_previews(MediaCaptureController::new(device), MemoryPreviewStore::new())
    }
}

impl<D: MediaDevice, P: PreviewStore> ImageAcquisition<D, P> {
    pub fn with_previews(camera: MediaCaptureController<D>, previews: P) -> Self {
        Self {
            state: AcquisitionState::Empty,
            previews,
            camera,
            session: None,
            is_dragging: false,
        }
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&AcquiredImage> {
        self.state.selected()
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    pub fn camera_device(&self) -> &D {
        self.camera.device()
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn camera_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_open())
    }

    /// Frame currently rendered in the viewfinder.
    pub fn viewfinder_frame(&self) -> Option<VideoFrame> {
        self.session.as_ref().and_then(|s| s.preview_frame())
    }

    pub fn drag_enter(&mut self) {
        self.is_dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.is_dragging = false;
    }

    // ── File paths ──────────────────────────────────────────

    /// Offer a file from the picker. Non-images are ignored.
    pub fn select_from_file(&mut self, candidate: ImageCandidate) -> SelectOutcome {
        if !candidate.is_image() {
            tracing::debug!(media_type = %candidate.media_type, "Ignoring non-image file");
            return SelectOutcome::Ignored;
        }
        self.stop_camera_session();
        self.accept(candidate, SourceKind::File);
        SelectOutcome::Selected
    }

    /// Offer a drop payload. Only the first entry is considered.
    pub fn select_from_drop(&mut self, files: Vec<ImageCandidate>) -> SelectOutcome {
        self.is_dragging = false;
        let Some(first) = files.into_iter().next() else {
            return SelectOutcome::Ignored;
        };
        if !first.is_image() {
            tracing::debug!(media_type = %first.media_type, "Ignoring non-image drop");
            return SelectOutcome::Ignored;
        }
        self.stop_camera_session();
        self.accept(first, SourceKind::Drop);
        SelectOutcome::Selected
    }

    /// Offer a file by path (native picker). The declared type comes from
    /// the extension, as a browser file input would report it.
    pub async fn select_from_path(
        &mut self,
        path: &Path,
    ) -> Result<SelectOutcome, AcquisitionError> {
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        if !is_image_type(media_type) {
            tracing::debug!(media_type, "Ignoring non-image path");
            return Ok(SelectOutcome::Ignored);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        // Nothing changes until the bytes are in hand.
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            tracing::warn!(file = %name, error = %e, "Image file could not be read");
            AcquisitionError::from(e)
        })?;

        self.stop_camera_session();
        self.apply(AcquisitionEvent::Begin(SourceKind::File));
        self.accept(ImageCandidate::new(name, media_type, bytes), SourceKind::File);
        Ok(SelectOutcome::Selected)
    }

    // ── Camera path ─────────────────────────────────────────

    /// Enter camera mode. A refused or missing camera leaves the visible
    /// `CameraFailed` state; cancellation returns to `Empty`.
    pub async fn start_camera(&mut self, cancel: &CancellationToken) -> Result<(), CameraError> {
        self.stop_camera_session();
        self.apply(AcquisitionEvent::Begin(SourceKind::Camera));

        match self.camera.open(cancel).await {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(CameraError::Cancelled) => {
                self.apply(AcquisitionEvent::Abandon);
                Err(CameraError::Cancelled)
            }
            Err(e) => {
                self.apply(AcquisitionEvent::CameraFailed(e.clone()));
                Err(e)
            }
        }
    }

    /// Snapshot the viewfinder. On success the camera is closed and the
    /// still becomes the selected image; on failure the camera stays open
    /// so the user can try again or cancel.
    pub fn capture_photo(&mut self) -> Result<(), AcquisitionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(AcquisitionError::Capture(CaptureError::SessionClosed))?;
        let photo = self.camera.capture(session)?;

        self.stop_camera_session();
        self.accept(ImageCandidate::from_photo(photo), SourceKind::Camera);
        Ok(())
    }

    /// Leave camera mode without a capture.
    pub fn stop_camera(&mut self) {
        self.stop_camera_session();
        let event = match self.state {
            AcquisitionState::Pending(SourceKind::Camera) => Some(AcquisitionEvent::Abandon),
            AcquisitionState::CameraFailed(_) => Some(AcquisitionEvent::Clear),
            _ => None,
        };
        if let Some(event) = event {
            self.apply(event);
        }
    }

    /// Open, capture, and close in one go. The camera is closed on every path.
    pub async fn select_from_camera(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<(), AcquisitionError> {
        self.start_camera(cancel).await?;
        let captured = self.capture_photo();
        if captured.is_err() {
            self.stop_camera();
        }
        captured
    }

    pub fn clear(&mut self) {
        self.stop_camera_session();
        self.apply(AcquisitionEvent::Clear);
    }

    // ── Internal ────────────────────────────────────────────

    fn accept(&mut self, candidate: ImageCandidate, source: SourceKind) {
        let url = self.previews.create(&candidate);
        tracing::info!(
            file = %candidate.name,
            media_type = %candidate.media_type,
            bytes = candidate.len(),
            ?source,
            "Image selected"
        );
        self.apply(AcquisitionEvent::Accept(AcquiredImage::new(candidate, url, source)));
    }

    fn apply(&mut self, event: AcquisitionEvent) {
        let transition = reduce(std::mem::take(&mut self.state), event);
        if let Some(url) = transition.release {
            self.previews.revoke(&url);
        }
        self.state = transition.state;
    }

    fn stop_camera_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            self.camera.close(&mut session);
        }
    }
}

impl<D: MediaDevice, P: PreviewStore> Drop for ImageAcquisition<D, P> {
    fn drop(&mut self) {
        self.stop_camera_session();
        if let AcquisitionState::Selected(image) = &self.state {
            let url = image.preview_url().clone();
            self.previews.revoke(&url);
        }
    }
}
