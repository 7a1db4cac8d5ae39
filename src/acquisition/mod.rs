//! Image acquisition: file picker, drag-drop, and camera capture unified
//! into a single selected image with a revocable preview.

pub mod preview;
pub mod selection;
pub mod state;

pub use preview::*;
pub use selection::*;
pub use state::*;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::capture::{CameraError, CaptureError, CapturedPhoto};

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Could not read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
}

/// Result of offering a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectOutcome {
    Selected,
    /// Not an image. Dropped silently; state unchanged.
    Ignored,
}

/// Whether a declared media type is accepted as an image.
pub fn is_image_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// A file-like object offered by the user: its name, declared media type
/// and bytes. Cloning shares the bytes.
#[derive(Clone)]
pub struct ImageCandidate {
    pub name: String,
    pub media_type: String,
    data: Arc<[u8]>,
}

impl ImageCandidate {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    pub fn from_photo(photo: CapturedPhoto) -> Self {
        let name = photo.file_name();
        Self::new(name, CapturedPhoto::MEDIA_TYPE, photo.bytes)
    }

    pub fn is_image(&self) -> bool {
        is_image_type(&self.media_type)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for ImageCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCandidate")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}
