//! Acquisition state machine.
//!
//! `reduce` is pure: it never touches the preview store. When a transition
//! discards a selected image it hands back that image's preview URL so the
//! caller can release it exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ImageCandidate, PreviewUrl};
use crate::capture::CameraError;

/// Where an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Drop,
    Camera,
}

/// The single live selected image.
#[derive(Debug)]
pub struct AcquiredImage {
    candidate: ImageCandidate,
    preview_url: PreviewUrl,
    source: SourceKind,
    acquired_at: DateTime<Utc>,
}

impl AcquiredImage {
    pub fn new(candidate: ImageCandidate, preview_url: PreviewUrl, source: SourceKind) -> Self {
        Self {
            candidate,
            preview_url,
            source,
            acquired_at: Utc::now(),
        }
    }

    /// The binary handle. Cloning it shares the bytes.
    pub fn candidate(&self) -> &ImageCandidate {
        &self.candidate
    }

    pub fn preview_url(&self) -> &PreviewUrl {
        &self.preview_url
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

#[derive(Debug, Default)]
pub enum AcquisitionState {
    #[default]
    Empty,
    Pending(SourceKind),
    Selected(AcquiredImage),
    /// Camera could not be opened. Shown with a retry affordance.
    CameraFailed(CameraError),
}

impl AcquisitionState {
    pub fn selected(&self) -> Option<&AcquiredImage> {
        match self {
            Self::Selected(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Pending(_) => "pending",
            Self::Selected(_) => "selected",
            Self::CameraFailed(_) => "camera_failed",
        }
    }
}

#[derive(Debug)]
pub enum AcquisitionEvent {
    /// Acquisition started. Replaces whatever was selected.
    Begin(SourceKind),
    Accept(AcquiredImage),
    CameraFailed(CameraError),
    /// Pending acquisition gave up without a result.
    Abandon,
    Clear,
}

#[derive(Debug)]
pub struct Transition {
    pub state: AcquisitionState,
    /// Preview of the image this transition discarded.
    pub release: Option<PreviewUrl>,
}

impl Transition {
    fn to(state: AcquisitionState) -> Self {
        Self { state, release: None }
    }

    fn replacing(state: AcquisitionState, old: AcquiredImage) -> Self {
        Self {
            state,
            release: Some(old.preview_url),
        }
    }
}

pub fn reduce(state: AcquisitionState, event: AcquisitionEvent) -> Transition {
    use AcquisitionEvent as E;
    use AcquisitionState as S;

    match (state, event) {
        (S::Selected(old), E::Begin(kind)) => Transition::replacing(S::Pending(kind), old),
        (_, E::Begin(kind)) => Transition::to(S::Pending(kind)),

        (S::Selected(old), E::Accept(new)) => Transition::replacing(S::Selected(new), old),
        (_, E::Accept(new)) => Transition::to(S::Selected(new)),

        (S::Selected(old), E::CameraFailed(e)) => Transition::replacing(S::CameraFailed(e), old),
        (_, E::CameraFailed(e)) => Transition::to(S::CameraFailed(e)),

        (S::Pending(_), E::Abandon) => Transition::to(S::Empty),
        (other, E::Abandon) => Transition::to(other),

        (S::Selected(old), E::Clear) => Transition::replacing(S::Empty, old),
        (_, E::Clear) => Transition::to(S::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> AcquiredImage {
        AcquiredImage::new(
            ImageCandidate::new(name, "image/png", vec![0u8; 4]),
            PreviewUrl::mint(),
            SourceKind::File,
        )
    }

    #[test]
    fn accept_from_empty_releases_nothing() {
        let t = reduce(AcquisitionState::Empty, AcquisitionEvent::Accept(image("a.png")));
        assert!(t.release.is_none());
        assert_eq!(t.state.selected().unwrap().candidate().name, "a.png");
    }

    #[test]
    fn accept_over_selected_releases_previous() {
        let first = image("a.png");
        let first_url = first.preview_url().clone();
        let t = reduce(AcquisitionState::Selected(first), AcquisitionEvent::Accept(image("b.png")));
        assert_eq!(t.release, Some(first_url));
        assert_eq!(t.state.selected().unwrap().candidate().name, "b.png");
    }

    #[test]
    fn begin_over_selected_releases_previous() {
        let first = image("a.png");
        let url = first.preview_url().clone();
        let t = reduce(AcquisitionState::Selected(first), AcquisitionEvent::Begin(SourceKind::Camera));
        assert_eq!(t.release, Some(url));
        assert!(matches!(t.state, AcquisitionState::Pending(SourceKind::Camera)));
    }

    #[test]
    fn camera_failure_is_visible_not_empty() {
        let t = reduce(
            AcquisitionState::Pending(SourceKind::Camera),
            AcquisitionEvent::CameraFailed(CameraError::PermissionDenied),
        );
        assert!(matches!(
            t.state,
            AcquisitionState::CameraFailed(CameraError::PermissionDenied)
        ));
    }

    #[test]
    fn abandon_only_leaves_pending() {
        let t = reduce(AcquisitionState::Pending(SourceKind::File), AcquisitionEvent::Abandon);
        assert!(t.state.is_empty());

        let t = reduce(AcquisitionState::Selected(image("a.png")), AcquisitionEvent::Abandon);
        assert!(t.release.is_none());
        assert_eq!(t.state.as_str(), "selected");
    }

    #[test]
    fn clear_releases_selected_and_empties() {
        let first = image("a.png");
        let url = first.preview_url().clone();
        let t = reduce(AcquisitionState::Selected(first), AcquisitionEvent::Clear);
        assert_eq!(t.release, Some(url));
        assert!(t.state.is_empty());

        let t = reduce(AcquisitionState::Empty, AcquisitionEvent::Clear);
        assert!(t.release.is_none());
        assert!(t.state.is_empty());
    }
}
