//! Serializable snapshot handed to the rendering surface.

use serde::Serialize;

use super::{Notice, StyleSession};
use crate::acquisition::{AcquisitionState, PreviewUrl, SourceKind};
use crate::analysis::{AnalysisResult, ScoreBand, StyleAnalyzer, StyleSuggestion};
use crate::capture::MediaDevice;
use crate::config;
use crate::occasion::Occasion;
use crate::submission::SignupDialog;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView {
    pub acquisition: AcquisitionView,
    pub occasions: Vec<OccasionOption>,
    pub selected_occasion: Option<Occasion>,
    pub can_analyze: bool,
    pub is_analyzing: bool,
    pub analysis: Option<AnalysisView>,
    pub suggestions: Vec<StyleSuggestion>,
    pub dialog: SignupDialog,
    /// Notices raised since the previous view.
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionView {
    pub state: &'static str,
    pub pending_source: Option<SourceKind>,
    pub is_dragging: bool,
    pub camera_active: bool,
    pub camera_error: Option<String>,
    pub image: Option<ImageView>,
    /// Advertised limit for the upload hint.
    pub max_image_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub name: String,
    pub media_type: String,
    pub size: usize,
    pub source: SourceKind,
    pub preview_url: PreviewUrl,
}

#[derive(Debug, Clone, Serialize)]
pub struct OccasionOption {
    pub id: Occasion,
    pub label: &'static str,
    pub description: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricView {
    pub label: &'static str,
    pub score: u8,
    pub band: ScoreBand,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub overall_score: u8,
    pub overall_band: ScoreBand,
    pub metrics: Vec<MetricView>,
    pub occasion: Occasion,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&AnalysisResult> for AnalysisView {
    fn from(a: &AnalysisResult) -> Self {
        Self {
            overall_score: a.overall_score,
            overall_band: ScoreBand::from_score(a.overall_score),
            metrics: a
                .metrics()
                .into_iter()
                .map(|(label, score)| MetricView {
                    label,
                    score,
                    band: ScoreBand::from_score(score),
                })
                .collect(),
            occasion: a.occasion,
            strengths: a.strengths.clone(),
            improvements: a.improvements.clone(),
            tags: a.tags.clone(),
        }
    }
}

impl<D: MediaDevice, A: StyleAnalyzer> StyleSession<D, A> {
    /// Snapshot current state and drain pending notices.
    pub fn view(&mut self) -> ShellView {
        let acquisition = self.acquisition();
        let state = acquisition.state();
        let acquisition_view = AcquisitionView {
            state: state.as_str(),
            pending_source: match state {
                AcquisitionState::Pending(kind) => Some(*kind),
                _ => None,
            },
            is_dragging: acquisition.is_dragging(),
            camera_active: acquisition.camera_active(),
            camera_error: match state {
                AcquisitionState::CameraFailed(e) => Some(e.to_string()),
                _ => None,
            },
            image: acquisition.selected().map(|image| ImageView {
                name: image.candidate().name.clone(),
                media_type: image.candidate().media_type.clone(),
                size: image.candidate().len(),
                source: image.source(),
                preview_url: image.preview_url().clone(),
            }),
            max_image_bytes: config::MAX_IMAGE_BYTES,
        };

        let selected = self.selected_occasion();
        let occasions = Occasion::ALL
            .into_iter()
            .map(|o| OccasionOption {
                id: o,
                label: o.label(),
                description: o.description(),
                selected: selected == Some(o),
            })
            .collect();

        ShellView {
            acquisition: acquisition_view,
            occasions,
            selected_occasion: selected,
            can_analyze: self.can_analyze(),
            is_analyzing: self.is_analyzing(),
            analysis: self.analysis().map(AnalysisView::from),
            suggestions: self.suggestions(),
            dialog: self.dialog().clone(),
            notices: self.take_notices(),
        }
    }

    /// Inline `data:` URL for a live preview; `None` once revoked.
    pub fn preview_data_url(&self, url: &PreviewUrl) -> Option<String> {
        self.acquisition().previews().data_url(url)
    }
}
