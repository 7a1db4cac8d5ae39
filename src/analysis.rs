//! Outfit analysis behind an inference seam.
//!
//! `StyleAnalyzer` is where a real model would plug in. `MockAnalyzer`
//! returns the canned demo result immediately.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::acquisition::ImageCandidate;
use crate::occasion::Occasion;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis service unavailable: {0}")]
    Unavailable(String),

    #[error("Image could not be analysed: {0}")]
    Rejected(String),
}

/// Scores are 0-100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub color_harmony: u8,
    pub style_coherence: u8,
    pub fit_quality: u8,
    pub trendiness: u8,
    pub occasion: Occasion,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub tags: Vec<String>,
}

impl AnalysisResult {
    /// Detail metrics in display order.
    pub fn metrics(&self) -> [(&'static str, u8); 4] {
        [
            ("Color Harmony", self.color_harmony),
            ("Style Coherence", self.style_coherence),
            ("Fit Quality", self.fit_quality),
            ("Trendiness", self.trendiness),
        ]
    }

    pub fn scores_in_range(&self) -> bool {
        std::iter::once(self.overall_score)
            .chain(self.metrics().iter().map(|(_, s)| *s))
            .all(|s| s <= 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Average,
            _ => Self::Poor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Accessories,
    Color,
    Fit,
    #[serde(other)]
    Other,
}

/// One style tip card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSuggestion {
    pub id: String,
    pub category: SuggestionCategory,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: Vec<String>,
}

/// Inference collaborator.
pub trait StyleAnalyzer: Send + Sync {
    fn analyze(
        &self,
        image: &ImageCandidate,
        occasion: Occasion,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;

    /// Tip cards shown next to a finished analysis.
    fn suggestions(&self, analysis: &AnalysisResult) -> Vec<StyleSuggestion>;
}

/// Canned demo analysis. Ignores the image.
#[derive(Debug, Clone, Default)]
pub struct MockAnalyzer;

impl StyleAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        image: &ImageCandidate,
        occasion: Occasion,
    ) -> Result<AnalysisResult, AnalysisError> {
        tracing::debug!(file = %image.name, %occasion, "Returning canned analysis");
        Ok(canned_analysis(occasion))
    }

    fn suggestions(&self, _analysis: &AnalysisResult) -> Vec<StyleSuggestion> {
        canned_suggestions()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn canned_analysis(occasion: Occasion) -> AnalysisResult {
    AnalysisResult {
        overall_score: 78,
        color_harmony: 85,
        style_coherence: 72,
        fit_quality: 80,
        trendiness: 75,
        occasion,
        strengths: strings(&[
            "Excellent color coordination",
            "Professional and polished look",
            "Well-fitted silhouette",
        ]),
        improvements: strings(&[
            "Consider adding a statement accessory",
            "Experiment with different textures",
            "Try a more modern cut",
        ]),
        tags: strings(&["Professional", "Classic", "Sophisticated", "Timeless"]),
    }
}

pub fn canned_suggestions() -> Vec<StyleSuggestion> {
    vec![
        StyleSuggestion {
            id: "1".into(),
            category: SuggestionCategory::Accessories,
            title: "Add a Statement Watch".into(),
            description: "A sleek metal watch would complement your professional look and add a touch of sophistication to your outfit.".into(),
            priority: Priority::High,
            tags: strings(&["accessories", "professional", "metal"]),
        },
        StyleSuggestion {
            id: "2".into(),
            category: SuggestionCategory::Color,
            title: "Incorporate Accent Colors".into(),
            description: "Consider adding a pop of burgundy or navy through a pocket square or tie to enhance your color palette.".into(),
            priority: Priority::Medium,
            tags: strings(&["color", "burgundy", "navy", "accent"]),
        },
        StyleSuggestion {
            id: "3".into(),
            category: SuggestionCategory::Fit,
            title: "Consider Tailoring".into(),
            description: "Your jacket could benefit from slight tailoring at the waist for a more fitted, modern silhouette.".into(),
            priority: Priority::Low,
            tags: strings(&["tailoring", "fit", "modern"]),
        },
    ]
}
