use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Destructive,
}

/// Short message shown to the user (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    pub fn image_ready() -> Self {
        Self::info(
            "Image uploaded successfully!",
            "Your outfit photo is ready for analysis.",
        )
    }

    pub fn missing_information() -> Self {
        Self::destructive(
            "Missing information",
            "Please upload an image and select an occasion.",
        )
    }

    pub fn analysis_complete() -> Self {
        Self::info(
            "Analysis complete!",
            "Your outfit has been analyzed. Check out the results below.",
        )
    }

    pub fn welcome() -> Self {
        Self::info(
            "Welcome to StyleAI! 🎉",
            "Your outfit analysis and email have been saved successfully!",
        )
    }
}
