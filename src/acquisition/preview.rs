//! Locally generated, revocable preview URLs for the selected image.

use std::collections::HashMap;
use std::fmt;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ImageCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn mint() -> Self {
        Self(format!("blob:styleai/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues preview URLs and releases them.
pub trait PreviewStore: Send {
    fn create(&mut self, candidate: &ImageCandidate) -> PreviewUrl;

    fn revoke(&mut self, url: &PreviewUrl);
}

/// Keeps previewed bytes in memory until revoked.
#[derive(Debug, Default)]
pub struct MemoryPreviewStore {
    entries: HashMap<PreviewUrl, ImageCandidate>,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, url: &PreviewUrl) -> bool {
        self.entries.contains_key(url)
    }

    /// Inline `data:` URL the webview can render directly.
    pub fn data_url(&self, url: &PreviewUrl) -> Option<String> {
        let candidate = self.entries.get(url)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(candidate.data());
        Some(format!("data:{};base64,{}", candidate.media_type, encoded))
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&mut self, candidate: &ImageCandidate) -> PreviewUrl {
        let url = PreviewUrl::mint();
        self.entries.insert(url.clone(), candidate.clone());
        url
    }

    fn revoke(&mut self, url: &PreviewUrl) {
        if self.entries.remove(url).is_none() {
            tracing::debug!(url = %url, "Revoke of unknown preview URL ignored");
        }
    }
}
