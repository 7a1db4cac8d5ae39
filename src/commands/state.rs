use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::analysis::MockAnalyzer;
use crate::backend::{BackendError, ConfiguredBackend};
use crate::capture::WebviewCamera;
use crate::config::BackendConfig;
use crate::shell::StyleSession;
use crate::submission::SubmissionPipeline;

pub type DesktopSession = StyleSession<WebviewCamera, MockAnalyzer>;

/// Global application state managed by Tauri.
pub struct AppState {
    /// Uses tokio Mutex: camera open and file reads hold it across awaits.
    pub session: tokio::sync::Mutex<DesktopSession>,
    /// Shared with the session's capture controller; frames arrive here
    /// without taking the session lock.
    pub camera: WebviewCamera,
    pub pipeline: Arc<SubmissionPipeline<ConfiguredBackend>>,
    camera_cancel: Mutex<CancellationToken>,
}

impl AppState {
    pub fn new(backend: Option<BackendConfig>) -> Result<Self, BackendError> {
        let configured = ConfiguredBackend::from_config(backend.as_ref())?;
        tracing::info!(backend = configured.kind(), "Signup backend ready");

        let pipeline = match &backend {
            Some(config) => SubmissionPipeline::from_config(configured, config),
            None => SubmissionPipeline::new(configured),
        };

        let camera = WebviewCamera::new();
        Ok(Self {
            session: tokio::sync::Mutex::new(StyleSession::new(camera.clone(), MockAnalyzer)),
            camera,
            pipeline: Arc::new(pipeline),
            camera_cancel: Mutex::new(CancellationToken::new()),
        })
    }

    /// Token for a new camera open. Any earlier open is cancelled.
    pub fn next_camera_token(&self) -> CancellationToken {
        replace_token(&self.camera_cancel)
    }

    pub fn cancel_camera(&self) {
        cancel_token(&self.camera_cancel);
    }
}

fn replace_token(slot: &Mutex<CancellationToken>) -> CancellationToken {
    let fresh = CancellationToken::new();
    if let Ok(mut current) = slot.lock() {
        current.cancel();
        *current = fresh.clone();
    }
    fresh
}

fn cancel_token(slot: &Mutex<CancellationToken>) {
    if let Ok(current) = slot.lock() {
        current.cancel();
    }
}
