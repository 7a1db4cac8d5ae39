//! Platform media seam: the camera device and the live stream it hands out.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::CameraError;

/// Which physical camera to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera, pointing away from the user.
    Environment,
    /// Front camera.
    User,
}

/// One RGBA frame as rendered by the video sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    /// Build a frame, rejecting empty dimensions or a buffer whose length
    /// is not `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || rgba.len() != expected {
            return None;
        }
        Some(Self { width, height, rgba })
    }

    /// Uniformly coloured frame.
    pub fn solid(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let rgba = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self { width, height, rgba }
    }
}

/// A live camera stream. Only the session that opened it may hold it.
pub trait MediaStream: Send {
    /// Most recent frame rendered into the video sink, if any.
    fn latest_frame(&self) -> Option<VideoFrame>;

    /// Stop every track. Must be safe to call more than once.
    fn stop_all_tracks(&mut self);

    fn is_live(&self) -> bool;
}

/// Platform camera access. `request_stream` is the permission prompt.
pub trait MediaDevice: Send + Sync {
    type Stream: MediaStream + 'static;

    fn request_stream(
        &self,
        facing: FacingMode,
    ) -> impl Future<Output = Result<Self::Stream, CameraError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// WebviewCamera: frames supplied by the rendering surface
// ═══════════════════════════════════════════════════════════

/// Outcome of the webview's own `getUserMedia` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionReport {
    Granted,
    Denied,
    NoDevice,
}

#[derive(Debug, Default)]
struct WebviewFeed {
    permission: Option<PermissionReport>,
    frame: Option<VideoFrame>,
    live: bool,
    generation: u64,
}

/// Camera backed by the webview's media stream.
///
/// The surface reports the permission outcome before each open, then pushes
/// rendered frames while the stream is live. Each open consumes the report,
/// so a stale grant never reopens the camera.
#[derive(Debug, Clone, Default)]
pub struct WebviewCamera {
    feed: Arc<Mutex<WebviewFeed>>,
}

impl WebviewCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_permission(&self, report: PermissionReport) {
        if let Ok(mut feed) = self.feed.lock() {
            feed.permission = Some(report);
        }
    }

    /// Store the latest rendered frame. Ignored unless a stream is live.
    pub fn push_frame(&self, frame: VideoFrame) -> bool {
        match self.feed.lock() {
            Ok(mut feed) if feed.live => {
                feed.frame = Some(frame);
                true
            }
            _ => false,
        }
    }

    /// Whether the surface should keep its tracks running.
    pub fn is_streaming(&self) -> bool {
        self.feed.lock().map(|f| f.live).unwrap_or(false)
    }
}

impl MediaDevice for WebviewCamera {
    type Stream = WebviewStream;

    async fn request_stream(&self, facing: FacingMode) -> Result<WebviewStream, CameraError> {
        let mut feed = self
            .feed
            .lock()
            .map_err(|_| CameraError::DeviceUnavailable)?;

        match feed.permission.take() {
            Some(PermissionReport::Granted) => {
                feed.generation += 1;
                feed.live = true;
                feed.frame = None;
                tracing::debug!(?facing, generation = feed.generation, "Webview camera stream opened");
                Ok(WebviewStream {
                    feed: Arc::clone(&self.feed),
                    generation: feed.generation,
                    live: true,
                })
            }
            Some(PermissionReport::Denied) => Err(CameraError::PermissionDenied),
            Some(PermissionReport::NoDevice) | None => Err(CameraError::DeviceUnavailable),
        }
    }
}

pub struct WebviewStream {
    feed: Arc<Mutex<WebviewFeed>>,
    generation: u64,
    live: bool,
}

impl MediaStream for WebviewStream {
    fn latest_frame(&self) -> Option<VideoFrame> {
        if !self.live {
            return None;
        }
        let feed = self.feed.lock().ok()?;
        if feed.generation != self.generation {
            return None;
        }
        feed.frame.clone()
    }

    fn stop_all_tracks(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        if let Ok(mut feed) = self.feed.lock() {
            // A newer stream owns the feed now; leave it alone.
            if feed.generation == self.generation {
                feed.live = false;
                feed.frame = None;
            }
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

// ═══════════════════════════════════════════════════════════
// ScriptedCamera: deterministic device for tests and demos
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Script {
    Grant(Option<VideoFrame>),
    Deny,
    NoDevice,
}

/// Camera that follows a fixed script and counts requests and track stops.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    script: Script,
    delay: Option<Duration>,
    requests: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl ScriptedCamera {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            requests: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Grants access and renders `frame` immediately.
    pub fn granting(frame: VideoFrame) -> Self {
        Self::with_script(Script::Grant(Some(frame)))
    }

    /// Grants access but the sink never renders a frame.
    pub fn granting_without_frame() -> Self {
        Self::with_script(Script::Grant(None))
    }

    pub fn denying() -> Self {
        Self::with_script(Script::Deny)
    }

    pub fn without_device() -> Self {
        Self::with_script(Script::NoDevice)
    }

    /// Hold the permission prompt open for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of streams whose tracks were stopped.
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaDevice for ScriptedCamera {
    type Stream = ScriptedStream;

    async fn request_stream(&self, _facing: FacingMode) -> Result<ScriptedStream, CameraError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Grant(frame) => Ok(ScriptedStream {
                frame: frame.clone(),
                live: true,
                stops: Arc::clone(&self.stops),
            }),
            Script::Deny => Err(CameraError::PermissionDenied),
            Script::NoDevice => Err(CameraError::DeviceUnavailable),
        }
    }
}

pub struct ScriptedStream {
    frame: Option<VideoFrame>,
    live: bool,
    stops: Arc<AtomicUsize>,
}

impl MediaStream for ScriptedStream {
    fn latest_frame(&self) -> Option<VideoFrame> {
        if self.live {
            self.frame.clone()
        } else {
            None
        }
    }

    fn stop_all_tracks(&mut self) {
        if self.live {
            self.live = false;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_frame_rejects_mismatched_buffer() {
        assert!(VideoFrame::new(2, 2, vec![0; 15]).is_none());
        assert!(VideoFrame::new(0, 2, vec![]).is_none());
        assert!(VideoFrame::new(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn solid_frame_fills_every_pixel() {
        let frame = VideoFrame::solid(3, 2, [1, 2, 3, 255]);
        assert_eq!(frame.rgba.len(), 24);
        assert_eq!(&frame.rgba[20..24], &[1, 2, 3, 255]);
    }

    #[tokio::test]
    async fn webview_camera_requires_permission_report() {
        let camera = WebviewCamera::new();
        let err = camera.request_stream(FacingMode::Environment).await.err();
        assert_eq!(err, Some(CameraError::DeviceUnavailable));

        camera.report_permission(PermissionReport::Denied);
        let err = camera.request_stream(FacingMode::Environment).await.err();
        assert_eq!(err, Some(CameraError::PermissionDenied));
    }

    #[tokio::test]
    async fn webview_camera_grant_is_consumed_by_one_open() {
        let camera = WebviewCamera::new();
        camera.report_permission(PermissionReport::Granted);
        assert!(camera.request_stream(FacingMode::Environment).await.is_ok());
        assert!(camera.request_stream(FacingMode::Environment).await.is_err());
    }

    #[tokio::test]
    async fn webview_frames_flow_only_while_live() {
        let camera = WebviewCamera::new();
        assert!(!camera.push_frame(VideoFrame::solid(1, 1, [0; 4])));

        camera.report_permission(PermissionReport::Granted);
        let mut stream = camera.request_stream(FacingMode::Environment).await.unwrap();
        assert!(stream.latest_frame().is_none());

        assert!(camera.push_frame(VideoFrame::solid(1, 1, [9; 4])));
        assert_eq!(stream.latest_frame().unwrap().rgba, vec![9; 4]);

        stream.stop_all_tracks();
        assert!(!camera.is_streaming());
        assert!(stream.latest_frame().is_none());
        assert!(!camera.push_frame(VideoFrame::solid(1, 1, [0; 4])));
    }

    #[tokio::test]
    async fn stale_webview_stream_does_not_stop_newer_one() {
        let camera = WebviewCamera::new();
        camera.report_permission(PermissionReport::Granted);
        let mut first = camera.request_stream(FacingMode::Environment).await.unwrap();
        camera.report_permission(PermissionReport::Granted);
        let second = camera.request_stream(FacingMode::Environment).await.unwrap();

        first.stop_all_tracks();
        assert!(camera.is_streaming());
        assert!(second.is_live());
    }

    #[tokio::test]
    async fn scripted_stream_counts_stops_once() {
        let camera = ScriptedCamera::granting(VideoFrame::solid(1, 1, [0; 4]));
        let mut stream = camera.request_stream(FacingMode::Environment).await.unwrap();
        stream.stop_all_tracks();
        stream.stop_all_tracks();
        assert_eq!(camera.stops(), 1);
        assert_eq!(camera.requests(), 1);
    }
}
