//! Presentation shell: one state container tying acquisition, occasion,
//! analysis, and the signup dialog together.
//!
//! The rendering surface sends intents in and reads a `ShellView` back out.
//! Notices queue up here until the next view drains them.

pub mod notice;
pub mod view;

pub use notice::*;
pub use view::*;

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::acquisition::{ImageAcquisition, ImageCandidate, SelectOutcome};
use crate::analysis::{AnalysisResult, StyleAnalyzer, StyleSuggestion};
use crate::backend::{ObjectStorage, RecordStore};
use crate::capture::MediaDevice;
use crate::error::StyleError;
use crate::occasion::{Occasion, OccasionSelection};
use crate::submission::{
    SignupDialog, SubmissionError, SubmissionPipeline, SubmissionReceipt, SubmissionRequest,
};

pub struct StyleSession<D: MediaDevice, A: StyleAnalyzer> {
    acquisition: ImageAcquisition<D>,
    occasion: OccasionSelection,
    analyzer: A,
    analysis: Option<AnalysisResult>,
    is_analyzing: bool,
    dialog: SignupDialog,
    /// Cancels the submit started by the last `begin_signup`.
    signup_cancel: CancellationToken,
    notices: Vec<Notice>,
}

impl<D: MediaDevice, A: StyleAnalyzer> StyleSession<D, A> {
    pub fn new(device: D, analyzer: A) -> Self {
        Self {
            acquisition: ImageAcquisition::new(device),
            occasion: OccasionSelection::default(),
            analyzer,
            analysis: None,
            is_analyzing: false,
            dialog: SignupDialog::default(),
            signup_cancel: CancellationToken::new(),
            notices: Vec::new(),
        }
    }

    pub fn acquisition(&self) -> &ImageAcquisition<D> {
        &self.acquisition
    }

    pub fn selected_occasion(&self) -> Option<Occasion> {
        self.occasion.selected()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn dialog(&self) -> &SignupDialog {
        &self.dialog
    }

    /// Analysis can start once an image and an occasion are both chosen.
    pub fn can_analyze(&self) -> bool {
        self.acquisition.selected().is_some() && self.occasion.selected().is_some()
    }

    /// Tip cards, shown only next to an analysis for a chosen occasion.
    pub fn suggestions(&self) -> Vec<StyleSuggestion> {
        match (&self.analysis, self.occasion.selected()) {
            (Some(analysis), Some(_)) => self.analyzer.suggestions(analysis),
            _ => Vec::new(),
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn report(&mut self, error: &StyleError) {
        if let Some(notice) = error.notice() {
            self.notify(notice);
        }
    }

    fn image_replaced(&mut self, outcome: SelectOutcome) -> SelectOutcome {
        if outcome == SelectOutcome::Selected {
            self.analysis = None;
            self.notify(Notice::image_ready());
        }
        outcome
    }

    // ── Acquisition intents ─────────────────────────────────

    pub fn drag_enter(&mut self) {
        self.acquisition.drag_enter();
    }

    pub fn drag_leave(&mut self) {
        self.acquisition.drag_leave();
    }

    pub fn select_file(&mut self, candidate: ImageCandidate) -> SelectOutcome {
        let outcome = self.acquisition.select_from_file(candidate);
        self.image_replaced(outcome)
    }

    pub fn select_drop(&mut self, files: Vec<ImageCandidate>) -> SelectOutcome {
        let outcome = self.acquisition.select_from_drop(files);
        self.image_replaced(outcome)
    }

    pub async fn select_path(&mut self, path: &Path) -> Result<SelectOutcome, StyleError> {
        match self.acquisition.select_from_path(path).await {
            Ok(outcome) => Ok(self.image_replaced(outcome)),
            Err(e) => {
                let error = StyleError::from(e);
                self.report(&error);
                Err(error)
            }
        }
    }

    /// Enter camera mode. Any previous image is released.
    pub async fn start_camera(&mut self, cancel: &CancellationToken) -> Result<(), StyleError> {
        self.analysis = None;
        self.acquisition.start_camera(cancel).await.map_err(|e| {
            let error = StyleError::from(e);
            self.report(&error);
            error
        })
    }

    pub fn capture_photo(&mut self) -> Result<(), StyleError> {
        match self.acquisition.capture_photo() {
            Ok(()) => {
                self.image_replaced(SelectOutcome::Selected);
                Ok(())
            }
            Err(e) => {
                let error = StyleError::from(e);
                self.report(&error);
                Err(error)
            }
        }
    }

    pub fn stop_camera(&mut self) {
        self.acquisition.stop_camera();
    }

    /// Remove the image and the analysis made from it.
    pub fn clear_image(&mut self) {
        self.acquisition.clear();
        self.analysis = None;
    }

    // ── Occasion and analysis ───────────────────────────────

    pub fn select_occasion(&mut self, occasion: Occasion) {
        if self.occasion.selected() != Some(occasion) {
            self.analysis = None;
        }
        self.occasion.select(occasion);
    }

    /// Analyze the selected image for the chosen occasion. On success the
    /// signup dialog opens.
    pub async fn analyze(&mut self) -> Result<(), StyleError> {
        let image = self.acquisition.selected().map(|i| i.candidate().clone());
        let (Some(image), Some(occasion)) = (image, self.occasion.selected()) else {
            self.notify(Notice::missing_information());
            return Ok(());
        };

        self.is_analyzing = true;
        let result = self.analyzer.analyze(&image, occasion).await;
        self.is_analyzing = false;

        match result {
            Ok(analysis) => {
                tracing::info!(
                    %occasion,
                    overall = analysis.overall_score,
                    "Outfit analysis complete"
                );
                self.analysis = Some(analysis);
                self.notify(Notice::analysis_complete());
                self.dialog.open();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Outfit analysis failed");
                let error = StyleError::from(e);
                self.report(&error);
                Err(error)
            }
        }
    }

    // ── Signup dialog ───────────────────────────────────────

    pub fn open_signup(&mut self) {
        self.dialog.open();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.dialog.set_email(email);
    }

    /// Close the dialog. A submit still in flight is cancelled.
    pub fn skip_signup(&mut self) {
        self.signup_cancel.cancel();
        self.dialog.skip();
    }

    /// Lock the dialog and assemble what will be sent, with the token a
    /// later `skip_signup` cancels.
    pub fn begin_signup(&mut self) -> Result<(SubmissionRequest, CancellationToken), StyleError> {
        let email = match self.dialog.begin_submit() {
            Some(email) => email,
            None => {
                let error = if self.dialog.is_submitting() {
                    StyleError::SubmissionInFlight
                } else {
                    StyleError::UnexpectedFailure("signup dialog is not open".into())
                };
                self.report(&error);
                return Err(error);
            }
        };
        self.signup_cancel = CancellationToken::new();
        let request = SubmissionRequest {
            email,
            image: self.acquisition.selected().map(|i| i.candidate().clone()),
            analysis: self.analysis.clone(),
            occasion: self.occasion.selected(),
        };
        Ok((request, self.signup_cancel.clone()))
    }

    /// Record how a submit ended. The dialog is always unlocked.
    pub fn finish_signup(
        &mut self,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<SubmissionReceipt, StyleError> {
        self.dialog.finish_submit(result.is_ok());
        match result {
            Ok(receipt) => {
                self.notify(Notice::welcome());
                Ok(receipt)
            }
            Err(e) => {
                let error = StyleError::from(e);
                self.report(&error);
                Err(error)
            }
        }
    }

    /// Begin, submit, and finish in one call.
    pub async fn submit_signup<B: ObjectStorage + RecordStore>(
        &mut self,
        pipeline: &SubmissionPipeline<B>,
    ) -> Result<SubmissionReceipt, StyleError> {
        let (request, cancel) = self.begin_signup()?;
        let result = pipeline.submit(request, &cancel).await;
        self.finish_signup(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MockAnalyzer;
    use crate::backend::MemoryBackend;
    use crate::capture::{ScriptedCamera, VideoFrame};

    type TestSession = StyleSession<ScriptedCamera, MockAnalyzer>;

    fn session() -> TestSession {
        StyleSession::new(
            ScriptedCamera::granting(VideoFrame::solid(8, 6, [10, 20, 30, 255])),
            MockAnalyzer,
        )
    }

    fn png(name: &str) -> ImageCandidate {
        ImageCandidate::new(name, "image/png", vec![1u8, 2, 3])
    }

    fn titles(notices: &[Notice]) -> Vec<&str> {
        notices.iter().map(|n| n.title.as_str()).collect()
    }

    #[tokio::test]
    async fn analyze_without_inputs_warns_and_does_nothing() {
        let mut s = session();
        s.analyze().await.unwrap();
        assert!(s.analysis().is_none());
        assert!(!s.dialog().is_open());
        assert_eq!(titles(&s.take_notices()), vec!["Missing information"]);

        s.select_occasion(Occasion::Office);
        s.analyze().await.unwrap();
        assert!(s.analysis().is_none());
    }

    #[tokio::test]
    async fn analysis_opens_signup_and_shows_suggestions() {
        let mut s = session();
        assert_eq!(s.select_file(png("look.png")), SelectOutcome::Selected);
        s.select_occasion(Occasion::Date);
        assert!(s.can_analyze());

        s.analyze().await.unwrap();

        assert_eq!(s.analysis().unwrap().occasion, Occasion::Date);
        assert!(!s.is_analyzing());
        assert!(s.dialog().is_open());
        assert_eq!(s.suggestions().len(), 3);
        assert_eq!(
            titles(&s.take_notices()),
            vec!["Image uploaded successfully!", "Analysis complete!"]
        );
    }

    #[tokio::test]
    async fn clearing_or_replacing_the_image_drops_analysis() {
        let mut s = session();
        s.select_file(png("a.png"));
        s.select_occasion(Occasion::Office);
        s.analyze().await.unwrap();

        s.clear_image();
        assert!(s.analysis().is_none());
        assert!(s.suggestions().is_empty());

        s.select_file(png("b.png"));
        s.analyze().await.unwrap();
        s.select_drop(vec![png("c.png")]);
        assert!(s.analysis().is_none());
    }

    #[tokio::test]
    async fn changing_occasion_drops_analysis() {
        let mut s = session();
        s.select_file(png("a.png"));
        s.select_occasion(Occasion::Office);
        s.analyze().await.unwrap();

        s.select_occasion(Occasion::Office);
        assert!(s.analysis().is_some());
        s.select_occasion(Occasion::Party);
        assert!(s.analysis().is_none());
    }

    #[test]
    fn non_image_file_is_silent() {
        let mut s = session();
        let outcome = s.select_file(ImageCandidate::new("notes.pdf", "application/pdf", vec![1u8]));
        assert_eq!(outcome, SelectOutcome::Ignored);
        assert!(s.take_notices().is_empty());
    }

    #[tokio::test]
    async fn office_signup_without_image_saves_one_row() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());
        let mut s = session();
        s.select_occasion(Occasion::Office);
        s.open_signup();
        s.set_email("a@b.com");

        let receipt = s
            .submit_signup(&pipeline)
            .await
            .unwrap();

        assert_eq!(receipt, SubmissionReceipt::default());
        let rows = backend.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].row,
            serde_json::json!({
                "Email": "a@b.com",
                "image_url": null,
                "image_path": null,
                "analysis": null,
                "occasion": "office"
            })
        );
        assert!(!s.dialog().is_open());
        assert_eq!(s.dialog().email(), "");
        assert_eq!(titles(&s.take_notices()), vec!["Welcome to StyleAI! 🎉"]);
    }

    #[tokio::test]
    async fn failed_signup_keeps_dialog_and_unlocks_it() {
        let backend = MemoryBackend::new().failing_uploads();
        let pipeline = SubmissionPipeline::new(backend.clone());
        let mut s = session();
        s.select_file(png("a.png"));
        s.select_occasion(Occasion::Casual);
        s.analyze().await.unwrap();
        s.take_notices();
        s.set_email("a@b.com");

        let err = s
            .submit_signup(&pipeline)
            .await
            .unwrap_err();

        assert!(matches!(err, StyleError::UploadFailed(_)));
        assert_eq!(backend.insert_calls(), 0);
        assert!(s.dialog().is_open());
        assert!(!s.dialog().is_submitting());
        assert_eq!(s.dialog().email(), "a@b.com");
        assert_eq!(titles(&s.take_notices()), vec!["Upload Error"]);
    }

    #[tokio::test]
    async fn invalid_email_is_reported_without_network() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());
        let mut s = session();
        s.open_signup();
        s.set_email("not-an-email");

        let err = s
            .submit_signup(&pipeline)
            .await
            .unwrap_err();

        assert_eq!(err, StyleError::InvalidEmail);
        assert_eq!(backend.network_calls(), 0);
        assert!(!s.dialog().is_submitting());
        assert_eq!(titles(&s.take_notices()), vec!["Invalid email"]);
    }

    #[test]
    fn second_begin_is_refused_while_submitting() {
        let mut s = session();
        s.open_signup();
        s.set_email("a@b.com");
        assert!(s.begin_signup().is_ok());
        assert_eq!(s.begin_signup().unwrap_err(), StyleError::SubmissionInFlight);
    }

    #[tokio::test]
    async fn skip_after_begin_cancels_the_submit() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());
        let mut s = session();
        s.select_file(png("a.png"));
        s.select_occasion(Occasion::Office);
        s.analyze().await.unwrap();
        s.take_notices();
        s.set_email("a@b.com");

        let (request, cancel) = s.begin_signup().unwrap();
        s.skip_signup();
        assert!(cancel.is_cancelled());

        let result = pipeline.submit(request, &cancel).await;
        assert!(matches!(result, Err(SubmissionError::Cancelled)));
        assert_eq!(backend.network_calls(), 0);

        assert_eq!(s.finish_signup(result).unwrap_err(), StyleError::Cancelled);
        assert!(!s.dialog().is_open());
        assert!(!s.dialog().is_submitting());
        assert!(s.take_notices().is_empty());
    }

    #[test]
    fn each_begin_gets_a_fresh_token() {
        let mut s = session();
        s.skip_signup();
        s.open_signup();
        s.set_email("a@b.com");
        let (_, cancel) = s.begin_signup().unwrap();
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn unreadable_path_keeps_image_and_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.select_file(png("a.png"));
        s.select_occasion(Occasion::Office);
        s.analyze().await.unwrap();
        s.take_notices();

        let err = s.select_path(&dir.path().join("missing.png")).await.unwrap_err();

        assert!(matches!(err, StyleError::UnexpectedFailure(_)));
        assert!(s.analysis().is_some());
        assert_eq!(s.acquisition().selected().unwrap().candidate().name, "a.png");
        assert_eq!(s.take_notices().len(), 1);
    }

    #[tokio::test]
    async fn camera_capture_selects_photo() {
        let mut s = session();
        s.start_camera(&CancellationToken::new()).await.unwrap();
        assert!(s.acquisition().camera_active());

        s.capture_photo().unwrap();
        assert!(!s.acquisition().camera_active());
        let image = s.acquisition().selected().unwrap();
        assert_eq!(image.candidate().media_type, "image/jpeg");
        assert_eq!(titles(&s.take_notices()), vec!["Image uploaded successfully!"]);
    }

    #[tokio::test]
    async fn denied_camera_is_reported() {
        let mut s = StyleSession::new(ScriptedCamera::denying(), MockAnalyzer);
        let err = s.start_camera(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, StyleError::CameraPermissionDenied);
        assert_eq!(s.acquisition().state().as_str(), "camera_failed");
        assert_eq!(titles(&s.take_notices()), vec!["Camera access denied"]);
    }
}
