use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::record::{object_key, object_path, SubmissionRecord};
use super::SubmissionError;
use crate::acquisition::ImageCandidate;
use crate::analysis::AnalysisResult;
use crate::backend::{ObjectStorage, RecordStore};
use crate::config::{self, BackendConfig};
use crate::occasion::Occasion;

/// Lenient check: anything containing `@`.
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@')
}

/// Everything one signup attempt sends.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub email: String,
    pub image: Option<ImageCandidate>,
    pub analysis: Option<AnalysisResult>,
    pub occasion: Option<Occasion>,
}

impl SubmissionRequest {
    pub fn email_only(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            image: None,
            analysis: None,
            occasion: None,
        }
    }
}

/// Where the uploaded photo ended up, if there was one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub image_url: Option<String>,
    pub image_path: Option<String>,
}

/// Upload-then-persist transaction. At most one submission runs at a time;
/// a concurrent call is rejected without touching the network.
pub struct SubmissionPipeline<B> {
    backend: B,
    bucket: String,
    table: String,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on drop.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<B: ObjectStorage + RecordStore> SubmissionPipeline<B> {
    pub fn new(backend: B) -> Self {
        Self::with_targets(backend, config::IMAGE_BUCKET, config::SIGNUP_TABLE)
    }

    pub fn from_config(backend: B, config: &BackendConfig) -> Self {
        Self::with_targets(backend, config.bucket.clone(), config.table.clone())
    }

    pub fn with_targets(backend: B, bucket: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
            table: table.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: &self.in_flight,
            })
    }

    /// Validate, upload the image (if any), then write one row.
    ///
    /// Cancelling stops before the next step starts or abandons the step in
    /// flight. A photo uploaded before a cancel or a failed insert is left
    /// in storage; its path is logged.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
        cancel: &CancellationToken,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if !is_valid_email(&request.email) {
            tracing::debug!("Rejected signup with invalid email");
            return Err(SubmissionError::InvalidEmail);
        }

        let _guard = self.try_acquire().ok_or_else(|| {
            tracing::warn!("Signup submitted while another is in flight");
            SubmissionError::AlreadyInFlight
        })?;

        let analysis = request
            .analysis
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        if cancel.is_cancelled() {
            return Err(SubmissionError::Cancelled);
        }

        let mut receipt = SubmissionReceipt::default();
        if let Some(image) = &request.image {
            let key = object_key(&image.name, &image.media_type);
            let path = object_path(&self.bucket, &key);
            tracing::debug!(
                bucket = %self.bucket,
                path = %path,
                bytes = image.len(),
                "Uploading outfit image"
            );

            let upload = self.backend.upload(
                &self.bucket,
                &path,
                image.data().to_vec(),
                &image.media_type,
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(path = %path, "Signup cancelled during upload");
                    return Err(SubmissionError::Cancelled);
                }
                result = upload => {
                    result.map_err(|e| {
                        tracing::warn!(path = %path, error = %e, "Image upload failed");
                        SubmissionError::UploadFailed(e)
                    })?;
                }
            }

            receipt.image_url = Some(self.backend.public_url(&self.bucket, &path));
            receipt.image_path = Some(path);
        }

        if cancel.is_cancelled() {
            if let Some(path) = &receipt.image_path {
                tracing::warn!(path = %path, "Signup cancelled after upload; object orphaned");
            }
            return Err(SubmissionError::Cancelled);
        }

        let record = SubmissionRecord {
            email: request.email,
            image_url: receipt.image_url.clone(),
            image_path: receipt.image_path.clone(),
            analysis,
            occasion: request.occasion,
        };
        let row = serde_json::to_value(&record)?;

        let insert = self.backend.insert_row(&self.table, row);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(
                    path = ?receipt.image_path,
                    "Signup cancelled during insert; row outcome unknown"
                );
                return Err(SubmissionError::Cancelled);
            }
            result = insert => {
                if let Err(e) = result {
                    match &receipt.image_path {
                        Some(path) => tracing::warn!(
                            path = %path,
                            error = %e,
                            "Signup row not saved; uploaded object orphaned"
                        ),
                        None => tracing::warn!(error = %e, "Signup row not saved"),
                    }
                    return Err(SubmissionError::PersistFailed(e));
                }
            }
        }

        tracing::info!(
            table = %self.table,
            with_image = receipt.image_path.is_some(),
            occasion = ?record.occasion,
            "Signup saved"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::analysis::canned_analysis;
    use crate::backend::MemoryBackend;

    fn photo() -> ImageCandidate {
        ImageCandidate::new("look.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    fn with_image(email: &str) -> SubmissionRequest {
        SubmissionRequest {
            image: Some(photo()),
            ..SubmissionRequest::email_only(email)
        }
    }

    #[tokio::test]
    async fn invalid_email_makes_no_network_call() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());

        let err = pipeline
            .submit(with_image("not-an-email"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::InvalidEmail));
        assert_eq!(backend.network_calls(), 0);
    }

    #[tokio::test]
    async fn failed_upload_skips_insert() {
        let backend = MemoryBackend::new().failing_uploads();
        let pipeline = SubmissionPipeline::new(backend.clone());

        let err = pipeline
            .submit(with_image("a@b.com"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::UploadFailed(_)));
        assert_eq!(backend.upload_calls(), 1);
        assert_eq!(backend.insert_calls(), 0);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn no_image_persists_null_references() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());

        let receipt = pipeline
            .submit(SubmissionRequest::email_only("a@b.com"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(receipt, SubmissionReceipt::default());
        assert_eq!(backend.upload_calls(), 0);
        let rows = backend.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].row["image_url"].is_null());
        assert!(rows[0].row["image_path"].is_null());
    }

    #[tokio::test]
    async fn office_signup_writes_exactly_one_row() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());
        let request = SubmissionRequest {
            occasion: Some(Occasion::Office),
            ..SubmissionRequest::email_only("a@b.com")
        };

        pipeline.submit(request, &CancellationToken::new()).await.unwrap();

        let rows = backend.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].table, "Email");
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
    }

    #[tokio::test]
    async fn image_is_uploaded_before_row_references_it() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());
        let request = SubmissionRequest {
            analysis: Some(canned_analysis(Occasion::Party)),
            occasion: Some(Occasion::Party),
            ..with_image("a@b.com")
        };

        let receipt = pipeline.submit(request, &CancellationToken::new()).await.unwrap();

        let objects = backend.objects();
        assert_eq!(objects.len(), 1);
        let stored = &objects[0];
        assert_eq!(stored.bucket, "outfit-images");
        assert!(stored.path.starts_with("outfit-images/"));
        assert!(stored.path.ends_with(".png"));
        assert_eq!(stored.content_type, "image/png");

        let row = &backend.rows()[0].row;
        assert_eq!(receipt.image_path.as_deref(), Some(stored.path.as_str()));
        assert_eq!(row["image_path"], stored.path.as_str());
        assert_eq!(
            row["image_url"],
            format!("memory://outfit-images/{}", stored.path).as_str()
        );

        let analysis: AnalysisResult =
            serde_json::from_str(row["analysis"].as_str().unwrap()).unwrap();
        assert_eq!(analysis, canned_analysis(Occasion::Party));
    }

    #[tokio::test]
    async fn failed_insert_leaves_uploaded_object() {
        let backend = MemoryBackend::new().failing_inserts();
        let pipeline = SubmissionPipeline::new(backend.clone());

        let err = pipeline
            .submit(with_image("a@b.com"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::PersistFailed(_)));
        assert_eq!(backend.objects().len(), 1);
        assert!(backend.rows().is_empty());
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected() {
        let backend = MemoryBackend::new().with_latency(Duration::from_millis(50));
        let pipeline = SubmissionPipeline::new(backend.clone());
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            pipeline.submit(with_image("a@b.com"), &cancel),
            pipeline.submit(with_image("c@d.com"), &cancel),
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(SubmissionError::AlreadyInFlight)));
        assert_eq!(backend.upload_calls(), 1);
        assert_eq!(backend.rows().len(), 1);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn cancelled_before_start_makes_no_network_call() {
        let backend = MemoryBackend::new();
        let pipeline = SubmissionPipeline::new(backend.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline.submit(with_image("a@b.com"), &cancel).await.unwrap_err();

        assert!(matches!(err, SubmissionError::Cancelled));
        assert_eq!(backend.network_calls(), 0);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn cancel_during_upload_skips_insert() {
        let backend = MemoryBackend::new().with_latency(Duration::from_millis(200));
        let pipeline = SubmissionPipeline::new(backend.clone());
        let cancel = CancellationToken::new();

        let (result, _) = tokio::join!(pipeline.submit(with_image("a@b.com"), &cancel), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        assert!(matches!(result, Err(SubmissionError::Cancelled)));
        assert_eq!(backend.upload_calls(), 1);
        assert!(backend.objects().is_empty());
        assert_eq!(backend.insert_calls(), 0);
    }

    #[tokio::test]
    async fn cancel_during_insert_keeps_uploaded_object() {
        let backend = MemoryBackend::new().with_latency(Duration::from_millis(150));
        let pipeline = SubmissionPipeline::new(backend.clone());
        let cancel = CancellationToken::new();

        let (result, _) = tokio::join!(pipeline.submit(with_image("a@b.com"), &cancel), async {
            tokio::time::sleep(Duration::from_millis(225)).await;
            cancel.cancel();
        });

        assert!(matches!(result, Err(SubmissionError::Cancelled)));
        assert_eq!(backend.objects().len(), 1);
        assert_eq!(backend.insert_calls(), 1);
        assert!(backend.rows().is_empty());
    }

    #[tokio::test]
    async fn custom_targets_are_used() {
        let backend = MemoryBackend::new();
        let config = BackendConfig {
            bucket: "looks".into(),
            table: "Signups".into(),
            ..BackendConfig::new("https://x.example", "k")
        };
        let pipeline = SubmissionPipeline::from_config(backend.clone(), &config);

        pipeline
            .submit(with_image("a@b.com"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(backend.objects()[0].bucket, "looks");
        assert!(backend.objects()[0].path.starts_with("looks/"));
        assert_eq!(backend.rows()[0].table, "Signups");
    }

    #[test]
    fn email_check_only_requires_at_sign() {
        assert!(is_valid_email("a@b"));
        assert!(is_valid_email(" @ "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
    }
}
