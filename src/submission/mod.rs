//! Email signup submission: validate, upload the photo, persist the row.

pub mod dialog;
pub mod pipeline;
pub mod record;

pub use dialog::*;
pub use pipeline::*;
pub use record::*;

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Email address must contain '@'")]
    InvalidEmail,

    #[error("Image upload failed: {0}")]
    UploadFailed(#[source] BackendError),

    /// The row was not written. Any photo uploaded for it stays orphaned.
    #[error("Signup could not be saved: {0}")]
    PersistFailed(#[source] BackendError),

    #[error("A submission is already in flight")]
    AlreadyInFlight,

    #[error("Submission cancelled")]
    Cancelled,

    #[error("Analysis could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}
