use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BackendError, ObjectStorage, RecordStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertedRow {
    pub table: String,
    pub row: serde_json::Value,
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: Vec<StoredObject>,
    rows: Vec<InsertedRow>,
    upload_calls: usize,
    insert_calls: usize,
}

/// In-process backend. Clones share storage, so a test can keep one handle
/// while the pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    fail_uploads: bool,
    fail_inserts: bool,
    latency: Option<Duration>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    /// Delay every call, to hold a request in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.state.lock().map(|s| s.objects.clone()).unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<InsertedRow> {
        self.state.lock().map(|s| s.rows.clone()).unwrap_or_default()
    }

    pub fn upload_calls(&self) -> usize {
        self.state.lock().map(|s| s.upload_calls).unwrap_or(0)
    }

    pub fn insert_calls(&self) -> usize {
        self.state.lock().map(|s| s.insert_calls).unwrap_or(0)
    }

    /// Upload plus insert attempts.
    pub fn network_calls(&self) -> usize {
        self.upload_calls() + self.insert_calls()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, BackendError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BackendError::Simulated("memory backend lock poisoned".into()))?;
        Ok(f(&mut state))
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl ObjectStorage for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        self.with_state(|s| s.upload_calls += 1)?;
        self.simulate_latency().await;
        if self.fail_uploads {
            return Err(BackendError::Simulated(format!("upload of {path} rejected")));
        }
        self.with_state(|s| {
            s.objects.push(StoredObject {
                bucket: bucket.to_string(),
                path: path.to_string(),
                content_type: content_type.to_string(),
                bytes,
            })
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

impl RecordStore for MemoryBackend {
    async fn insert_row(&self, table: &str, row: serde_json::Value) -> Result<(), BackendError> {
        self.with_state(|s| s.insert_calls += 1)?;
        self.simulate_latency().await;
        if self.fail_inserts {
            return Err(BackendError::Simulated(format!("insert into {table} rejected")));
        }
        self.with_state(|s| {
            s.rows.push(InsertedRow {
                table: table.to_string(),
                row,
            })
        })
    }
}
