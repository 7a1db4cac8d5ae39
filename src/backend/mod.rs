//! Hosted storage + database collaborators.
//!
//! `ObjectStorage` holds uploaded photos, `RecordStore` receives signup rows.
//! `SupabaseClient` talks to the hosted backend over HTTP; `MemoryBackend`
//! keeps everything in-process.

pub mod memory;
pub mod supabase;

pub use memory::*;
pub use supabase::*;

use std::future::Future;

use thiserror::Error;

use crate::config::BackendConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unreachable at {0}")]
    Connection(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Simulated failure: {0}")]
    Simulated(String),
}

/// Binary object storage.
pub trait ObjectStorage: Send + Sync {
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Public URL of a stored object. Pure string construction.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Structured row persistence.
pub trait RecordStore: Send + Sync {
    fn insert_row(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Backend chosen at startup.
pub enum ConfiguredBackend {
    Supabase(SupabaseClient),
    Memory(MemoryBackend),
}

impl ConfiguredBackend {
    /// Hosted backend when configured, otherwise in-memory.
    pub fn from_config(config: Option<&BackendConfig>) -> Result<Self, BackendError> {
        match config {
            Some(config) => Ok(Self::Supabase(SupabaseClient::new(config)?)),
            None => {
                tracing::warn!("No backend configured; signups are kept in memory only");
                Ok(Self::Memory(MemoryBackend::new()))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Supabase(_) => "supabase",
            Self::Memory(_) => "memory",
        }
    }
}

impl ObjectStorage for ConfiguredBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        match self {
            Self::Supabase(client) => client.upload(bucket, path, bytes, content_type).await,
            Self::Memory(memory) => memory.upload(bucket, path, bytes, content_type).await,
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        match self {
            Self::Supabase(client) => client.public_url(bucket, path),
            Self::Memory(memory) => memory.public_url(bucket, path),
        }
    }
}

impl RecordStore for ConfiguredBackend {
    async fn insert_row(&self, table: &str, row: serde_json::Value) -> Result<(), BackendError> {
        match self {
            Self::Supabase(client) => client.insert_row(table, row).await,
            Self::Memory(memory) => memory.insert_row(table, row).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_memory() {
        let backend = ConfiguredBackend::from_config(None).unwrap();
        assert_eq!(backend.kind(), "memory");
    }

    #[test]
    fn config_selects_supabase() {
        let config = BackendConfig::new("https://demo.supabase.co", "anon");
        let backend = ConfiguredBackend::from_config(Some(&config)).unwrap();
        assert_eq!(backend.kind(), "supabase");
        assert_eq!(
            backend.public_url("outfit-images", "outfit-images/a.jpg"),
            "https://demo.supabase.co/storage/v1/object/public/outfit-images/outfit-images/a.jpg"
        );
    }
}
