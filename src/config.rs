use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "StyleAI";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage bucket holding uploaded outfit photos.
pub const IMAGE_BUCKET: &str = "outfit-images";

/// Table receiving one row per email signup.
pub const SIGNUP_TABLE: &str = "Email";

/// JPEG quality for camera stills (0-100).
pub const JPEG_QUALITY: u8 = 80;

/// Length of the random base36 token in generated object keys.
pub const KEY_TOKEN_LEN: usize = 11;

/// Advertised upload limit shown to the user. Not enforced.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024; // 10MB

const ENV_BACKEND_URL: &str = "STYLEAI_SUPABASE_URL";
const ENV_BACKEND_KEY: &str = "STYLEAI_SUPABASE_ANON_KEY";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "styleai_lib=debug"
    } else {
        "styleai_lib=info"
    }
}

/// Starting directory for the native image picker.
/// Falls back to the home directory when the platform has no pictures folder.
pub fn pictures_dir() -> Option<PathBuf> {
    dirs::picture_dir().or_else(dirs::home_dir)
}

/// Connection settings for the hosted storage + database backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
    pub bucket: String,
    pub table: String,
}

impl BackendConfig {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
            bucket: IMAGE_BUCKET.to_string(),
            table: SIGNUP_TABLE.to_string(),
        }
    }

    /// Read `STYLEAI_SUPABASE_URL` / `STYLEAI_SUPABASE_ANON_KEY`.
    ///
    /// Returns `None` when no URL is configured; callers fall back to the
    /// in-memory backend.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var(ENV_BACKEND_URL)
            .ok()
            .filter(|u| !u.trim().is_empty())?;
        let key = std::env::var(ENV_BACKEND_KEY).unwrap_or_default();
        if key.is_empty() {
            tracing::warn!("{ENV_BACKEND_KEY} is not set; backend requests will be anonymous");
        }
        Some(Self::new(&url, &key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_styleai() {
        assert_eq!(APP_NAME, "StyleAI");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn backend_config_strips_trailing_slash() {
        let config = BackendConfig::new(" https://demo.supabase.co/ ", " key ");
        assert_eq!(config.base_url, "https://demo.supabase.co");
        assert_eq!(config.anon_key, "key");
        assert_eq!(config.bucket, "outfit-images");
        assert_eq!(config.table, "Email");
    }

    #[test]
    fn log_filter_targets_this_crate() {
        assert!(default_log_filter().starts_with("styleai_lib="));
    }
}
