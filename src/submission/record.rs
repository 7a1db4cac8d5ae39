use rand::Rng;
use serde::Serialize;

use crate::config;
use crate::occasion::Occasion;

/// One signup row. Built per attempt and dropped once the calls resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    #[serde(rename = "Email")]
    pub email: String,
    pub image_url: Option<String>,
    pub image_path: Option<String>,
    /// Analysis as JSON text.
    pub analysis: Option<String>,
    pub occasion: Option<Occasion>,
}

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base36 token.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Extension for the stored object: whatever follows the last `.` of the
/// original name, else the media type's usual extension, else `bin`.
///
/// The key goes into a URL path unescaped, so a name extension is only
/// taken when it is plain ASCII alphanumerics.
pub fn file_extension(file_name: &str, media_type: &str) -> String {
    if let Some((_, ext)) = file_name.rsplit_once('.') {
        if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return ext.to_string();
        }
    }
    let known = match media_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    };
    known
        .or_else(|| {
            mime_guess::get_mime_extensions_str(media_type).and_then(|exts| exts.first().copied())
        })
        .unwrap_or("bin")
        .to_string()
}

/// `{epoch-millis}-{token}.{ext}`
pub fn object_key_with(epoch_millis: i64, token: &str, ext: &str) -> String {
    format!("{epoch_millis}-{token}.{ext}")
}

/// Fresh unique key for an uploaded image.
pub fn object_key(file_name: &str, media_type: &str) -> String {
    object_key_with(
        chrono::Utc::now().timestamp_millis(),
        &random_token(config::KEY_TOKEN_LEN),
        &file_extension(file_name, media_type),
    )
}

/// Path of the object inside its bucket, as persisted in `image_path`.
pub fn object_path(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}
