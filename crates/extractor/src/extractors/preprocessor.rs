use crate::error::OcrError;
use base64::Engine;
use std::path::Path;

type Result<T> = std::result::Result<T, OcrError>;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub struct Preprocessor;

impl Preprocessor {
    /// Checks the text after the last `.`, so a bare `.png` counts as a
    /// png file while `png` with no dot does not.
    pub fn is_allowed_file(filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| {
                ALLOWED_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
            .unwrap_or(false)
    }

    pub fn encode_base64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    pub async fn read_image_as_base64(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let base64 = Self::encode_base64(&bytes);
        tracing::info!(
            "Read image file: {} ({} bytes, {} base64)",
            path.display(),
            bytes.len(),
            base64.len()
        );
        Ok(base64)
    }

    /// Guesses the image MIME type from the leading base64 characters,
    /// falling back to JPEG.
    pub fn mime_from_base64(image_base64: &str) -> &'static str {
        if image_base64.starts_with("iVBORw0KGgo") {
            "image/png"
        } else if image_base64.starts_with("/9j/") {
            "image/jpeg"
        } else if image_base64.starts_with("UklGR") {
            "image/webp"
        } else if image_base64.starts_with("R0lGOD") {
            "image/gif"
        } else {
            "image/jpeg"
        }
    }
}
