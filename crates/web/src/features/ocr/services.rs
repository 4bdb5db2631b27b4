use extractor::{
    ExtractionResult, ImageExtractor,
    extractors::preprocessor::{ALLOWED_EXTENSIONS, Preprocessor},
};

use crate::error::{WebError, WebResult};

/// Checks the uploaded filename before any bytes are sent upstream.
pub fn validate_filename(filename: Option<&str>) -> WebResult<()> {
    let filename = match filename {
        Some(name) if !name.is_empty() => name,
        _ => return Err(WebError::BadRequest("No file selected".to_string())),
    };

    if !Preprocessor::is_allowed_file(filename) {
        return Err(WebError::BadRequest(format!(
            "File type not allowed. Allowed types: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    Ok(())
}

pub async fn process_upload(
    extractor: &ImageExtractor,
    filename: &str,
    bytes: &[u8],
) -> WebResult<ExtractionResult> {
    tracing::info!("Processing upload '{}' ({} bytes)", filename, bytes.len());
    Ok(extractor.extract_from_bytes(bytes).await?)
}
