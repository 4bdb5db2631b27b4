use extractor::ExtractionResult;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    pub success: bool,
    pub data: ExtractionResult,
}

/// Multipart body of `POST /api/process`
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// PNG, JPG, JPEG or WEBP image
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
