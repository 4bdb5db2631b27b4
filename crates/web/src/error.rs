use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use extractor::OcrError;
use serde_json::json;
use std::fmt;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Ocr(OcrError),
    BadRequest(String),
    PayloadTooLarge,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ocr(e) => write!(f, "OCR error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::PayloadTooLarge => write!(f, "Payload too large"),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Self::Ocr(OcrError::Extraction(_) | OcrError::Gateway(_)) => StatusCode::BAD_GATEWAY,
            Self::Ocr(OcrError::EmptyImage) => StatusCode::BAD_REQUEST,
            Self::Ocr(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        };

        let body = match &self {
            Self::Ocr(e @ (OcrError::Extraction(_) | OcrError::Gateway(_))) => {
                tracing::warn!("Image processing failed: {}", e);
                json!({
                    "error": format!("Error processing image: {}", e)
                })
            }
            Self::Ocr(OcrError::EmptyImage) => {
                json!({
                    "error": "Uploaded file is empty"
                })
            }
            Self::Ocr(e) => {
                tracing::error!("OCR error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::PayloadTooLarge => {
                json!({
                    "error": "Uploaded file is too large"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<OcrError> for WebError {
    fn from(error: OcrError) -> Self {
        Self::Ocr(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;
