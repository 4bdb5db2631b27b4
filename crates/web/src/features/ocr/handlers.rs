use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::WebError;
use crate::state::AppState;

use super::dto::{ProcessResponse, UploadForm};
use super::services;

#[utoipa::path(
    post,
    path = "/api/process",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Text extracted and normalized", body = ProcessResponse),
        (status = 400, description = "Missing, empty or unsupported file"),
        (status = 413, description = "Upload exceeds the body limit"),
        (status = 502, description = "Model call failed or returned no usable JSON")
    ),
    tag = "ocr"
)]
pub async fn process_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Failed to read upload", e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        services::validate_filename(filename.as_deref())?;
        let filename = filename.unwrap_or_default();

        let data = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read file data", e))?;

        let result = services::process_upload(&state.extractor, &filename, &data).await?;

        return Ok(Json(ProcessResponse {
            success: true,
            data: result,
        })
        .into_response());
    }

    tracing::warn!("No file field found in multipart upload");
    Err(WebError::BadRequest("No file provided".to_string()))
}

/// Keeps the body limit rejection as 413; anything else is a bad upload.
fn upload_error(context: &str, error: MultipartError) -> WebError {
    tracing::warn!("{}: {}", context, error);
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        WebError::PayloadTooLarge
    } else {
        WebError::BadRequest(format!("{}: {}", context, error))
    }
}
