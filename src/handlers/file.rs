// src/handlers/file.rs

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};

use crate::{
    error::AppError,
    models::file_attachment::UploadResponse,
    services::file::{self, ATTACHMENT_MAX_BYTES, NO_ATTACHMENT},
    state::AppState,
};

const FILE_FIELD: &str = "file";

/// Uploads a hoax attachment from the multipart field `file`.
///
/// Files over 5MB are rejected. A request without a file answers `{id: 0}`.
pub async fn upload_attachment(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Ok(mut multipart) = multipart else {
        return Ok(Json(UploadResponse { id: NO_ATTACHMENT }));
    };

    let mut bytes = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let data = field.bytes().await.map_err(multipart_error)?;
        if data.len() > ATTACHMENT_MAX_BYTES {
            return Err(AppError::FileSizeLimitExceeded);
        }
        bytes = Some(data);
        break;
    }

    let id = file::save_attachment(&state.pool, &state.config, bytes.as_deref()).await?;
    Ok(Json(UploadResponse { id }))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileSizeLimitExceeded
    } else {
        tracing::debug!("Malformed multipart upload: {}", err);
        AppError::BadRequest("invalid_request")
    }
}
