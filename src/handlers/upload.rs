// handlers/upload.rs - POST /upload handler

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use serde::Serialize;
use tracing::error;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub msg: &'static str,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// Persist the image part of a multipart form under the upload directory.
/// Every parse or filesystem failure answers with the same generic 500.
pub async fn image_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResponse> {
    let multipart = multipart.map_err(|rejection| {
        error!("Failed to parse upload form: {}", rejection.body_text());
        ApiError::internal_server_error("Server error")
    })?;

    let stored = state.uploads.store(multipart).await.map_err(|e| {
        error!("Failed to store upload: {}", e);
        ApiError::internal_server_error("Server error")
    })?;

    Ok(ApiResponse::success(UploadResponse {
        msg: "Image uploaded successfully",
        file_name: stored.file_name,
    }))
}
