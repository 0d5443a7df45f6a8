//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::PlumageError;

use super::error::{Result, ServerError};
use super::state::AppState;

/// Multipart field carrying the upload
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub prediction: String,
}

/// Find the first file part named `image` and return its filename and bytes.
///
/// A part only counts as a file when it carries a `filename` parameter;
/// a plain form value named `image` is ignored.
async fn read_image_part(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ServerError::NoImagePart),
            // size limits and read failures keep their own status
            Err(e) if e.status() != StatusCode::BAD_REQUEST => return Err(ServerError::Upload(e)),
            Err(e) => {
                debug!(error = %e, "Malformed multipart body");
                return Err(ServerError::NoImagePart);
            }
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.is_empty() {
            return Err(ServerError::NoSelectedFile);
        }

        let data = field.bytes().await?;
        return Ok((file_name, data.to_vec()));
    }
}

/// `POST /api/upload`: classify an uploaded image
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Request is not multipart");
        ServerError::NoImagePart
    })?;

    let (file_name, data) = read_image_part(&mut multipart).await?;

    if !state.engine.is_ready() {
        return Err(ServerError::NotLoaded);
    }

    info!(file_name = %file_name, bytes = data.len(), "Received image");

    let worker_state = Arc::clone(&state);
    let prediction = tokio::task::spawn_blocking(move || worker_state.engine.classify(&data))
        .await
        .map_err(|e| PlumageError::InferenceError(e.to_string()))??;

    info!(
        file_name = %file_name,
        prediction = %prediction.label,
        index = prediction.index,
        "Image detected"
    );

    Ok(Json(UploadResponse {
        message: "Image uploaded and detected successfully",
        prediction: prediction.label,
    }))
}

/// `GET /api/health`
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.health())
}
