//! Error types for the server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::PlumageError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("No image part in the request")]
    NoImagePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Model or labels not loaded properly")]
    NotLoaded,

    #[error("Failed to process image: {0}")]
    Processing(#[from] PlumageError),

    #[error("{0}")]
    Upload(#[from] MultipartError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NoImagePart | ServerError::NoSelectedFile => StatusCode::BAD_REQUEST,
            ServerError::NotLoaded | ServerError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Upload(e) => e.status(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::Upload(e) => e.body_text(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), detail = %message, "Upload failed");
        } else {
            tracing::debug!(status = status.as_u16(), detail = %message, "Upload rejected");
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_400() {
        assert_eq!(ServerError::NoImagePart.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServerError::NoSelectedFile.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_processing_message_embeds_cause() {
        let err = ServerError::from(PlumageError::InferenceError("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to process image: Inference error: boom");
    }

    #[test]
    fn test_not_loaded_message() {
        assert_eq!(
            ServerError::NotLoaded.to_string(),
            "Model or labels not loaded properly"
        );
        assert_eq!(ServerError::NotLoaded.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
