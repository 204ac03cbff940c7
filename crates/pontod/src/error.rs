//! HTTP error mapping.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ponto_store::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::workflow::WorkflowError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Upload larger than the configured body limit.
    #[error("upload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Workflow(err) => match err {
                WorkflowError::NoFaceDetected
                | WorkflowError::NotEnrolled(_)
                | WorkflowError::RecognitionFailed { .. }
                | WorkflowError::InvalidImage(_)
                | WorkflowError::IncompatibleEmbedding { .. } => StatusCode::BAD_REQUEST,
                WorkflowError::IdentityNotFound(_) => StatusCode::NOT_FOUND,
                WorkflowError::DuplicateIdentity(_) => StatusCode::CONFLICT,
                WorkflowError::EmbeddingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                WorkflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::Workflow(err) => match err {
                WorkflowError::NoFaceDetected => "NO_FACE_DETECTED",
                WorkflowError::IdentityNotFound(_) => "IDENTITY_NOT_FOUND",
                WorkflowError::NotEnrolled(_) => "NOT_ENROLLED",
                WorkflowError::RecognitionFailed { .. } => "RECOGNITION_FAILED",
                WorkflowError::InvalidImage(_) => "INVALID_IMAGE",
                WorkflowError::IncompatibleEmbedding { .. } => "INCOMPATIBLE_EMBEDDING",
                WorkflowError::DuplicateIdentity(_) => "DUPLICATE_IDENTITY",
                WorkflowError::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
                WorkflowError::Storage(_) => "STORAGE_FAILURE",
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Workflow(WorkflowError::RecognitionFailed { score, event_id }) => {
                Some(serde_json::json!({ "score": score, "event_id": event_id }))
            }
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Workflow(err.into())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge {
                message: err.body_text(),
            }
        } else {
            ApiError::validation(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
