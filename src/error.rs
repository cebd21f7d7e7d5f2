use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Notice;

pub const VALIDATION_MESSAGE: &str = "Please fill in all required fields";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },
    #[error("OPENROUTER_API_KEY is not configured")]
    MissingApiKey,
    #[error("API error ({status}): {message}")]
    Api { message: String, status: u16, body: String },
    #[error("Invalid API response format")]
    MalformedResponse,
    #[error("network error: {0}")]
    Network(String),
    #[error("A script is already being generated")]
    Busy,
}

impl GenerationError {
    /// Text shown to the user in the error toast.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation { .. } => VALIDATION_MESSAGE.to_string(),
            GenerationError::Busy => self.to_string(),
            GenerationError::Api { message, .. } => format!("Failed to generate script: {}", message),
            GenerationError::MissingApiKey => "Failed to generate script: the completion service is not configured".to_string(),
            GenerationError::MalformedResponse => "Failed to generate script: Invalid API response format".to_string(),
            GenerationError::Network(_) => "Failed to generate script: could not reach the completion service".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GenerationError::Validation { .. } => StatusCode::BAD_REQUEST,
            GenerationError::Busy => StatusCode::CONFLICT,
            GenerationError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::Api { .. } | GenerationError::MalformedResponse | GenerationError::Network(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-out failed: {0}")]
    SignOut(String),
}

/// Errors surfaced by HTTP handlers. Each one renders as a notice the UI can toast.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("script session {0} not found")]
    NotFound(Uuid),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, notice) = match &self {
            AppError::Generation(e) => (e.status(), Notice::error(e.user_message())),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, Notice::error("Script not found")),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, Notice::error("Invalid request body")),
            AppError::Auth(_) => (StatusCode::INTERNAL_SERVER_ERROR, Notice::error("Failed to sign out")),
        };
        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        } else {
            tracing::warn!("⚠️ {}", self);
        }
        (status, Json(json!({ "error": self.to_string(), "notice": notice }))).into_response()
    }
}
