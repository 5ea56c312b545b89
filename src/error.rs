use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("GitHub fetch failed: {0}")]
    GithubFetch(String),

    #[error("Medium fetch failed: {0}")]
    MediumFetch(String),

    #[error("Failed to parse Medium RSS: {0}")]
    RssParse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Fixed message surfaced to the client. The underlying cause stays in
    /// the server log only.
    fn client_message(&self) -> &'static str {
        match self {
            AppError::GithubFetch(_) => "GitHub fetch failed",
            AppError::MediumFetch(_) => "Medium fetch failed",
            AppError::RssParse(_) => "Failed to parse Medium RSS",
            AppError::ConfigError(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);

        let body = Json(ErrorResponse {
            error: self.client_message().to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
