use crate::models::{PositionError, RouteEndpoint};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Navigation impossible here: {endpoint} is outside the zone")]
    ZoneViolation { endpoint: RouteEndpoint },

    #[error("Routing provider error: {0}")]
    RoutingProvider(String),

    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Navigation request superseded by a newer one")]
    Superseded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_message) = match self {
            AppError::ZoneViolation { endpoint } => {
                tracing::info!(endpoint = %endpoint, "Navigation refused: {}", message);
                let body = Json(json!({
                    "error": "Zone violation",
                    "message": message,
                    "endpoint": endpoint,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::RoutingProvider(ref e) => {
                tracing::error!("Routing provider error escaped acquisition: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error")
            }
            AppError::Position(ref e) => {
                tracing::info!(code = e.code(), "Position error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, e.user_message())
            }
            AppError::Storage(ref e) => {
                tracing::warn!("Storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error")
            }
            AppError::Superseded => {
                tracing::debug!("Navigation request superseded");
                (StatusCode::CONFLICT, message.as_str())
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::NotFound(ref e) => (StatusCode::NOT_FOUND, e.as_str()),
            AppError::Config(ref e) => {
                tracing::error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error")
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
