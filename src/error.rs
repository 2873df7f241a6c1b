use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::OnceLock;
use thiserror::Error;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Set once at startup, before the server starts handling requests.
pub fn init_debug_mode(debug: bool) {
    let _ = DEBUG_MODE.set(debug);
}

fn debug_mode() -> bool {
    *DEBUG_MODE.get().unwrap_or(&false)
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
    pub message: String,
}

impl utoipa::ToSchema for AppError {
    fn name() -> std::borrow::Cow<'static, str> {
        "ErrorResponse".into()
    }
}

impl utoipa::PartialSchema for AppError {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        <ErrorResponse as utoipa::PartialSchema>::schema()
    }
}

/// Message surfaced to the caller for a 500-class fault. The full detail is
/// always logged; it reaches the response body only in debug mode.
fn fault_message(detail: &str, debug: bool) -> String {
    if debug {
        detail.to_string()
    } else {
        "An unexpected error occurred".to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail, message) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    fault_message(&e.to_string(), debug_mode()),
                )
            }
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "Not found".to_string(),
                "Resource not found".to_string(),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "Validation error".to_string(),
                msg,
            ),
            AppError::Internal(e) => {
                tracing::error!("Unhandled exception: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    fault_message(&e.to_string(), debug_mode()),
                )
            }
        };

        let body = json!({
            "detail": detail,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_message_redacts_by_default() {
        assert_eq!(
            fault_message("connection reset by peer", false),
            "An unexpected error occurred"
        );
    }

    #[test]
    fn fault_message_passes_detail_in_debug_mode() {
        assert_eq!(
            fault_message("connection reset by peer", true),
            "connection reset by peer"
        );
    }
}
