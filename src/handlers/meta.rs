use crate::config::Settings;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde_json::json;
use std::sync::Arc;

/// Lightweight health check for load balancers and monitoring. Always
/// answers 200; a failed database round-trip downgrades the status field.
#[utoipa::path(
    get,
    path = "/health",
    tag = "meta",
    responses(
        (status = 200, description = "Service identity and health status", body = serde_json::Value)
    )
)]
pub async fn health_check(
    Extension(db): Extension<DatabaseConnection>,
    Extension(settings): Extension<Arc<Settings>>,
) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": settings.app_name,
        "version": settings.api_version,
        "environment": settings.environment.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses(
        (status = 200, description = "Welcome payload", body = serde_json::Value)
    )
)]
pub async fn root(Extension(settings): Extension<Arc<Settings>>) -> impl IntoResponse {
    Json(json!({
        "message": format!("Welcome to the {}", settings.app_name),
        "version": settings.api_version,
        "docs": "/swagger-ui",
    }))
}
