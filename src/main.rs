use anyhow::Context;
use axum::{extract::Extension, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use reporting_api::config::{self, Settings};
use reporting_api::{error, migration, routes};

#[derive(OpenApi)]
#[openapi(
    paths(
        reporting_api::handlers::meta::health_check,
        reporting_api::handlers::meta::root,
    ),
    components(schemas(reporting_api::error::AppError)),
    tags(
        (name = "meta", description = "Service metadata endpoints"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let mut settings = Settings::from_env()?;

    let default_filter = if settings.debug {
        "reporting_api=debug,tower_http=debug,axum=debug"
    } else {
        "reporting_api=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    error::init_debug_mode(settings.debug);

    tracing::info!(
        "Starting {} v{} in {} environment",
        settings.app_name,
        env!("CARGO_PKG_VERSION"),
        settings.environment
    );

    // One-shot secret bootstrap; no-op when the connection string came in
    // through the environment.
    config::vault::load_secrets(&mut settings).await?;

    let settings = Arc::new(settings);

    let db = config::database::connect(&settings)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None)
        .await
        .context("Failed to apply database migrations")?;
    tracing::info!("Database migrations applied successfully");

    verify_database(&db)
        .await
        .context("Database unreachable at startup. Shutting down")?;
    tracing::info!("Database connectivity verified");

    let app = create_app(&settings)
        .layer(Extension(db.clone()))
        .layer(Extension(settings.clone()));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db.close().await?;
    tracing::info!("Connection pool disposed, server shut down gracefully");
    Ok(())
}

/// Lightweight ping so the process refuses to serve with an unreachable
/// database.
async fn verify_database(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1".to_string(),
    ))
    .await
    .map(|_| ())
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(origins)
}

fn create_app(settings: &Settings) -> Router {
    Router::new()
        .merge(routes::create_routes(settings))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(settings))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
