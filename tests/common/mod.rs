#![allow(dead_code)]

use reporting_api::config::{Environment, Settings};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
    });
}

pub fn test_settings() -> Settings {
    Settings {
        app_name: "Incident Reporting API".to_string(),
        api_version: "v1".to_string(),
        environment: Environment::Development,
        debug: false,
        key_vault_name: "integration-test-vault".to_string(),
        azure_tenant_id: None,
        azure_client_id: None,
        azure_client_secret: None,
        database_connection_string: None,
        blob_storage_connection_string: None,
        secret_key: None,
        blob_container_name: "report-attachments".to_string(),
        access_token_expire_minutes: 30,
        allowed_origins: vec![],
        // Disabled so tests are not throttled
        rate_limit_per_minute: 0,
        db_max_connections: 5,
        db_min_connections: 1,
    }
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub settings: Arc<Settings>,
}

async fn always_fails() -> reporting_api::AppResult<axum::Json<serde_json::Value>> {
    Err(reporting_api::AppError::Internal(anyhow::anyhow!(
        "synthetic handler fault"
    )))
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let mut settings = test_settings();
    settings.database_connection_string = Some(database_url.clone());
    let settings = Arc::new(settings);

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        reporting_api::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    let app = axum::Router::new()
        .merge(reporting_api::routes::create_routes(&settings))
        .route("/boom", axum::routing::get(always_fails))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(settings.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        settings,
    }
}
