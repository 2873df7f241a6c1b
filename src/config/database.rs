use super::settings::Settings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Build the connection pool from resolved settings. Checkout of a session
/// blocks until a connection frees up or the connect timeout hits; every
/// session goes back to the pool on drop regardless of how the handler exits.
pub async fn connect(settings: &Settings) -> Result<DatabaseConnection, DbErr> {
    let url = settings.database_connection_string.as_deref().ok_or_else(|| {
        DbErr::Custom("database connection string is not configured".to_string())
    })?;

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(settings.db_max_connections)
        .min_connections(settings.db_min_connections)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(settings.debug);

    Database::connect(opt).await
}
