use anyhow::{anyhow, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Deployment environment tag. Unknown values are rejected at startup
/// instead of being silently treated as development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// Application settings, built once from the environment at process start.
/// The secret-backed fields start out `None` and are filled exactly once by
/// the Key Vault bootstrap; after that the struct is frozen behind an `Arc`
/// and only read.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub api_version: String,
    pub environment: Environment,
    pub debug: bool,

    // Azure Key Vault
    pub key_vault_name: String,
    pub azure_tenant_id: Option<String>,
    pub azure_client_id: Option<String>,
    pub azure_client_secret: Option<String>,

    // Loaded from Key Vault unless supplied directly
    pub database_connection_string: Option<String>,
    pub blob_storage_connection_string: Option<String>,
    pub secret_key: Option<String>,

    pub blob_container_name: String,
    pub access_token_expire_minutes: u64,
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_minute: u32,

    // Connection pool: min holds the base pool, max adds burst headroom
    pub db_max_connections: u32,
    pub db_min_connections: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let key_vault_name = env::var("AZURE_KEY_VAULT_NAME")
            .map_err(|_| anyhow!("AZURE_KEY_VAULT_NAME environment variable must be set"))?;

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .parse::<Environment>()
            .map_err(|e| anyhow!("Invalid ENVIRONMENT: {}", e))?;

        Ok(Self {
            app_name: env::var("APP_NAME")
                .unwrap_or_else(|_| "Incident Reporting API".to_string()),
            api_version: "v1".to_string(),
            environment,
            debug: parse_bool_env("DEBUG", false),
            key_vault_name,
            azure_tenant_id: env::var("AZURE_TENANT_ID").ok(),
            azure_client_id: env::var("AZURE_CLIENT_ID").ok(),
            azure_client_secret: env::var("AZURE_CLIENT_SECRET").ok(),
            database_connection_string: env::var("DATABASE_CONNECTION_STRING").ok(),
            blob_storage_connection_string: env::var("BLOB_STORAGE_CONNECTION_STRING").ok(),
            secret_key: None,
            blob_container_name: env::var("BLOB_CONTAINER_NAME")
                .unwrap_or_else(|_| "report-attachments".to_string()),
            access_token_expire_minutes: parse_num_env("ACCESS_TOKEN_EXPIRE_MINUTES", 30),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origin_list(&raw))
                .unwrap_or_else(|_| default_origins()),
            rate_limit_per_minute: parse_num_env("RATE_LIMIT_PER_MINUTE", 60),
            db_max_connections: parse_num_env("DB_MAX_CONNECTIONS", 30),
            db_min_connections: parse_num_env("DB_MIN_CONNECTIONS", 10),
        })
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:8080".to_string(),
    ]
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn parse_num_env<T: FromStr>(var_name: &str, default: T) -> T {
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
