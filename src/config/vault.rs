use super::settings::{Environment, Settings};
use reqwest::StatusCode;
use serde::Deserialize;
use std::future::Future;
use thiserror::Error;
use tokio::sync::OnceCell;

const VAULT_API_VERSION: &str = "7.4";
const AAD_SCOPE: &str = "https://vault.azure.net/.default";
const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// The fixed set of vault secrets and the settings field each one populates.
const SECRET_MAPPINGS: [(&str, fn(&mut Settings, String)); 3] = [
    ("database-connection-string", |s, v| {
        s.database_connection_string = Some(v)
    }),
    ("blob-storage-connection-string", |s, v| {
        s.blob_storage_connection_string = Some(v)
    }),
    ("jwt-secret-key", |s, v| s.secret_key = Some(v)),
];

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("secret '{0}' not found")]
    NotFound(String),

    #[error("vault returned {status} for secret '{name}'")]
    Status { name: String, status: StatusCode },
}

/// Credential strategy, chosen exactly once at startup. Explicit
/// service-principal credentials apply only in development and only when the
/// full triple is present; everything else uses the host's managed identity.
/// There is no fallback chaining between the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultCredential {
    Explicit {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    Ambient,
}

impl VaultCredential {
    pub fn select(settings: &Settings) -> Self {
        if settings.environment == Environment::Development {
            if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
                settings.azure_tenant_id.clone(),
                settings.azure_client_id.clone(),
                settings.azure_client_secret.clone(),
            ) {
                return VaultCredential::Explicit {
                    tenant_id,
                    client_id,
                    client_secret,
                };
            }
        }
        VaultCredential::Ambient
    }
}

/// Seam between the secret-merge logic and the actual vault transport.
pub trait SecretStore {
    fn get_secret(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<String, SecretError>> + Send;
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}

/// Azure Key Vault REST client. The bearer token is acquired lazily on the
/// first secret read so that an unreachable vault surfaces as per-secret
/// failures rather than a constructor error.
pub struct KeyVaultClient {
    http: reqwest::Client,
    vault_url: String,
    credential: VaultCredential,
    token: OnceCell<String>,
}

impl KeyVaultClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            vault_url: format!("https://{}.vault.azure.net", settings.key_vault_name),
            credential: VaultCredential::select(settings),
            token: OnceCell::new(),
        }
    }

    async fn bearer_token(&self) -> Result<&str, SecretError> {
        self.token
            .get_or_try_init(|| Self::acquire_token(&self.http, &self.credential))
            .await
            .map(String::as_str)
    }

    async fn acquire_token(
        http: &reqwest::Client,
        credential: &VaultCredential,
    ) -> Result<String, SecretError> {
        let response = match credential {
            VaultCredential::Explicit {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let url = format!(
                    "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                    tenant_id
                );
                http.post(&url)
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("scope", AAD_SCOPE),
                    ])
                    .send()
                    .await?
            }
            VaultCredential::Ambient => {
                http.get(IMDS_TOKEN_URL)
                    .query(&[
                        ("api-version", "2018-02-01"),
                        ("resource", "https://vault.azure.net"),
                    ])
                    .header("Metadata", "true")
                    .send()
                    .await?
            }
        };

        if !response.status().is_success() {
            return Err(SecretError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let reply: TokenReply = response.json().await?;
        Ok(reply.access_token)
    }
}

impl SecretStore for KeyVaultClient {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/secrets/{}", self.vault_url, name);
        let response = self
            .http
            .get(&url)
            .query(&[("api-version", VAULT_API_VERSION)])
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SecretError::NotFound(name.to_string())),
            status if !status.is_success() => Err(SecretError::Status {
                name: name.to_string(),
                status,
            }),
            _ => {
                let bundle: SecretBundle = response.json().await?;
                Ok(bundle.value)
            }
        }
    }
}

/// Fetch the fixed set of secrets and merge them into settings. Best-effort
/// outside production: a failed fetch leaves the field unset and the next
/// secret is attempted. In production a missing secret aborts startup.
/// No retries, no rollback of already-merged secrets.
pub async fn resolve_secrets<S: SecretStore>(
    settings: &mut Settings,
    store: &S,
) -> anyhow::Result<()> {
    for (name, apply) in SECRET_MAPPINGS {
        match store.get_secret(name).await {
            Ok(value) => {
                tracing::info!("Loaded secret: {}", name);
                apply(settings, value);
            }
            Err(e) => {
                tracing::error!("Failed to load secret '{}': {}", name, e);
                if settings.environment == Environment::Production {
                    return Err(anyhow::anyhow!(
                        "missing required production secret '{}': {}",
                        name,
                        e
                    ));
                }
            }
        }
    }
    Ok(())
}

fn needs_resolution(settings: &Settings) -> bool {
    settings.database_connection_string.is_none()
}

/// One-shot secret bootstrap, called from `main` before anything else reads
/// the secret-backed fields. Skipped entirely when the database connection
/// string was supplied directly through the environment.
pub async fn load_secrets(settings: &mut Settings) -> anyhow::Result<()> {
    if !needs_resolution(settings) {
        tracing::debug!("Database connection string already set, skipping Key Vault");
        return Ok(());
    }

    let client = KeyVaultClient::new(settings);
    resolve_secrets(settings, &client).await
}
