use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::secret_backend::{SecretBackend, SecretData};
use crate::config::Config;
use crate::error::StoreError;

const TOKEN_HEADER: &str = "X-Vault-Token";

/// HashiCorp Vault client for the logical read/write API
#[derive(Clone)]
pub struct VaultClient {
    client: Client,
    address: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct VaultResponse {
    #[serde(default)]
    data: Option<SecretData>,
    #[serde(default)]
    warnings: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct VaultErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

impl VaultClient {
    /// Create a new Vault client
    pub fn new(address: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            address: address.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Create a client from resolved configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.address,
            &config.token,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_start_matches('/'))
    }

    async fn failure(path: &str, response: Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let errors = serde_json::from_str::<VaultErrorResponse>(&body)
            .map(|e| e.errors)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    vec![]
                } else {
                    vec![body.trim().to_string()]
                }
            });

        if status == StatusCode::FORBIDDEN {
            StoreError::PermissionDenied {
                path: path.to_string(),
                errors,
            }
        } else {
            StoreError::Api {
                path: path.to_string(),
                status: status.as_u16(),
                errors,
            }
        }
    }
}

#[async_trait::async_trait]
impl SecretBackend for VaultClient {
    async fn read_secret(&self, path: &str) -> Result<Option<SecretData>, StoreError> {
        let url = self.url(path);
        debug!("Reading secret from: {}", url);

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                url: url.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => {
                debug!("Nothing stored at {}", path);
                return Ok(None);
            }
            status if !status.is_success() => return Err(Self::failure(path, response).await),
            _ => {}
        }

        let vault_response: VaultResponse =
            response.json().await.map_err(|source| StoreError::Decode {
                path: path.to_string(),
                source,
            })?;

        Ok(Some(vault_response.data.unwrap_or_default()))
    }

    async fn write_secret(&self, path: &str, data: &SecretData) -> Result<(), StoreError> {
        let url = self.url(path);
        debug!("Writing secret to: {}", url);

        let response = self
            .client
            .put(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(data)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(Self::failure(path, response).await);
        }

        // Versioned mounts answer with metadata, plain ones with 204
        let body = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<VaultResponse>(&body) {
            for warning in parsed.warnings.unwrap_or_default() {
                warn!("Vault warning for {}: {}", path, warning);
            }
        }

        info!("Successfully wrote secret to {}", path);
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "HashiCorp Vault"
    }
}
