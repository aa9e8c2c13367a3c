//! Azure credential acquisition with auto-negotiating dual-mode (env + CLI)

use async_trait::async_trait;
use kvdiff_secrets::SecretError;
use serde::Deserialize;
use tokio::process::Command;

/// Default Microsoft Entra authority for the client-credentials flow.
const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Provides bearer tokens for an Azure resource.
///
/// The Key Vault store takes this as an injected dependency so tests can
/// substitute a [`StaticTokenCredential`] for the real credential chain.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquire a bearer token scoped to `resource`
    /// (e.g. `https://vault.azure.net`).
    async fn get_token(&self, resource: &str) -> Result<String, SecretError>;
}

/// Token response from the client-credentials flow.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Token response from `az account get-access-token`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzCliToken {
    access_token: String,
}

/// Ambient Azure credential chain.
///
/// Mode is auto-negotiated based on environment:
/// - If `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET` are
///   set → client-credentials flow against the Entra token endpoint
/// - Otherwise → the `az` CLI (`az account get-access-token`)
pub struct AzureCredential {
    http: reqwest::Client,
    authority: String,
}

impl std::fmt::Debug for AzureCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredential")
            .field(
                "mode",
                &if Self::env_credentials_available() {
                    "client-credentials"
                } else {
                    "az-cli"
                },
            )
            .finish()
    }
}

impl Default for AzureCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCredential {
    /// Create a credential using the default Entra authority.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
        }
    }

    /// Create a credential against an explicit authority base URL.
    ///
    /// Used by tests to point the client-credentials flow at a mock
    /// token endpoint.
    #[must_use]
    pub fn with_authority(authority: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority: authority.into(),
        }
    }

    /// Check if service-principal credentials are present in environment
    fn env_credentials_available() -> bool {
        std::env::var("AZURE_TENANT_ID").is_ok()
            && std::env::var("AZURE_CLIENT_ID").is_ok()
            && std::env::var("AZURE_CLIENT_SECRET").is_ok()
    }

    /// Client-credentials flow against the Entra token endpoint.
    async fn token_from_env(&self, resource: &str) -> Result<String, SecretError> {
        let auth_err = |message: String| SecretError::AuthFailed {
            store: "azure".to_string(),
            message,
        };

        let tenant = std::env::var("AZURE_TENANT_ID")
            .map_err(|_| auth_err("AZURE_TENANT_ID not set".to_string()))?;
        let client_id = std::env::var("AZURE_CLIENT_ID")
            .map_err(|_| auth_err("AZURE_CLIENT_ID not set".to_string()))?;
        let client_secret = std::env::var("AZURE_CLIENT_SECRET")
            .map_err(|_| auth_err("AZURE_CLIENT_SECRET not set".to_string()))?;

        let url = format!("{}/{tenant}/oauth2/v2.0/token", self.authority);
        let scope = format!("{resource}/.default");

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| auth_err(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(auth_err(format!("token endpoint returned {status}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_err(format!("invalid token response: {e}")))?;

        Ok(token.access_token)
    }

    /// Fallback: ask the `az` CLI for a token.
    async fn token_from_cli(&self, resource: &str) -> Result<String, SecretError> {
        let auth_err = |message: String| SecretError::AuthFailed {
            store: "azure".to_string(),
            message,
        };

        let output = Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                resource,
                "--output",
                "json",
            ])
            .output()
            .await
            .map_err(|e| auth_err(format!("failed to execute az CLI: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(auth_err(format!("az CLI failed: {stderr}")));
        }

        let token: AzCliToken = serde_json::from_slice(&output.stdout)
            .map_err(|e| auth_err(format!("invalid az CLI output: {e}")))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl TokenCredential for AzureCredential {
    async fn get_token(&self, resource: &str) -> Result<String, SecretError> {
        if Self::env_credentials_available() {
            tracing::debug!(resource, "acquiring token via client-credentials flow");
            return self.token_from_env(resource).await;
        }

        tracing::debug!(resource, "acquiring token via az CLI");
        self.token_from_cli(resource).await
    }
}

/// Fixed-token credential for tests and pre-acquired tokens.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    /// Create a credential that always hands out `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _resource: &str) -> Result<String, SecretError> {
        Ok(self.token.clone())
    }
}
