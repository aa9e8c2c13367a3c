//! Azure Key Vault secret store over the REST API

use crate::auth::TokenCredential;
use async_trait::async_trait;
use kvdiff_secrets::{SecretError, SecretStore};
use serde::Deserialize;
use std::sync::Arc;

/// Resource identifier tokens must be scoped to for Key Vault access.
pub const KEYVAULT_RESOURCE: &str = "https://vault.azure.net";

/// Key Vault REST API version used for all requests.
const API_VERSION: &str = "7.4";

/// One page of the secret-list response.
#[derive(Debug, Deserialize)]
struct SecretListPage {
    #[serde(default)]
    value: Vec<SecretItem>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

/// A secret's identifier entry in the list response.
#[derive(Debug, Deserialize)]
struct SecretItem {
    /// Full secret URL, e.g. `https://v.vault.azure.net/secrets/db-pass`
    id: String,
}

impl SecretItem {
    /// The secret name is the last path segment of the identifier URL.
    fn name(&self) -> Option<&str> {
        self.id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
    }
}

/// Body of a get-secret response.
#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}

/// Reads secrets from an Azure Key Vault.
///
/// The vault URL is derived from the vault name by string interpolation
/// (`https://<name>.vault.azure.net`); no validation of the name is
/// performed locally. Credentials are an injected [`TokenCredential`] so
/// tests can run against a mock endpoint with a static token.
pub struct KeyVaultStore {
    vault_name: String,
    vault_url: String,
    credential: Arc<dyn TokenCredential>,
    http: reqwest::Client,
}

impl std::fmt::Debug for KeyVaultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultStore")
            .field("vault_name", &self.vault_name)
            .field("vault_url", &self.vault_url)
            .finish()
    }
}

impl KeyVaultStore {
    /// Create a store for the vault of the given name.
    pub fn for_vault(vault_name: impl Into<String>, credential: Arc<dyn TokenCredential>) -> Self {
        let vault_name = vault_name.into();
        let vault_url = format!("https://{vault_name}.vault.azure.net");
        Self::with_vault_url(vault_name, vault_url, credential)
    }

    /// Create a store against an explicit base URL.
    ///
    /// Used by tests to point the client at a mock server.
    pub fn with_vault_url(
        vault_name: impl Into<String>,
        vault_url: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            vault_name: vault_name.into(),
            vault_url: vault_url.into(),
            credential,
            http: reqwest::Client::new(),
        }
    }

    /// Perform an authenticated GET against the vault.
    async fn get(&self, url: &str) -> Result<reqwest::Response, String> {
        let token = self
            .credential
            .get_token(KEYVAULT_RESOURCE)
            .await
            .map_err(|e| e.to_string())?;

        self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))
    }
}

#[async_trait]
impl SecretStore for KeyVaultStore {
    fn store_name(&self) -> String {
        self.vault_name.clone()
    }

    async fn list_secret_names(&self) -> Result<Vec<String>, SecretError> {
        let list_err = |message: String| SecretError::ListFailed {
            store: self.vault_name.clone(),
            message,
        };

        let mut names = Vec::new();
        let mut url = format!("{}/secrets?api-version={API_VERSION}", self.vault_url);

        loop {
            let response = self.get(&url).await.map_err(list_err)?;
            if !response.status().is_success() {
                let status = response.status();
                return Err(list_err(format!("vault returned {status}")));
            }

            let page: SecretListPage = response
                .json()
                .await
                .map_err(|e| list_err(format!("invalid list response: {e}")))?;

            names.extend(page.value.iter().filter_map(|item| {
                let name = item.name();
                if name.is_none() {
                    tracing::warn!(id = %item.id, "secret id with no name segment, skipping");
                }
                name.map(str::to_string)
            }));

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::debug!(vault = %self.vault_name, count = names.len(), "enumerated secrets");
        Ok(names)
    }

    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        let fetch_err = |message: String| SecretError::FetchFailed {
            name: name.to_string(),
            store: self.vault_name.clone(),
            message,
        };

        let url = format!(
            "{}/secrets/{name}?api-version={API_VERSION}",
            self.vault_url
        );

        let response = self.get(&url).await.map_err(fetch_err)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SecretError::NotFound {
                name: name.to_string(),
                store: self.vault_name.clone(),
            });
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(fetch_err(format!("vault returned {status}")));
        }

        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|e| fetch_err(format!("invalid secret response: {e}")))?;

        Ok(bundle.value)
    }
}
