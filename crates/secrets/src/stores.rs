//! In-memory store implementations
//!
//! Used as test doubles for the network-backed providers, and handy for
//! exercising the pipeline offline.

use crate::{ReferenceSnapshot, ReferenceStore, SecretError, SecretStore, VaultSnapshot};
use async_trait::async_trait;

/// An in-memory [`SecretStore`] backed by a fixed map.
#[derive(Debug, Clone)]
pub struct StaticSecretStore {
    name: String,
    secrets: VaultSnapshot,
}

impl StaticSecretStore {
    /// Create a store holding the given entries.
    pub fn new<K, V>(name: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            secrets: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    fn store_name(&self) -> String {
        self.name.clone()
    }

    async fn list_secret_names(&self) -> Result<Vec<String>, SecretError> {
        Ok(self.secrets.keys().cloned().collect())
    }

    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
                store: self.name.clone(),
            })
    }
}

/// An in-memory [`ReferenceStore`] backed by a fixed map.
#[derive(Debug, Clone)]
pub struct StaticReferenceStore {
    name: String,
    variables: ReferenceSnapshot,
}

impl StaticReferenceStore {
    /// Create a store holding the given variables.
    pub fn new<K, V>(name: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            variables: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl ReferenceStore for StaticReferenceStore {
    fn store_name(&self) -> String {
        self.name.clone()
    }

    async fn lookup(&self, name: &str) -> Result<String, SecretError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
                store: self.name.clone(),
            })
    }

    async fn entries(&self) -> Result<ReferenceSnapshot, SecretError> {
        Ok(self.variables.clone())
    }
}
