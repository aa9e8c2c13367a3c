//! Store contracts for kvdiff
//!
//! Provides the trait-level contracts the comparison pipeline is built
//! against:
//!
//! - [`SecretStore`] - the vault being audited (enumerate + fetch)
//! - [`ReferenceStore`] - the deployment-orchestrator variable set that is
//!   treated as ground truth for the upcoming deployment
//!
//! Concrete providers live in separate crates (`kvdiff-keyvault`,
//! `kvdiff-octopus`). In-memory implementations for tests and offline use
//! are exported from [`stores`].

mod snapshot;
pub mod stores;

pub use snapshot::{VaultFetch, fetch_snapshot, reference_snapshot_for};
pub use stores::{StaticReferenceStore, StaticSecretStore};

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Secret name -> current value, as observed in the vault.
///
/// Ordered so that report output is deterministic across runs.
pub type VaultSnapshot = BTreeMap<String, String>;

/// Secret name -> value the upcoming deployment intends to use.
pub type ReferenceSnapshot = BTreeMap<String, String>;

/// Error types for store access
#[derive(Debug, Error)]
pub enum SecretError {
    /// Secret or variable not found
    #[error("Secret '{name}' not found in '{store}'")]
    NotFound {
        /// Secret name
        name: String,
        /// Store that was searched
        store: String,
    },

    /// Credential acquisition failed
    #[error("Failed to acquire credentials for '{store}': {message}")]
    AuthFailed {
        /// Store the credentials were for
        store: String,
        /// Error message from the credential provider
        message: String,
    },

    /// Enumerating the store failed
    #[error("Failed to list secrets in '{store}': {message}")]
    ListFailed {
        /// Store that was enumerated
        store: String,
        /// Error message from the store
        message: String,
    },

    /// Fetching an individual value failed
    #[error("Failed to fetch '{name}' from '{store}': {message}")]
    FetchFailed {
        /// Secret name
        name: String,
        /// Store the value was fetched from
        store: String,
        /// Error message from the store
        message: String,
    },
}

/// A secret store whose live contents are being audited.
///
/// Implementations are injected into the pipeline so tests can substitute
/// an in-memory store for the network client.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Identifier used in diagnostics and error messages.
    fn store_name(&self) -> String;

    /// Enumerate the names of all secrets currently in the store.
    async fn list_secret_names(&self) -> Result<Vec<String>, SecretError>;

    /// Fetch the current value of a single secret.
    async fn get_secret(&self, name: &str) -> Result<String, SecretError>;
}

/// The deployment-orchestrator variable set.
///
/// Values from this store are what the upcoming deployment will write, so
/// they are the reference side of every comparison.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Identifier used in diagnostics and error messages.
    fn store_name(&self) -> String;

    /// Look up the intended value for a single secret name.
    async fn lookup(&self, name: &str) -> Result<String, SecretError>;

    /// Enumerate every variable in the store.
    ///
    /// Only used when the vault is empty or unreadable, to list the
    /// entries a deployment would create.
    async fn entries(&self) -> Result<ReferenceSnapshot, SecretError>;
}
