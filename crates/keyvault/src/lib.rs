//! Azure Key Vault integration for kvdiff
//!
//! Implements the [`kvdiff_secrets::SecretStore`] contract over the Key
//! Vault REST API via the [`store`] module, with credential acquisition in
//! [`auth`].

pub mod auth;
pub mod store;

// Re-export main types for convenience
pub use auth::{AzureCredential, StaticTokenCredential, TokenCredential};
pub use store::{KEYVAULT_RESOURCE, KeyVaultStore};
