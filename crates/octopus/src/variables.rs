//! Deployment variables read from the process environment

use async_trait::async_trait;
use kvdiff_secrets::{ReferenceSnapshot, ReferenceStore, SecretError};

/// Default prefix under which Octopus variables are exported.
pub const DEFAULT_PREFIX: &str = "OCTOPUS_VAR_";

/// Environment variable overriding the prefix.
pub const PREFIX_ENV: &str = "KVDIFF_OCTOPUS_PREFIX";

/// Reads the deployment's intended values from environment variables.
///
/// Variable `NAME` is read from `<prefix>NAME`. The secret name is
/// concatenated verbatim; no case folding or character mangling is
/// applied, so the exporting step must use the exact vault secret names.
#[derive(Debug, Clone)]
pub struct OctopusVariableStore {
    prefix: String,
}

impl Default for OctopusVariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OctopusVariableStore {
    /// Create a store using [`PREFIX_ENV`] if set, else [`DEFAULT_PREFIX`].
    #[must_use]
    pub fn new() -> Self {
        let prefix = std::env::var(PREFIX_ENV).unwrap_or_else(|_| DEFAULT_PREFIX.to_string());
        Self { prefix }
    }

    /// Create a store with an explicit prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl ReferenceStore for OctopusVariableStore {
    fn store_name(&self) -> String {
        "octopus".to_string()
    }

    async fn lookup(&self, name: &str) -> Result<String, SecretError> {
        let var = format!("{}{name}", self.prefix);
        std::env::var(&var).map_err(|_| SecretError::NotFound {
            name: name.to_string(),
            store: format!("octopus ({var})"),
        })
    }

    async fn entries(&self) -> Result<ReferenceSnapshot, SecretError> {
        let entries: ReferenceSnapshot = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(&self.prefix)
                    .map(|name| (name.to_string(), value))
            })
            .collect();

        tracing::debug!(
            prefix = %self.prefix,
            count = entries.len(),
            "enumerated deployment variables"
        );
        Ok(entries)
    }
}
