//! Vault snapshot fetching with the degrade-to-unreadable policy

use crate::{ReferenceSnapshot, ReferenceStore, SecretError, SecretStore, VaultSnapshot};

/// Outcome of one enumeration pass over a vault.
///
/// A failed fetch is a distinct variant rather than an empty map, so
/// callers cannot confuse a legitimately empty vault with one that could
/// not be reached.
#[derive(Debug)]
pub enum VaultFetch {
    /// Enumeration succeeded; the snapshot may be empty or, when an
    /// individual fetch failed mid-pass, partial.
    Populated(VaultSnapshot),
    /// Nothing could be collected from the vault.
    Unreadable {
        /// The error that stopped the fetch, for diagnostics.
        reason: String,
    },
}

impl VaultFetch {
    /// True when no entries were collected, whether because the vault is
    /// empty or because it was unreadable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Populated(snapshot) => snapshot.is_empty(),
            Self::Unreadable { .. } => true,
        }
    }
}

/// Enumerate a vault and fetch every secret value, sequentially.
///
/// Failures degrade rather than abort: a failed enumeration yields
/// [`VaultFetch::Unreadable`]; a failed individual fetch stops the pass
/// and keeps whatever was already collected. Every failure is logged.
pub async fn fetch_snapshot(store: &dyn SecretStore) -> VaultFetch {
    let names = match store.list_secret_names().await {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(
                store = %store.store_name(),
                error = %err,
                "unable to enumerate vault; if this is the first run the resource may not exist yet"
            );
            return VaultFetch::Unreadable {
                reason: err.to_string(),
            };
        }
    };

    let mut snapshot = VaultSnapshot::new();
    for name in names {
        match store.get_secret(&name).await {
            Ok(value) => {
                snapshot.insert(name, value);
            }
            Err(err) => {
                tracing::warn!(
                    store = %store.store_name(),
                    secret = %name,
                    error = %err,
                    "secret fetch failed; continuing with partial snapshot"
                );
                if snapshot.is_empty() {
                    return VaultFetch::Unreadable {
                        reason: err.to_string(),
                    };
                }
                return VaultFetch::Populated(snapshot);
            }
        }
    }

    VaultFetch::Populated(snapshot)
}

/// Build the reference snapshot matching a vault fetch.
///
/// For a populated vault, one lookup is performed per vault key, so the
/// reference key set always equals the vault key set. When the vault is
/// empty or unreadable the whole reference store is enumerated instead, so
/// the report can list the entries a deployment would create.
///
/// A failed lookup for a key present in the vault is fatal: reporting such
/// a key as "unchanged" or "new" would misstate drift the tool cannot
/// actually observe.
pub async fn reference_snapshot_for(
    store: &dyn ReferenceStore,
    fetch: &VaultFetch,
) -> Result<ReferenceSnapshot, SecretError> {
    match fetch {
        VaultFetch::Populated(snapshot) if !snapshot.is_empty() => {
            let mut reference = ReferenceSnapshot::new();
            for name in snapshot.keys() {
                let value = store.lookup(name).await?;
                reference.insert(name.clone(), value);
            }
            Ok(reference)
        }
        _ => store.entries().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{StaticReferenceStore, StaticSecretStore};
    use async_trait::async_trait;

    /// Store that fails enumeration outright.
    struct DownStore;

    #[async_trait]
    impl SecretStore for DownStore {
        fn store_name(&self) -> String {
            "down".to_string()
        }

        async fn list_secret_names(&self) -> Result<Vec<String>, SecretError> {
            Err(SecretError::ListFailed {
                store: "down".to_string(),
                message: "connection refused".to_string(),
            })
        }

        async fn get_secret(&self, _name: &str) -> Result<String, SecretError> {
            Err(SecretError::ListFailed {
                store: "down".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    /// Store that lists names but fails fetching a chosen one.
    struct FlakyStore {
        inner: StaticSecretStore,
        failing: String,
    }

    #[async_trait]
    impl SecretStore for FlakyStore {
        fn store_name(&self) -> String {
            "flaky".to_string()
        }

        async fn list_secret_names(&self) -> Result<Vec<String>, SecretError> {
            self.inner.list_secret_names().await
        }

        async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
            if name == self.failing {
                return Err(SecretError::FetchFailed {
                    name: name.to_string(),
                    store: "flaky".to_string(),
                    message: "timed out".to_string(),
                });
            }
            self.inner.get_secret(name).await
        }
    }

    #[tokio::test]
    async fn fetch_collects_all_values() {
        let store =
            StaticSecretStore::new("vault", [("db-pass", "old123"), ("api-key", "abc")]);

        let fetch = fetch_snapshot(&store).await;
        match fetch {
            VaultFetch::Populated(snapshot) => {
                assert_eq!(snapshot.len(), 2);
                assert_eq!(snapshot.get("db-pass").map(String::as_str), Some("old123"));
            }
            VaultFetch::Unreadable { reason } => panic!("unexpected unreadable: {reason}"),
        }
    }

    #[tokio::test]
    async fn failed_enumeration_is_unreadable() {
        let fetch = fetch_snapshot(&DownStore).await;
        assert!(matches!(fetch, VaultFetch::Unreadable { .. }));
        assert!(fetch.is_empty());
    }

    #[tokio::test]
    async fn failed_first_fetch_is_unreadable() {
        let store = FlakyStore {
            inner: StaticSecretStore::new("vault", [("alpha", "1")]),
            failing: "alpha".to_string(),
        };
        let fetch = fetch_snapshot(&store).await;
        assert!(matches!(fetch, VaultFetch::Unreadable { .. }));
    }

    #[tokio::test]
    async fn failed_later_fetch_keeps_partial_snapshot() {
        // BTreeMap enumeration order: alpha, beta, gamma. beta fails.
        let store = FlakyStore {
            inner: StaticSecretStore::new(
                "vault",
                [("alpha", "1"), ("beta", "2"), ("gamma", "3")],
            ),
            failing: "beta".to_string(),
        };

        let fetch = fetch_snapshot(&store).await;
        match fetch {
            VaultFetch::Populated(snapshot) => {
                assert_eq!(snapshot.len(), 1);
                assert!(snapshot.contains_key("alpha"));
            }
            VaultFetch::Unreadable { reason } => panic!("unexpected unreadable: {reason}"),
        }
    }

    #[tokio::test]
    async fn empty_vault_is_populated_but_empty() {
        let store = StaticSecretStore::new("vault", Vec::<(&str, &str)>::new());
        let fetch = fetch_snapshot(&store).await;
        assert!(matches!(fetch, VaultFetch::Populated(_)));
        assert!(fetch.is_empty());
    }

    #[tokio::test]
    async fn reference_keys_match_vault_keys() {
        let reference = StaticReferenceStore::new(
            "octopus",
            [("db-pass", "new456"), ("unrelated", "zzz")],
        );
        let fetch = VaultFetch::Populated(VaultSnapshot::from([(
            "db-pass".to_string(),
            "old123".to_string(),
        )]));

        let snapshot = reference_snapshot_for(&reference, &fetch).await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("db-pass").map(String::as_str), Some("new456"));
    }

    #[tokio::test]
    async fn unreadable_vault_enumerates_reference() {
        let reference = StaticReferenceStore::new("octopus", [("api-key", "abc")]);
        let fetch = VaultFetch::Unreadable {
            reason: "connection refused".to_string(),
        };

        let snapshot = reference_snapshot_for(&reference, &fetch).await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("api-key").map(String::as_str), Some("abc"));
    }

    #[tokio::test]
    async fn missing_reference_value_is_fatal() {
        let reference = StaticReferenceStore::new("octopus", Vec::<(&str, &str)>::new());
        let fetch = VaultFetch::Populated(VaultSnapshot::from([(
            "db-pass".to_string(),
            "old123".to_string(),
        )]));

        let result = reference_snapshot_for(&reference, &fetch).await;
        assert!(matches!(result, Err(SecretError::NotFound { .. })));
    }
}
