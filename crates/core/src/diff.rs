//! Key-by-key comparison of vault and reference snapshots

use kvdiff_secrets::{ReferenceSnapshot, VaultFetch};

/// Classification of a single secret after comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretChange {
    /// Vault and reference values are equal; produces no report output.
    Unchanged {
        /// Secret name
        name: String,
    },
    /// The deployment will overwrite the current vault value.
    Changed {
        /// Secret name
        name: String,
        /// Value currently in the vault
        current: String,
        /// Value the deployment intends to write
        incoming: String,
    },
    /// The vault holds nothing for this name; the entry will be created.
    New {
        /// Secret name
        name: String,
        /// Value the deployment intends to write
        incoming: String,
    },
}

impl SecretChange {
    /// The secret name this classification applies to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unchanged { name } | Self::Changed { name, .. } | Self::New { name, .. } => name,
        }
    }
}

/// Result of comparing one vault against the reference variable set.
#[derive(Debug)]
pub enum DiffReport {
    /// The vault had entries; `changes` carries one classification per key.
    Changes {
        /// Name of the vault that was compared
        vault_name: String,
        /// Per-key classifications, in key order
        changes: Vec<SecretChange>,
    },
    /// The vault had zero entries (empty or unreadable); every reference
    /// entry is pending creation.
    VaultUnreadable {
        /// Name of the vault that could not be read
        vault_name: String,
        /// Reference entries that a deployment would create
        pending: Vec<SecretChange>,
    },
}

impl DiffReport {
    /// The vault name this report describes.
    #[must_use]
    pub fn vault_name(&self) -> &str {
        match self {
            Self::Changes { vault_name, .. } | Self::VaultUnreadable { vault_name, .. } => {
                vault_name
            }
        }
    }

    /// Count of entries that will produce a report block.
    #[must_use]
    pub fn block_count(&self) -> usize {
        match self {
            Self::Changes { changes, .. } => changes
                .iter()
                .filter(|c| !matches!(c, SecretChange::Unchanged { .. }))
                .count(),
            Self::VaultUnreadable { pending, .. } => pending.len(),
        }
    }
}

/// Compare a vault fetch against its reference snapshot.
///
/// A populated, non-empty vault yields one [`SecretChange`] per vault key.
/// Reference values are looked up only for keys found in the vault, so a
/// key missing from `reference` never surfaces here; it is logged and
/// treated as unchanged.
///
/// An empty or unreadable vault yields [`DiffReport::VaultUnreadable`]
/// listing every reference entry as pending creation.
#[must_use]
pub fn diff(vault_name: &str, fetch: &VaultFetch, reference: &ReferenceSnapshot) -> DiffReport {
    match fetch {
        VaultFetch::Populated(snapshot) if !snapshot.is_empty() => {
            let changes = snapshot
                .iter()
                .map(|(name, current)| match reference.get(name) {
                    Some(incoming) if incoming != current => SecretChange::Changed {
                        name: name.clone(),
                        current: current.clone(),
                        incoming: incoming.clone(),
                    },
                    Some(_) => SecretChange::Unchanged { name: name.clone() },
                    None => {
                        tracing::debug!(secret = %name, "no reference value; treating as unchanged");
                        SecretChange::Unchanged { name: name.clone() }
                    }
                })
                .collect();

            DiffReport::Changes {
                vault_name: vault_name.to_string(),
                changes,
            }
        }
        _ => {
            let pending = reference
                .iter()
                .map(|(name, incoming)| SecretChange::New {
                    name: name.clone(),
                    incoming: incoming.clone(),
                })
                .collect();

            DiffReport::VaultUnreadable {
                vault_name: vault_name.to_string(),
                pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvdiff_secrets::VaultSnapshot;

    fn populated(entries: &[(&str, &str)]) -> VaultFetch {
        VaultFetch::Populated(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<VaultSnapshot>(),
        )
    }

    fn reference(entries: &[(&str, &str)]) -> ReferenceSnapshot {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn identical_snapshots_have_no_blocks() {
        let fetch = populated(&[("a", "1"), ("b", "2")]);
        let report = diff("store", &fetch, &reference(&[("a", "1"), ("b", "2")]));

        assert_eq!(report.block_count(), 0);
        match report {
            DiffReport::Changes { changes, .. } => {
                assert_eq!(changes.len(), 2);
                assert!(changes
                    .iter()
                    .all(|c| matches!(c, SecretChange::Unchanged { .. })));
            }
            DiffReport::VaultUnreadable { .. } => panic!("expected Changes"),
        }
    }

    #[test]
    fn single_differing_key_is_the_only_block() {
        let fetch = populated(&[("db-pass", "old123"), ("other", "same")]);
        let report = diff(
            "teststore",
            &fetch,
            &reference(&[("db-pass", "new456"), ("other", "same")]),
        );

        assert_eq!(report.block_count(), 1);
        match report {
            DiffReport::Changes { changes, .. } => {
                let changed: Vec<_> = changes
                    .iter()
                    .filter(|c| matches!(c, SecretChange::Changed { .. }))
                    .collect();
                assert_eq!(changed.len(), 1);
                assert_eq!(changed[0].name(), "db-pass");
            }
            DiffReport::VaultUnreadable { .. } => panic!("expected Changes"),
        }
    }

    #[test]
    fn unreadable_vault_lists_reference_entries() {
        let fetch = VaultFetch::Unreadable {
            reason: "connection refused".to_string(),
        };
        let report = diff("teststore", &fetch, &reference(&[("api-key", "abc")]));

        match report {
            DiffReport::VaultUnreadable { vault_name, pending } => {
                assert_eq!(vault_name, "teststore");
                assert_eq!(pending.len(), 1);
                assert_eq!(
                    pending[0],
                    SecretChange::New {
                        name: "api-key".to_string(),
                        incoming: "abc".to_string(),
                    }
                );
            }
            DiffReport::Changes { .. } => panic!("expected VaultUnreadable"),
        }
    }

    #[test]
    fn empty_vault_behaves_like_unreadable() {
        let fetch = populated(&[]);
        let report = diff("teststore", &fetch, &reference(&[("api-key", "abc")]));
        assert!(matches!(report, DiffReport::VaultUnreadable { .. }));
        assert_eq!(report.block_count(), 1);
    }

    #[test]
    fn vault_key_without_reference_is_unchanged() {
        let fetch = populated(&[("orphan", "x")]);
        let report = diff("store", &fetch, &reference(&[]));
        assert_eq!(report.block_count(), 0);
    }
}
