//! The Key Vault comparison pipeline
//!
//! Strictly linear: fetch the vault snapshot, look up the matching
//! deployment variables, diff, write the report file, publish it as an
//! artifact.

use crate::cli::CliError;
use kvdiff_core::{ArtifactSink, DiffReport, diff, write_report};
use kvdiff_keyvault::{AzureCredential, KeyVaultStore};
use kvdiff_octopus::{OctopusArtifactSink, OctopusVariableStore};
use kvdiff_secrets::{ReferenceStore, SecretStore, fetch_snapshot, reference_snapshot_for};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Compare one vault against the reference store and publish the report.
///
/// All collaborators are injected so tests can drive the pipeline with
/// in-memory stores and a recording sink. Returns the report path.
pub async fn compare_keyvault(
    vault_name: &str,
    store: &dyn SecretStore,
    reference: &dyn ReferenceStore,
    sink: &dyn ArtifactSink,
    output_dir: &Path,
) -> Result<PathBuf, CliError> {
    let fetch = fetch_snapshot(store).await;
    let snapshot = reference_snapshot_for(reference, &fetch).await?;
    let report = diff(vault_name, &fetch, &snapshot);

    if let DiffReport::VaultUnreadable { pending, .. } = &report {
        tracing::warn!(
            vault = %vault_name,
            pending = pending.len(),
            "cannot read or locate any secrets; reporting entries to be created"
        );
    }

    let path = write_report(output_dir, &report)?;
    sink.publish(&path).await?;
    Ok(path)
}

/// Run the comparison against the real Azure and Octopus collaborators.
pub async fn run(vault_name: &str, output_dir: &Path) -> Result<(), CliError> {
    tracing::info!(vault = %vault_name, "keyvault comparison starting");

    let credential = Arc::new(AzureCredential::new());
    let store = KeyVaultStore::for_vault(vault_name, credential);
    let reference = OctopusVariableStore::new();
    let sink = OctopusArtifactSink::new();

    compare_keyvault(vault_name, &store, &reference, &sink, output_dir).await?;
    Ok(())
}
