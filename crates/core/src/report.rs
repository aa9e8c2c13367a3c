//! Plain-text report rendering and file writing
//!
//! The report format is intentionally flat prose: downstream consumers
//! pattern-match on the fixed English sentences, so the wording here is
//! load-bearing and must not change casually.

use crate::ReportError;
use crate::diff::{DiffReport, SecretChange};
use std::path::{Path, PathBuf};

/// Separator line terminating each report block.
const SEPARATOR: &str = "----";

/// File name for a vault's report: exactly `kv_<vaultname>.txt`.
///
/// The vault name is interpolated without sanitization. A name containing
/// path separators therefore changes which directory the report lands in;
/// callers own the decision to pass such a name.
#[must_use]
pub fn report_file_name(vault_name: &str) -> String {
    format!("kv_{vault_name}.txt")
}

/// Render a diff report to its plain-text form.
///
/// Changed keys each produce a block of header, name, current value,
/// incoming value and separator; unchanged keys produce nothing. An
/// unreadable or empty vault produces the creation-pending listing.
#[must_use]
pub fn render(report: &DiffReport) -> String {
    let mut out = String::new();

    match report {
        DiffReport::Changes { vault_name, changes } => {
            for change in changes {
                if let SecretChange::Changed {
                    name,
                    current,
                    incoming,
                } = change
                {
                    out.push_str(&format!(
                        "Prospective change detected in KeyVault named: {vault_name}.\n"
                    ));
                    out.push_str("The following entries will be changed during this deployment:\n\n");
                    out.push_str(&format!("Secret named: {name}\n"));
                    out.push_str(&format!("Current value: {current}\n"));
                    out.push_str(&format!("Updating value: {incoming}\n"));
                    out.push_str(SEPARATOR);
                    out.push('\n');
                }
            }
        }
        DiffReport::VaultUnreadable { vault_name, pending } => {
            out.push_str(&format!(
                "Cannot read or locate any secrets for KeyVault named {vault_name}\n"
            ));
            out.push_str("All new entries will be added with the following values:\n\n");
            for change in pending {
                if let SecretChange::New { name, incoming } = change {
                    out.push_str(&format!("Key: {name}\n"));
                    out.push_str(&format!("Value: {incoming}\n"));
                    out.push_str(SEPARATOR);
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Render a report and write it to `<dir>/kv_<vaultname>.txt`.
///
/// The file is created or overwritten in full. Returns the path written.
pub fn write_report(dir: &Path, report: &DiffReport) -> Result<PathBuf, ReportError> {
    let path = dir.join(report_file_name(report.vault_name()));
    let contents = render(report);

    std::fs::write(&path, contents).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        blocks = report.block_count(),
        "report written"
    );
    Ok(path)
}
