//! Comparison commands dispatched from the parsed CLI

pub mod keyvault;

use crate::cli::{Cli, CliError};

/// Run every comparison the invocation asked for, in flag order.
///
/// The first failing target aborts the run; earlier targets keep any
/// report they already published.
pub async fn run(cli: &Cli) -> Result<(), CliError> {
    if let Some(name) = &cli.keyvault {
        keyvault::run(name, &cli.output_dir).await?;
    }
    if let Some(name) = &cli.appconfig {
        return Err(CliError::unsupported_target("appconfig", name));
    }
    if let Some(name) = &cli.configexplorer {
        return Err(CliError::unsupported_target("configexplorer", name));
    }
    Ok(())
}
