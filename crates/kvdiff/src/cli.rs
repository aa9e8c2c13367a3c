//! Argument parsing, error types and exit-code mapping

use clap::{ArgGroup, Parser};
use kvdiff_core::ReportError;
use kvdiff_secrets::SecretError;
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for successful completion
pub const EXIT_OK: i32 = 0;
/// Exit code for argument/usage errors (clap uses this too)
pub const EXIT_CLI: i32 = 2;
/// Exit code for comparison failures
pub const EXIT_COMPARE: i32 = 3;

/// Compare secret stores against the deployment's variable set.
///
/// Each target flag names a store to audit; at least one is required.
/// Targets are processed in keyvault, appconfig, configexplorer order.
#[derive(Parser, Debug)]
#[command(name = "kvdiff", version, about)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["keyvault", "appconfig", "configexplorer"]),
))]
pub struct Cli {
    /// Azure Key Vault to compare against the deployment variables
    #[arg(short = 'k', long = "keyvault", value_name = "NAME")]
    pub keyvault: Option<String>,

    /// App Configuration store to compare (no backend implemented yet)
    #[arg(short = 'a', long = "appconfig", value_name = "NAME")]
    pub appconfig: Option<String>,

    /// Config Explorer instance to compare (no backend implemented yet)
    #[arg(short = 'c', long = "configexplorer", value_name = "NAME")]
    pub configexplorer: Option<String>,

    /// Directory the report file is written to
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        env = "KVDIFF_OUTPUT_DIR",
        default_value = "."
    )]
    pub output_dir: PathBuf,
}

/// Parse command-line arguments, exiting with usage text on failure.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// CLI-level error types with exit-code mapping
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    /// A recognized target flag whose backend is not implemented
    #[error("Unsupported comparison target '{target}' for '{name}'")]
    #[diagnostic(
        code(kvdiff::cli::unsupported_target),
        help("only --keyvault comparisons are implemented")
    )]
    UnsupportedTarget {
        /// The target kind (appconfig, configexplorer)
        target: String,
        /// The store name the flag carried
        name: String,
    },

    /// Store access failed in a non-recoverable way
    #[error(transparent)]
    #[diagnostic(code(kvdiff::compare::store))]
    Secret(#[from] SecretError),

    /// Report writing or artifact publication failed
    #[error(transparent)]
    #[diagnostic(code(kvdiff::compare::report))]
    Report(#[from] ReportError),
}

impl CliError {
    /// Create an unsupported-target error.
    #[must_use]
    pub fn unsupported_target(target: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnsupportedTarget {
            target: target.into(),
            name: name.into(),
        }
    }
}

/// Map an error to the process exit code it should produce.
#[must_use]
pub fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::UnsupportedTarget { .. } | CliError::Secret(_) | CliError::Report(_) => {
            EXIT_COMPARE
        }
    }
}

/// Render an error with miette and return its exit code.
// Human-friendly error display goes to stderr; stdout is reserved for
// Octopus service messages.
#[allow(clippy::print_stderr)]
#[must_use]
pub fn render_error(err: CliError) -> i32 {
    let code = exit_code_for(&err);
    let report = Report::new(err);
    eprintln!("{report:?}");
    // Ensure output is flushed before potential process exit
    let _ = io::stderr().flush();
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn keyvault_short_flag_parses() {
        let cli = Cli::try_parse_from(["kvdiff", "-k", "teststore"]).unwrap();
        assert_eq!(cli.keyvault.as_deref(), Some("teststore"));
        assert_eq!(cli.output_dir, PathBuf::from("."));
    }

    #[test]
    fn keyvault_long_flag_with_equals_parses() {
        let cli = Cli::try_parse_from(["kvdiff", "--keyvault=teststore"]).unwrap();
        assert_eq!(cli.keyvault.as_deref(), Some("teststore"));
    }

    #[test]
    fn all_targets_may_be_combined() {
        let cli =
            Cli::try_parse_from(["kvdiff", "-k", "kv", "-a", "ac", "-c", "ce"]).unwrap();
        assert_eq!(cli.keyvault.as_deref(), Some("kv"));
        assert_eq!(cli.appconfig.as_deref(), Some("ac"));
        assert_eq!(cli.configexplorer.as_deref(), Some("ce"));
    }

    #[test]
    fn unknown_flag_is_usage_error_with_exit_2() {
        let err = Cli::try_parse_from(["kvdiff", "-z", "oops"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(err.exit_code(), EXIT_CLI);
    }

    #[test]
    fn missing_target_is_usage_error() {
        let err = Cli::try_parse_from(["kvdiff"]).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CLI);
    }

    #[test]
    fn output_dir_flag_overrides_default() {
        let cli =
            Cli::try_parse_from(["kvdiff", "-k", "kv", "--output-dir", "/tmp/out"]).unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn unsupported_target_maps_to_compare_exit() {
        let err = CliError::unsupported_target("appconfig", "myconfig");
        assert_eq!(exit_code_for(&err), EXIT_COMPARE);
        assert!(err.to_string().contains("appconfig"));
        assert!(err.to_string().contains("myconfig"));
    }
}
