//! kvdiff CLI application
//!
//! Compares the secrets in a cloud key vault against the variable set of
//! the current deployment and publishes the differences as a plain-text
//! deployment artifact.

// The binary owns stderr for diagnostics; stdout is reserved for Octopus
// service messages emitted by the artifact sink.
#![allow(clippy::print_stderr)]

use kvdiff::cli::{self, EXIT_OK, render_error};
use kvdiff::commands;

fn main() {
    // Parse first: clap renders usage and exits with code 2 on bad args.
    let args = cli::parse();

    // Diagnostics go to stderr so stdout stays clean for service messages.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let exit_code = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(async {
            match commands::run(&args).await {
                Ok(()) => EXIT_OK,
                Err(err) => render_error(err),
            }
        }),
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            1
        }
    };

    std::process::exit(exit_code);
}
