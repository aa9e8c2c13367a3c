//! Artifact publication via Octopus service messages

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use kvdiff_core::{ArtifactSink, ReportError};
use std::path::Path;

/// Publishes files as Octopus deployment artifacts.
///
/// The Octopus server collects artifacts by scanning the deployment
/// process's stdout for `##octopus[createArtifact ...]` service messages
/// with base64-encoded attribute values.
#[derive(Debug, Clone, Default)]
pub struct OctopusArtifactSink;

impl OctopusArtifactSink {
    /// Create a new artifact sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Build the `createArtifact` service message for a file.
///
/// `length` is the file size in bytes. All attribute values are
/// base64-encoded, as the Octopus service-message grammar requires.
fn create_artifact_message(path: &Path, length: u64) -> String {
    let full_path = BASE64.encode(path.display().to_string());
    let name = BASE64.encode(
        path.file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
    );
    let length = BASE64.encode(length.to_string());

    format!("##octopus[createArtifact path='{full_path}' name='{name}' length='{length}']")
}

#[async_trait]
impl ArtifactSink for OctopusArtifactSink {
    async fn publish(&self, path: &Path) -> Result<(), ReportError> {
        let metadata = std::fs::metadata(path).map_err(|e| ReportError::Publish {
            path: path.display().to_string(),
            message: format!("cannot stat report file: {e}"),
        })?;

        let message = create_artifact_message(path, metadata.len());

        // Service messages are parsed from stdout by the Octopus server;
        // everything else this tool emits goes to stderr via tracing.
        #[allow(clippy::print_stdout)]
        {
            println!("{message}");
        }

        tracing::info!(path = %path.display(), "artifact published");
        Ok(())
    }
}
