//! Diff classification and report rendering for kvdiff
//!
//! This crate holds the pure logic of the comparison: classifying each
//! secret as unchanged, changed or new ([`diff`]), rendering the result as
//! the plain-text deployment report ([`report`]), and the [`ArtifactSink`]
//! seam the rendered file is handed to.

pub mod diff;
pub mod report;

pub use diff::{DiffReport, SecretChange, diff};
pub use report::{render, report_file_name, write_report};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Error types for report writing and publication
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing the report file failed
    #[error("Failed to write report '{path}': {source}")]
    Write {
        /// Target path of the report file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Handing the report to the artifact sink failed
    #[error("Failed to publish artifact '{path}': {message}")]
    Publish {
        /// Path of the report file
        path: String,
        /// Error message from the sink
        message: String,
    },
}

/// Destination the finished report file is handed to.
///
/// In a pipeline run this is the deployment orchestrator's artifact
/// mechanism; tests substitute a recording sink.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Publish the report file at `path` as a deployment artifact.
    async fn publish(&self, path: &Path) -> Result<(), ReportError>;
}
