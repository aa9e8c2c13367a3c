//! Octopus Deploy integration for kvdiff
//!
//! Octopus exposes deployment variables to child processes through the
//! environment and collects artifacts by parsing service messages from the
//! process's stdout. The [`variables`] module implements the
//! [`kvdiff_secrets::ReferenceStore`] contract over those environment
//! variables; [`artifact`] emits the `createArtifact` service message.

pub mod artifact;
pub mod variables;

pub use artifact::OctopusArtifactSink;
pub use variables::OctopusVariableStore;
