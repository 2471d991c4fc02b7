//! Domain error types for the refactor preview.
//!
//! Expected conditions are not errors here: a missing original resource
//! degrades to a one-sided preview, conflicts veto acceptance as data, and
//! cancellation or a superseded session resolve with "no result".

use thiserror::Error;

use super::uri::ResourceUri;

/// Unexpected failure while probing whether a resource exists.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Failed to probe {uri}: {source}")]
    Probe {
        uri: ResourceUri,
        source: anyhow::Error,
    },
}

/// Errors surfaced by the preview controller.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("No refactor preview is active")]
    NoInput,

    #[error("Failed to compute file operations: {0}")]
    OperationSet(#[source] anyhow::Error),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Tree update failed: {0}")]
    Tree(#[source] anyhow::Error),

    #[error("Failed to open diff view: {0}")]
    Opener(#[source] anyhow::Error),

    #[error("Failed to store preference: {0}")]
    Preferences(#[source] anyhow::Error),
}

/// Errors writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
