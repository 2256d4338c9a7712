//! Error types for fixture loading and destination managers.

use forge_core::ForgeError;

/// Errors raised while building or running a destination manager.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// Override or query engine failure.
    #[error(transparent)]
    Engine(#[from] ForgeError),

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// JSON encode/decode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 object payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Fixture definition is malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stack does not export the requested output.
    #[error("unable to find a resource for stack: {stack} and output: {output}")]
    MissingStackOutput { stack: String, output: String },

    /// An indirect resource reference could not be resolved.
    #[error("unable to resolve {kind} '{name}'")]
    Unresolved { kind: &'static str, name: String },
}

/// Result alias for fixture operations.
pub type Result<T> = std::result::Result<T, FixtureError>;
