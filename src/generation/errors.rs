//! Error types for the generation domain

use thiserror::Error;

/// Errors that can occur while loading a specification or generating artifacts
///
/// Malformed-but-plausible schema input never lands here; it is handled by
/// skip and fallback policies. Only input that would produce invalid output
/// is reported.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(
        "Unresolved reference `{target}` in response {status} of endpoint `{endpoint}`"
    )]
    UnresolvedReference {
        endpoint: String,
        status: u16,
        target: String,
    },

    #[error("Unresolved reference `{target}` in parameter `{parameter}` of endpoint `{endpoint}`")]
    UnresolvedParameterReference {
        endpoint: String,
        parameter: String,
        target: String,
    },

    #[error("Unresolved reference `{target}` in schema `{schema}`")]
    UnresolvedSchemaReference { schema: String, target: String },

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
