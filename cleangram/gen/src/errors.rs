//! Error types for the cleangram generator.

use cleangram_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Schema extraction failed; the whole run aborts.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The external formatter rejected an artifact.
    ///
    /// Only the offending artifact is abandoned. Its raw text is logged at
    /// `error` level before this is returned.
    #[error("Formatter rejected '{path}': {reason}")]
    RenderFormatting {
        /// Artifact path relative to the output root.
        path: String,
        /// Formatter diagnostics (stderr or spawn failure).
        reason: String,
    },

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The reference document could not be retrieved.
    #[error("Failed to load reference document from {source_ref}: {reason}")]
    FetchError {
        /// URL or file path the document was requested from.
        source_ref: String,
        reason: String,
    },

    /// The schema could not be serialized for `parse --json`.
    #[error("Failed to serialize schema: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}
