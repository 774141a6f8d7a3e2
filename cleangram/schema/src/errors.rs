//! Error types for schema extraction.

use thiserror::Error;

/// Errors that can occur while turning the reference document into a schema.
///
/// None of these are recovered. The extractor is written against one known
/// document shape, so every variant means the source changed or the
/// extractor has a defect.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document deviates from the expected section/table shape.
    #[error("Unexpected document structure in {context}: {reason}")]
    StructuralAssumption {
        /// Where the deviation was found (header, component or row name).
        context: String,
        /// What was expected but not found.
        reason: String,
    },

    /// A cross-reference anchor is missing from the global anchor table.
    #[error("Unresolved reference '{anchor}' in component '{component}'")]
    UnresolvedReference {
        /// The anchor that could not be resolved (e.g. `#photosize`).
        anchor: String,
        /// The component whose argument table carried the link.
        component: String,
    },

    /// A configured CSS selector could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

impl SchemaError {
    /// Shorthand for building a [`SchemaError::StructuralAssumption`].
    pub fn structural(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StructuralAssumption {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
