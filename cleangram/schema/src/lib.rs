//! Telegram Bot API schema extraction.
//!
//! This crate turns the human-readable Bot API reference page into a typed
//! in-memory schema that the `cleangram-gen` code generator renders into a
//! client library.
//!
//! ## Modules
//!
//! - [`extract`] - Document walker producing an [`Api`]
//! - [`types`] - Row parsing, annotation composition and initializer rules
//! - [`model`] - Schema entities ([`Api`], [`Header`], [`Component`], [`Argument`])
//! - [`names`] - Identifier transforms (`snake`, `upper_first`, reserved words)
//! - [`errors`] - Error types for extraction
//!
//! ## Example Usage
//!
//! ```no_run
//! use cleangram_schema::extract_api;
//!
//! let html = std::fs::read_to_string("api.html").unwrap();
//! let api = extract_api(&html).unwrap();
//!
//! for component in api.objects() {
//!     println!("{} ({} fields)", component.name, component.args.len());
//! }
//! ```

pub mod errors;
pub mod extract;
pub mod model;
pub mod names;
pub mod types;

pub use errors::SchemaError;
pub use extract::{DocumentExtractor, ExtractorConfig};
pub use model::{AnchorTable, Api, Argument, Category, Component, Header, Primitive, Sentinels};
pub use types::{Annotation, Initializer};

/// Extracts the schema from the reference page using the default document
/// shape and fresh sentinels.
///
/// ## Errors
///
/// Propagates any [`SchemaError`] raised by [`DocumentExtractor::extract`].
pub fn extract_api(html: &str) -> Result<Api, SchemaError> {
    DocumentExtractor::new(Sentinels::new()).extract_html(html)
}
