//! cleangram code generator library.
//!
//! This crate renders the `cleangram` Python client library from a schema
//! extracted by `cleangram-schema`. The generated package contains:
//!
//! - `core` - pydantic models for every object and abstract operation classes
//! - `sync` - operations invoked with a blocking `bot(self)` call
//! - `aio` - operations awaited through `await bot(self)`
//! - `_version.py` - the package and Bot API versions
//!
//! ## Modules
//!
//! - [`codegen`] - Rendering of components and package files
//! - [`output`] - Artifact assembly, formatting and atomic writes
//! - [`variant`] - Package variants and artifact paths
//! - [`format`] - The formatter collaborator
//! - [`fetch`] - Loading the reference document
//! - [`config`] - Generator settings
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use cleangram_gen::config::GeneratorConfig;
//! use cleangram_gen::format::Passthrough;
//! use cleangram_gen::output::generate_and_write;
//! use cleangram_schema::extract_api;
//!
//! let html = std::fs::read_to_string("api.html").unwrap();
//! let api = extract_api(&html).unwrap();
//!
//! let config = GeneratorConfig {
//!     dry_run: true,
//!     ..Default::default()
//! };
//! let summary = generate_and_write(&api, &config, &Passthrough).unwrap();
//! assert!(summary.is_success());
//! ```

pub mod codegen;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod format;
pub mod output;
pub mod variant;
