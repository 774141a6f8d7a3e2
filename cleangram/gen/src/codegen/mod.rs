//! Code generation for the cleangram Python package.
//!
//! ## Submodules
//!
//! - [`component`] - Renders one component into one module of a package variant
//! - [`package`] - Version, sentinel base classes and `__init__` re-exports
//! - [`imports`] - Import grouping and cycle-safe deferred imports
//! - [`docs`] - Wrapped docstrings with documentation back-references
//! - [`sections`] - Fixed-order section builder for module text
//!
//! ## Code Generation Flow
//!
//! 1. A [`ReferenceGraph`] is built once from the object components
//! 2. Every component is rendered per variant via [`ComponentRenderer`]
//! 3. Package files are rendered via the [`package`] functions
//!
//! See [`crate::output`] for formatting, assembly and file writing.

pub mod component;
pub mod docs;
pub mod imports;
pub mod package;
pub mod sections;

pub use component::ComponentRenderer;
pub use docs::DocWriter;
pub use imports::{ImportSet, ReferenceGraph};
pub use package::{render_base, render_category_init, render_variant_init, render_version};
pub use sections::{Section, SourceBuilder};
