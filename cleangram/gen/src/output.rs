//! Artifact assembly, formatting and file writing.
//!
//! ## Output Structure
//!
//! ```text
//! cleangram/
//! ├── _version.py
//! ├── core/
//! │   ├── __init__.py
//! │   ├── base.py
//! │   ├── object/{__init__,user,chat,...}.py
//! │   └── path/{__init__,get_me,send_message,...}.py
//! ├── sync/            same layout, without base.py
//! └── aio/
//! ```
//!
//! ## Failure Isolation
//!
//! Every artifact is formatted and written on its own. A formatter rejection
//! or a write error is recorded in the [`GenerationSummary`] and the batch
//! continues; the raw text of a rejected artifact is logged at `error` level
//! in the `raw` field, escaped onto one line.
//! Writes use a temp file + rename so a file is never left half-written.

use std::fs;
use std::path::{Path, PathBuf};

use cleangram_schema::{Api, Category};
use strum::IntoEnumIterator;
use tracing::{error, info};

use crate::codegen::{
    ComponentRenderer, ReferenceGraph, render_base, render_category_init, render_variant_init,
    render_version,
};
use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::format::Formatter;
use crate::variant::{PackageVariant, base_path, version_path};

/// One generated file: a path relative to the output root and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub text: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Outcome of a full generation run.
#[derive(Debug, Default)]
pub struct GenerationSummary {
    /// Artifacts written (or logged, in dry-run mode).
    pub succeeded: Vec<PathBuf>,
    /// Artifacts abandoned, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl GenerationSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders every artifact of the package.
///
/// Order: version, base, then per variant every component module followed by
/// the category and variant `__init__` files.
pub fn render_artifacts(api: &Api, config: &GeneratorConfig) -> Vec<Artifact> {
    let graph = ReferenceGraph::new(api);
    let mut artifacts = vec![
        Artifact::new(version_path(), render_version(api, config)),
        Artifact::new(base_path(), render_base(api, config)),
    ];

    for variant in PackageVariant::iter() {
        let renderer = ComponentRenderer::new(api, &graph, config, variant);
        for category in Category::iter() {
            artifacts.extend(
                api.of_category(category)
                    .map(|c| Artifact::new(variant.module_path(c), renderer.render(c))),
            );
            artifacts.push(Artifact::new(
                variant.category_dir(category).join("__init__.py"),
                render_category_init(api, &graph, config, category),
            ));
        }
        artifacts.push(Artifact::new(
            variant.dir().join("__init__.py"),
            render_variant_init(api, config, variant),
        ));
    }

    info!("Rendered {} artifacts for Bot API {}", artifacts.len(), api.version);
    artifacts
}

/// Passes an artifact through the formatter.
///
/// ## Errors
///
/// Returns the formatter's `GeneratorError::RenderFormatting` after logging
/// the raw text.
pub fn format_artifact(
    artifact: Artifact,
    formatter: &dyn Formatter,
) -> Result<Artifact, GeneratorError> {
    match formatter.format(&artifact.path, &artifact.text) {
        Ok(text) => Ok(Artifact {
            path: artifact.path,
            text,
        }),
        Err(e) => {
            error!(
                raw = ?artifact.text,
                "Formatting {} failed: {}",
                artifact.path.display(),
                e
            );
            Err(e)
        }
    }
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if:
/// - Parent directories cannot be created
/// - The temp file cannot be written
/// - The rename operation fails
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Formats and persists one artifact under `config.output`, or logs it in
/// dry-run mode.
fn emit(
    artifact: Artifact,
    config: &GeneratorConfig,
    formatter: &dyn Formatter,
) -> Result<PathBuf, GeneratorError> {
    let artifact = format_artifact(artifact, formatter)?;
    let target = config.output.join(&artifact.path);
    if config.dry_run {
        info!("{}\n{}", target.display(), artifact.text);
    } else {
        write_atomic(&target, &artifact.text)?;
        info!("Wrote {}", target.display());
    }
    Ok(artifact.path)
}

/// Renders, formats and writes the whole package.
///
/// This is the main entry point of the generator. Per-artifact failures do
/// not stop the batch; they are collected in the returned summary.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` if `config` is invalid. Nothing is
/// rendered in that case.
pub fn generate_and_write(
    api: &Api,
    config: &GeneratorConfig,
    formatter: &dyn Formatter,
) -> Result<GenerationSummary, GeneratorError> {
    config.validate()?;

    let mut summary = GenerationSummary::default();
    for artifact in render_artifacts(api, config) {
        let path = artifact.path.clone();
        match emit(artifact, config, formatter) {
            Ok(path) => summary.succeeded.push(path),
            Err(e) => summary.failed.push((path, e.to_string())),
        }
    }

    info!(
        "Generation finished: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    Ok(summary)
}
