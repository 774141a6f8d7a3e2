//! Generator configuration.

use std::path::PathBuf;

use crate::errors::GeneratorError;

/// Narrowest wrap column that still leaves room for nested docstrings.
const MIN_WRAP_COLUMN: usize = 40;

/// Settings for one generation run.
///
/// ## Examples
///
/// ```
/// use cleangram_gen::config::GeneratorConfig;
///
/// let config = GeneratorConfig::default();
/// assert_eq!(config.package, "cleangram");
/// assert_eq!(config.doc_link("#user"), "https://core.telegram.org/bots/api#user");
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Distribution name of the generated package, used in `_version.py`.
    pub package: String,
    /// Directory the package artifacts are written under.
    pub output: PathBuf,
    /// Reference page URL that component anchors are appended to.
    pub doc_url: String,
    /// Column generated text is wrapped at.
    pub wrap_column: usize,
    /// Log artifacts instead of writing them.
    pub dry_run: bool,
    /// External formatter command (program followed by arguments) that reads
    /// source on stdin and prints the formatted source on stdout.
    pub formatter: Option<Vec<String>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: "cleangram".to_string(),
            output: PathBuf::from("cleangram"),
            doc_url: "https://core.telegram.org/bots/api".to_string(),
            wrap_column: 79,
            dry_run: false,
            formatter: None,
        }
    }
}

impl GeneratorConfig {
    /// Documentation back-reference for a component anchor.
    pub fn doc_link(&self, anchor: &str) -> String {
        format!("{}{}", self.doc_url, anchor)
    }

    /// Checks the settings before any work is done.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if the package name is not a
    /// valid distribution name, the wrap column is too narrow, or the
    /// formatter command is empty.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.package.is_empty()
            || !self
                .package
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(GeneratorError::ConfigError(format!(
                "invalid package name '{}'",
                self.package
            )));
        }

        if self.wrap_column < MIN_WRAP_COLUMN {
            return Err(GeneratorError::ConfigError(format!(
                "wrap column {} is below the minimum of {}",
                self.wrap_column, MIN_WRAP_COLUMN
            )));
        }

        if let Some(command) = &self.formatter
            && command.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(GeneratorError::ConfigError(
                "formatter command is empty".to_string(),
            ));
        }

        Ok(())
    }
}
