//! The formatter collaborator.
//!
//! Generated text is handed to a [`Formatter`] before it is written. The
//! default [`Passthrough`] leaves it untouched; [`CommandFormatter`] pipes it
//! through an external program such as `black -q -`.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::errors::GeneratorError;

/// Canonicalizes generated source text.
pub trait Formatter {
    /// Formats `source`, the text of the artifact at `path`.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::RenderFormatting` when the text is rejected.
    fn format(&self, path: &Path, source: &str) -> Result<String, GeneratorError>;
}

/// Returns the text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Formatter for Passthrough {
    fn format(&self, _path: &Path, source: &str) -> Result<String, GeneratorError> {
        Ok(source.to_string())
    }
}

/// Runs an external program that reads source on stdin and prints the
/// formatted source on stdout. A non-zero exit rejects the text.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a formatter from a command line split into words.
    ///
    /// Returns `None` for an empty command.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, path: &Path, source: &str) -> Result<String, GeneratorError> {
        let rejected = |reason: String| GeneratorError::RenderFormatting {
            path: path.display().to_string(),
            reason,
        };

        debug!("Formatting {} with {}", path.display(), self.program);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| rejected(format!("failed to start '{}': {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| rejected(format!("failed to write to '{}': {}", self.program, e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| rejected(format!("failed to wait for '{}': {}", self.program, e)))?;

        if !output.status.success() {
            return Err(rejected(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| rejected(format!("formatter printed invalid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_keeps_text() {
        let text = "class User(TelegramObject):\n    id: int\n";
        assert_eq!(Passthrough.format(Path::new("user.py"), text).unwrap(), text);
    }

    #[test]
    fn from_command_splits_program_and_args() {
        let command = vec!["black".to_string(), "-q".to_string(), "-".to_string()];
        let formatter = CommandFormatter::from_command(&command).unwrap();
        assert_eq!(formatter.program, "black");
        assert_eq!(formatter.args, ["-q", "-"]);
        assert!(CommandFormatter::from_command(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_formatter_pipes_through_program() {
        let formatter = CommandFormatter::new("cat", vec![]);
        let out = formatter.format(Path::new("a.py"), "x = 1\n").unwrap();
        assert_eq!(out, "x = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn command_formatter_rejects_on_failure() {
        let formatter = CommandFormatter::new("false", vec![]);
        let err = formatter.format(Path::new("a.py"), "x = 1\n").unwrap_err();
        match err {
            GeneratorError::RenderFormatting { path, .. } => assert_eq!(path, "a.py"),
            other => panic!("Expected RenderFormatting, got {:?}", other),
        }
    }

    #[test]
    fn missing_program_is_formatting_error() {
        let formatter = CommandFormatter::new("cleangram-no-such-formatter", vec![]);
        let err = formatter.format(Path::new("a.py"), "").unwrap_err();
        assert!(matches!(err, GeneratorError::RenderFormatting { .. }));
    }
}
